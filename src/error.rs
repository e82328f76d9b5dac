//! Error types for the pdf-autofill library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`AutofillError`]: **fatal** for the current step. Raised when the upload is not a
//!   PDF, pdfium or tesseract is missing, the PDF could not be written, or a
//!   session precondition is not met. Returned as `Err(AutofillError)` from
//!   the controller handlers; the session state is left untouched.
//!
//! * [`CompletionError`]: **recoverable**. One attempt against the
//!   chat-completion endpoint failed. These never leave the completion layer;
//!   the retry policy absorbs them and the assistant substitutes a sentinel
//!   string once attempts run out.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf-autofill library.
#[derive(Debug, Error)]
pub enum AutofillError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Uploaded file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The upload contained no bytes.
    #[error("Uploaded file '{name}' is empty")]
    EmptyUpload { name: String },

    /// The upload was read, but is not a PDF.
    #[error("Uploaded file '{name}' is not a PDF\nFirst bytes: {magic:?}")]
    NotAPdf { name: String, magic: Vec<u8> },

    // ── PDF / OCR errors ──────────────────────────────────────────────────
    /// pdfium could not parse the document.
    #[error("PDF '{name}' is corrupt: {detail}")]
    CorruptPdf { name: String, detail: String },

    /// pdfium failed to rasterise a page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// The configured pdfium library path does not exist.
    #[error(
        "PDFium library not found at '{path}'\n\
Set --pdfium-lib (or PDFIUM_LIB_PATH) to the libpdfium file or its directory."
    )]
    PdfiumNotFound { path: PathBuf },

    /// Could not bind to a pdfium library.
    #[error("Failed to bind to pdfium library: {0}")]
    PdfiumBindingFailed(String),

    /// The tesseract executable could not be launched.
    #[error(
        "OCR engine not found: '{path}'\n\
Install tesseract-ocr or point --tesseract (TESSERACT_PATH) at the binary."
    )]
    OcrEngineNotFound { path: PathBuf },

    /// tesseract ran but did not produce text for a page.
    #[error("OCR failed on page {page}: {detail}")]
    OcrFailed { page: usize, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// lopdf could not assemble or serialise the filled-form PDF.
    #[error("Failed to render PDF: {0}")]
    PdfRender(String),

    /// Could not create or write the downloaded PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No API key was supplied for the completion endpoint.
    #[error("No API key configured.\nSet GROQ_API_KEY in the environment or in a .env file.")]
    MissingApiKey,

    // ── Session preconditions ─────────────────────────────────────────────
    /// An action needs an uploaded document first.
    #[error("No document uploaded yet. Upload a PDF first.")]
    NothingUploaded,

    /// An action needs filled text first.
    #[error("The form has not been filled yet. Run the AI fill first.")]
    NotFilled,

    /// The question was empty or whitespace.
    #[error("Question is empty")]
    EmptyQuestion,

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A single failed attempt against the chat-completion endpoint.
///
/// Every variant is retryable. The classes exist so logs say *why* an attempt
/// failed; DNS and TLS failures both surface as [`CompletionError::Connect`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompletionError {
    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The endpoint answered with something other than HTTP 200.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// HTTP 200, but the body was not a usable completion.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Any other transport-level failure.
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for CompletionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CompletionError::Timeout
        } else if e.is_connect() {
            CompletionError::Connect(e.to_string())
        } else if e.is_decode() {
            CompletionError::MalformedResponse(e.to_string())
        } else {
            CompletionError::Transport(e.to_string())
        }
    }
}
