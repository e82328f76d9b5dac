//! # pdf-autofill
//!
//! Read a scanned PDF form with OCR, let a chat-completion model fill in the
//! blanks, export the result as a clean PDF, and answer questions about it.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF upload
//!  │
//!  ├─ 1. Upload    validate bytes (`%PDF` magic), fingerprint for re-use
//!  ├─ 2. Raster    pages → images via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. OCR       tesseract per page, whitespace normalised, pages joined
//!  ├─ 4. Fill      chat completion replaces N/A / nan / --- placeholders
//!  ├─ 5. Export    filled text → Letter-size PDF (title + wrapped body)
//!  └─ 6. Q/A       questions answered from the filled text, newest first
//! ```
//!
//! Completion calls go to an OpenAI-compatible endpoint (Groq by default)
//! with up to three attempts. When all attempts fail the caller gets a fixed
//! sentinel string ([`FILL_FAILED`] / [`ANSWER_FAILED`]) rather than an error.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_autofill::{AutofillConfig, Controller, Document, SessionState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GROQ_API_KEY from the environment.
//!     let config = AutofillConfig::builder().api_key_from_env().build()?;
//!     let controller = Controller::from_config(&config)?;
//!     let mut session = SessionState::new();
//!
//!     controller.upload(&mut session, Document::open("form.pdf").await?).await?;
//!     println!("{}", controller.request_fill(&mut session).await?);
//!
//!     let download = controller.request_download(&session)?;
//!     download.save_to_dir(".").await?;
//!
//!     let qa = controller.ask_question(&mut session, "What is the applicant's name?").await?;
//!     println!("{}", qa.answer);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `autofill` binary (clap + anyhow + tracing-subscriber + indicatif + dotenvy) |
//!
//! ## Runtime Requirements
//!
//! - a pdfium shared library (system path or `PDFIUM_LIB_PATH`)
//! - the `tesseract` executable (on `PATH` or `TESSERACT_PATH`)

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assistant;
pub mod completion;
pub mod config;
pub mod error;
pub mod normalize;
pub mod ocr;
pub mod progress;
pub mod prompts;
pub mod render;
pub mod session;
pub mod upload;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use assistant::{FormAssistant, ANSWER_FAILED, FILL_FAILED};
pub use completion::{CompletionClient, CompletionParams, RetryExhausted, RetryPolicy};
pub use config::{AutofillConfig, AutofillConfigBuilder};
pub use error::{AutofillError, CompletionError};
pub use normalize::clean_text;
pub use ocr::{OcrExtractor, PageRasterizer, PdfiumRasterizer, TesseractRecognizer, TextRecognizer};
pub use progress::{NoopProgressCallback, OcrProgressCallback, ProgressCallback};
pub use render::{layout_text, render_pdf};
pub use session::{Controller, Download, QaPair, SessionState};
pub use upload::Document;
