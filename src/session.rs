//! Session state and the four user-triggered actions.
//!
//! [`SessionState`] is a plain value owned by whoever hosts the session (the
//! terminal loop in the `autofill` binary, a test, or another front end). The
//! [`Controller`] holds the collaborators and is stateless; every handler takes
//! the session by reference and commits to it only after its step succeeded,
//! so a failed step leaves the session exactly as it was.
//!
//! ```text
//!            upload            fill               download / ask
//!  Empty ───────────▶ Extracted ──────▶ Filled ───────────────────▶ Filled (+history)
//!    ▲                    │ upload of a different document                │
//!    └────────────────────┴──────────── reset ───────────────────────────┘
//! ```

use crate::assistant::FormAssistant;
use crate::config::AutofillConfig;
use crate::error::AutofillError;
use crate::ocr::OcrExtractor;
use crate::render::render_pdf;
use crate::upload::{Document, PDF_MEDIA_TYPE};
use serde::Serialize;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One question and the answer given for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// Everything one interactive session holds. Starts empty.
#[derive(Debug, Default, Clone)]
pub struct SessionState {
    document: Option<UploadedDocument>,
    filled_text: Option<String>,
    qa_history: Vec<QaPair>,
}

#[derive(Debug, Clone)]
struct UploadedDocument {
    name: String,
    fingerprint: u64,
    extracted_text: String,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the uploaded document, if any.
    pub fn document_name(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.name.as_str())
    }

    /// OCR text of the uploaded document, if any.
    pub fn extracted_text(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.extracted_text.as_str())
    }

    /// Result of the last AI fill, if the fill has been requested.
    pub fn filled_text(&self) -> Option<&str> {
        self.filled_text.as_deref()
    }

    /// True once filled text exists and is non-empty.
    pub fn is_filled(&self) -> bool {
        self.filled_text.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Q/A pairs in the order they were asked.
    pub fn history(&self) -> &[QaPair] {
        &self.qa_history
    }

    /// Q/A pairs most recent first, as they are displayed.
    pub fn history_newest_first(&self) -> impl Iterator<Item = &QaPair> {
        self.qa_history.iter().rev()
    }

    /// Drop everything; the session starts over empty.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn filled_or_err(&self) -> Result<&str, AutofillError> {
        self.filled_text
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(AutofillError::NotFilled)
    }
}

/// A generated PDF ready to be offered to the user.
#[derive(Debug)]
pub struct Download {
    pub filename: String,
    pub media_type: &'static str,
    pub content: Cursor<Vec<u8>>,
}

impl Download {
    pub fn bytes(&self) -> &[u8] {
        self.content.get_ref()
    }

    /// Write the PDF into `dir` under its download filename.
    ///
    /// Writes to a temp file first and renames, so a half-written PDF never
    /// appears under the final name.
    pub async fn save_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf, AutofillError> {
        let path = dir.as_ref().join(&self.filename);
        self.save_as(&path).await?;
        Ok(path)
    }

    /// Write the PDF to exactly `path`.
    pub async fn save_as(&self, path: &Path) -> Result<(), AutofillError> {
        let write_err = |source| AutofillError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let tmp_path = path.with_extension("pdf.tmp");
        tokio::fs::write(&tmp_path, self.bytes())
            .await
            .map_err(write_err)?;
        tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

        info!("Saved {} ({} bytes)", path.display(), self.bytes().len());
        Ok(())
    }
}

/// Sequences OCR, AI fill, PDF rendering and Q/A for a session.
#[derive(Clone)]
pub struct Controller {
    extractor: OcrExtractor,
    assistant: FormAssistant,
    download_filename: String,
}

impl Controller {
    pub fn new(
        extractor: OcrExtractor,
        assistant: FormAssistant,
        download_filename: impl Into<String>,
    ) -> Self {
        Self {
            extractor,
            assistant,
            download_filename: download_filename.into(),
        }
    }

    /// pdfium + tesseract + the configured completion endpoint.
    pub fn from_config(config: &AutofillConfig) -> Result<Self, AutofillError> {
        Ok(Self::new(
            OcrExtractor::from_config(config),
            FormAssistant::from_config(config)?,
            config.download_filename.clone(),
        ))
    }

    /// Run OCR on `document` unless this exact document was already
    /// extracted in this session with a non-empty result. Returns the
    /// extracted text.
    ///
    /// A different document replaces the cached text and clears the filled
    /// text and Q/A history, which described the previous document.
    pub async fn upload<'s>(
        &self,
        session: &'s mut SessionState,
        document: Document,
    ) -> Result<&'s str, AutofillError> {
        let fingerprint = document.fingerprint();
        let cached = session
            .document
            .as_ref()
            .is_some_and(|d| d.fingerprint == fingerprint && !d.extracted_text.is_empty());

        if cached {
            debug!("'{}' already extracted; reusing OCR text", document.name());
        } else {
            let name = document.name().to_string();
            let extracted_text = self.extractor.extract(document).await?;
            *session = SessionState {
                document: Some(UploadedDocument {
                    name,
                    fingerprint,
                    extracted_text,
                }),
                filled_text: None,
                qa_history: Vec::new(),
            };
        }

        session
            .extracted_text()
            .ok_or_else(|| AutofillError::Internal("upload left no extracted text".into()))
    }

    /// Fill placeholder values in the extracted text. Always calls the
    /// endpoint, even if the form was filled before.
    pub async fn request_fill<'s>(
        &self,
        session: &'s mut SessionState,
    ) -> Result<&'s str, AutofillError> {
        let extracted = session
            .extracted_text()
            .ok_or(AutofillError::NothingUploaded)?;

        let filled = self.assistant.fill_missing(extracted).await;
        Ok(session.filled_text.insert(filled).as_str())
    }

    /// Render the filled text as a PDF download.
    pub fn request_download(&self, session: &SessionState) -> Result<Download, AutofillError> {
        let filled = session.filled_or_err()?;
        Ok(Download {
            filename: self.download_filename.clone(),
            media_type: PDF_MEDIA_TYPE,
            content: render_pdf(filled)?,
        })
    }

    /// Answer `question` from the filled text and append it to the history.
    pub async fn ask_question<'s>(
        &self,
        session: &'s mut SessionState,
        question: &str,
    ) -> Result<&'s QaPair, AutofillError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AutofillError::EmptyQuestion);
        }
        let filled = session.filled_or_err()?;

        let answer = self.assistant.answer_question(filled, question).await;
        session.qa_history.push(QaPair {
            question: question.to_string(),
            answer,
        });
        session
            .qa_history
            .last()
            .ok_or_else(|| AutofillError::Internal("history empty after push".into()))
    }
}
