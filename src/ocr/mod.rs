//! OCR extraction: PDF bytes → one normalised text string.
//!
//! ## Data Flow
//!
//! ```text
//! Document ──▶ rasterize ──▶ recognize (per page) ──▶ clean_text ──▶ join "\n\n"
//!  (bytes)      (pdfium)      (tesseract)              (normalize)
//! ```
//!
//! Both collaborators sit behind traits so the extractor can be driven by
//! in-memory fakes in tests; production code uses [`PdfiumRasterizer`] and
//! [`TesseractRecognizer`]. Any collaborator failure is fatal: there is no
//! partial-document fallback.

mod rasterize;
mod tesseract;

pub use rasterize::PdfiumRasterizer;
pub use tesseract::TesseractRecognizer;

use crate::config::AutofillConfig;
use crate::error::AutofillError;
use crate::normalize::clean_text;
use crate::progress::ProgressCallback;
use crate::upload::Document;
use image::DynamicImage;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Separator placed between the text of consecutive pages.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Decodes PDF bytes into one image per page, in page order.
pub trait PageRasterizer: Send + Sync {
    fn rasterize(&self, pdf: &[u8]) -> Result<Vec<DynamicImage>, AutofillError>;
}

/// Produces recognised text for a single page image.
pub trait TextRecognizer: Send + Sync {
    /// `page_num` is 1-indexed and only used for error reporting.
    fn recognize(&self, page_num: usize, image: &DynamicImage) -> Result<String, AutofillError>;
}

/// Runs the rasterise → recognise → normalise pipeline over a document.
#[derive(Clone)]
pub struct OcrExtractor {
    rasterizer: Arc<dyn PageRasterizer>,
    recognizer: Arc<dyn TextRecognizer>,
    progress: Option<ProgressCallback>,
}

impl OcrExtractor {
    pub fn new(rasterizer: Arc<dyn PageRasterizer>, recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            rasterizer,
            recognizer,
            progress: None,
        }
    }

    /// pdfium + tesseract, configured from `config`.
    pub fn from_config(config: &AutofillConfig) -> Self {
        Self::new(
            Arc::new(PdfiumRasterizer::from_config(config)),
            Arc::new(TesseractRecognizer::from_config(config)),
        )
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Extract the text of `document`, consuming it.
    ///
    /// Rasterisation and OCR are blocking (pdfium FFI, a tesseract subprocess
    /// per page), so the work runs on tokio's blocking pool.
    pub async fn extract(&self, document: Document) -> Result<String, AutofillError> {
        let this = self.clone();
        let name = document.name().to_string();
        info!("Starting OCR: '{}' ({} bytes)", name, document.len());

        tokio::task::spawn_blocking(move || this.extract_blocking(&document.into_bytes()))
            .await
            .map_err(|e| AutofillError::Internal(format!("OCR task panicked: {}", e)))?
    }

    /// Blocking implementation of [`OcrExtractor::extract`].
    pub fn extract_blocking(&self, pdf: &[u8]) -> Result<String, AutofillError> {
        let start = Instant::now();

        let pages = self.rasterizer.rasterize(pdf)?;
        let total = pages.len();
        info!("Rasterised {} pages", total);
        if let Some(ref cb) = self.progress {
            cb.on_extraction_start(total);
        }

        let mut texts = Vec::with_capacity(total);
        for (idx, image) in pages.iter().enumerate() {
            let page_num = idx + 1;
            if let Some(ref cb) = self.progress {
                cb.on_page_start(page_num, total);
            }

            let raw = self.recognizer.recognize(page_num, image)?;
            let text = clean_text(&raw);
            debug!("Page {}: {} raw chars → {} chars", page_num, raw.len(), text.len());

            if let Some(ref cb) = self.progress {
                cb.on_page_complete(page_num, total, text.len());
            }
            texts.push(text);
        }

        let combined = texts.join(PAGE_SEPARATOR);
        info!(
            "OCR complete: {} pages, {} chars in {}ms",
            total,
            combined.len(),
            start.elapsed().as_millis()
        );
        if let Some(ref cb) = self.progress {
            cb.on_extraction_complete(total, combined.len());
        }

        Ok(combined)
    }
}
