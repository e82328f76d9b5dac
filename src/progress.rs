//! Progress-callback trait for per-page OCR events.
//!
//! An OCR pass over a multi-page scan can take many seconds. Inject an
//! [`Arc<dyn OcrProgressCallback>`] via [`crate::ocr::OcrExtractor::with_progress`]
//! to learn which page is being recognised. The library knows nothing about how
//! the host shows it; the `autofill` binary drives a terminal spinner.
//!
//! # Example
//!
//! ```rust
//! use pdf_autofill::OcrProgressCallback;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct PageCounter(AtomicUsize);
//!
//! impl OcrProgressCallback for PageCounter {
//!     fn on_page_complete(&self, _page_num: usize, _total_pages: usize, _text_len: usize) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//! ```

use std::sync::Arc;

/// Called by the OCR extractor as it works through a document.
///
/// Pages are processed one at a time, in order, on a blocking-pool thread, so
/// implementations must be `Send + Sync`. All methods default to no-ops.
pub trait OcrProgressCallback: Send + Sync {
    /// Called once after rasterisation, before the first page is recognised.
    fn on_extraction_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a page is handed to the OCR engine (1-indexed).
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called with the normalised text length once a page is recognised.
    fn on_page_complete(&self, page_num: usize, total_pages: usize, text_len: usize) {
        let _ = (page_num, total_pages, text_len);
    }

    /// Called once with the length of the combined document text.
    fn on_extraction_complete(&self, total_pages: usize, text_len: usize) {
        let _ = (total_pages, text_len);
    }
}

/// Used when no callback is configured.
pub struct NoopProgressCallback;

impl OcrProgressCallback for NoopProgressCallback {}

/// Shared handle stored by [`crate::ocr::OcrExtractor`].
pub type ProgressCallback = Arc<dyn OcrProgressCallback>;
