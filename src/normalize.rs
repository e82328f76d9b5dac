//! Whitespace cleanup for raw OCR output.
//!
//! tesseract emits ragged spacing (runs of spaces where columns were) and
//! stacks of empty lines between text blocks. Three deterministic passes
//! tidy that up without touching any visible character:
//!
//! 1. Collapse runs of spaces and tabs into a single space
//! 2. Collapse two or more line breaks (with any whitespace between them)
//!    into exactly one blank line
//! 3. Trim leading and trailing whitespace
//!
//! [`clean_text`] is total and idempotent.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_HORIZONTAL_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n+").unwrap());

/// Normalise whitespace in one page of OCR text.
pub fn clean_text(input: &str) -> String {
    let s = RE_HORIZONTAL_RUNS.replace_all(input, " ");
    let s = RE_BLANK_LINES.replace_all(&s, "\n\n");
    s.trim().to_string()
}
