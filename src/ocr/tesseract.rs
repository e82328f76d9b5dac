//! Page recognition by running the `tesseract` executable.
//!
//! Each page image is written as a lossless PNG to a temp file and handed to
//! `tesseract <image> stdout`. The executable path is configuration; a launch
//! failure with `NotFound` becomes [`AutofillError::OcrEngineNotFound`].

use super::TextRecognizer;
use crate::config::AutofillConfig;
use crate::error::AutofillError;
use image::DynamicImage;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// Runs tesseract once per page image.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    binary: PathBuf,
    lang: Option<String>,
}

impl TesseractRecognizer {
    pub fn new(binary: impl Into<PathBuf>, lang: Option<String>) -> Self {
        Self {
            binary: binary.into(),
            lang,
        }
    }

    pub fn from_config(config: &AutofillConfig) -> Self {
        Self::new(config.tesseract_path.clone(), config.tesseract_lang.clone())
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Probe `tesseract --version` so a missing engine is reported at startup
    /// instead of on the first upload.
    pub fn check_available(&self) -> Result<String, AutofillError> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .output()
            .map_err(|e| self.launch_error(0, e))?;

        let banner = String::from_utf8_lossy(&output.stdout);
        let banner = if banner.trim().is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            banner.into_owned()
        };
        Ok(banner.lines().next().unwrap_or("tesseract").trim().to_string())
    }

    fn launch_error(&self, page: usize, e: std::io::Error) -> AutofillError {
        if e.kind() == ErrorKind::NotFound {
            AutofillError::OcrEngineNotFound {
                path: self.binary.clone(),
            }
        } else {
            AutofillError::OcrFailed {
                page,
                detail: format!("failed to run {}: {}", self.binary.display(), e),
            }
        }
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, page_num: usize, image: &DynamicImage) -> Result<String, AutofillError> {
        let tmp = tempfile::Builder::new()
            .prefix("autofill-page-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| AutofillError::Internal(format!("tempfile: {e}")))?;

        image
            .save_with_format(tmp.path(), image::ImageFormat::Png)
            .map_err(|e| AutofillError::OcrFailed {
                page: page_num,
                detail: format!("could not encode page image: {e}"),
            })?;

        let mut cmd = Command::new(&self.binary);
        cmd.arg(tmp.path()).arg("stdout");
        if let Some(ref lang) = self.lang {
            cmd.arg("-l").arg(lang);
        }

        let output = cmd.output().map_err(|e| self.launch_error(page_num, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("tesseract exited with {} on page {}", output.status, page_num);
            return Err(AutofillError::OcrFailed {
                page: page_num,
                detail: stderr.trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("tesseract page {}: {} chars", page_num, text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn blank_page() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255])))
    }

    #[test]
    fn missing_binary_is_reported_by_path() {
        let r = TesseractRecognizer::new("/definitely/not/tesseract", None);
        match r.recognize(1, &blank_page()).unwrap_err() {
            AutofillError::OcrEngineNotFound { path } => {
                assert_eq!(path, PathBuf::from("/definitely/not/tesseract"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn check_available_reports_missing_binary() {
        let r = TesseractRecognizer::new("/definitely/not/tesseract", Some("eng".into()));
        assert!(matches!(
            r.check_available(),
            Err(AutofillError::OcrEngineNotFound { .. })
        ));
    }
}
