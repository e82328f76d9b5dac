//! PDF rasterisation via pdfium.
//!
//! pdfium is loaded from an explicit library path when one is configured and
//! from the system library search path otherwise. A configured path that does
//! not exist is reported as [`AutofillError::PdfiumNotFound`] before any
//! binding is attempted.

use super::PageRasterizer;
use crate::config::AutofillConfig;
use crate::error::AutofillError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Points per inch in PDF user space.
const POINTS_PER_INCH: f32 = 72.0;

/// Renders every page of a PDF at a fixed DPI.
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    library_path: Option<PathBuf>,
    dpi: u32,
    max_pixels: u32,
}

impl PdfiumRasterizer {
    pub fn new(library_path: Option<PathBuf>, dpi: u32, max_pixels: u32) -> Self {
        Self {
            library_path,
            dpi,
            max_pixels,
        }
    }

    pub fn from_config(config: &AutofillConfig) -> Self {
        Self::new(
            config.pdfium_lib_path.clone(),
            config.dpi,
            config.max_rendered_pixels,
        )
    }

    fn bind(&self) -> Result<Pdfium, AutofillError> {
        let bindings = match self.library_path {
            Some(ref configured) => {
                let path = resolve_library_path(configured)?;
                debug!("Binding pdfium from {}", path.display());
                Pdfium::bind_to_library(path.as_path())
            }
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| AutofillError::PdfiumBindingFailed(format!("{:?}", e)))?;

        Ok(Pdfium::new(bindings))
    }
}

/// Accept either the library file itself or the directory containing it.
fn resolve_library_path(configured: &Path) -> Result<PathBuf, AutofillError> {
    let path = if configured.is_dir() {
        configured.join(Pdfium::pdfium_platform_library_name())
    } else {
        configured.to_path_buf()
    };
    if !path.exists() {
        return Err(AutofillError::PdfiumNotFound { path });
    }
    Ok(path)
}

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize(&self, pdf: &[u8]) -> Result<Vec<DynamicImage>, AutofillError> {
        let pdfium = self.bind()?;

        let document = pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(|e| AutofillError::CorruptPdf {
                name: "upload".to_string(),
                detail: format!("{:?}", e),
            })?;

        let pages = document.pages();
        info!("PDF loaded: {} pages", pages.len());

        let render_config = PdfRenderConfig::new()
            .scale_page_by_factor(self.dpi as f32 / POINTS_PER_INCH)
            .set_maximum_width(self.max_pixels as i32)
            .set_maximum_height(self.max_pixels as i32);

        let mut images = Vec::with_capacity(pages.len() as usize);
        for (idx, page) in pages.iter().enumerate() {
            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                AutofillError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );
            images.push(image);
        }

        Ok(images)
    }
}
