//! Source-PDF rasterisation for vision models.
//!
//! Vision endpoints take images, not PDF bytes, so every page of an uploaded
//! PDF is rendered to a bitmap first. All pages are rendered; a long resume
//! must reach the model in full.
//!
//! ## Why spawn_blocking?
//!
//! pdfium is a C++ library with thread-local state and no async story. The
//! work runs on tokio's blocking pool so the session loop keeps serving
//! events while a large document renders.

use crate::error::ExtractionError;
use crate::pdfium;
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// Render every page of an in-memory PDF.
pub async fn rasterise_pdf(
    bytes: Vec<u8>,
    dpi: u32,
    max_pixels: u32,
) -> Result<Vec<DynamicImage>, ExtractionError> {
    tokio::task::spawn_blocking(move || rasterise_blocking(bytes, dpi, max_pixels))
        .await
        .map_err(|e| ExtractionError::Internal(format!("Render task panicked: {}", e)))?
}

/// Pixel width for a page `width_pt` points wide at `dpi`, capped at `max_pixels`.
pub fn target_width(width_pt: f32, dpi: u32, max_pixels: u32) -> i32 {
    let px = (width_pt * dpi as f32 / 72.0).round() as u32;
    px.clamp(1, max_pixels) as i32
}

fn rasterise_blocking(
    bytes: Vec<u8>,
    dpi: u32,
    max_pixels: u32,
) -> Result<Vec<DynamicImage>, ExtractionError> {
    let failed = |page: usize, detail: String| ExtractionError::RasterisationFailed { page, detail };

    let pdfium = pdfium::bind().map_err(|e| failed(0, e))?;
    let document = pdfium
        .load_pdf_from_byte_vec(bytes, None)
        .map_err(|e| failed(0, format!("{:?}", e)))?;

    let pages = document.pages();
    info!("Source PDF loaded: {} pages", pages.len());

    let mut images = Vec::with_capacity(pages.len() as usize);
    for (idx, page) in pages.iter().enumerate() {
        let config = PdfRenderConfig::new()
            .set_target_width(target_width(page.width().value, dpi, max_pixels))
            .set_maximum_height(max_pixels as i32);
        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| failed(idx + 1, format!("{:?}", e)))?;
        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );
        images.push(image);
    }

    if images.is_empty() {
        return Err(failed(0, "document has no pages".into()));
    }
    Ok(images)
}
