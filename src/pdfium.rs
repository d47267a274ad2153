//! PDFium binding shared by PDF ingestion and PDF export.
//!
//! The shared library is located by `pdfium-auto`: `PDFIUM_LIB_PATH` if set,
//! otherwise a cached download, otherwise a fresh download on first use.
//! Binding is blocking; call it from `spawn_blocking`.

use pdfium_render::prelude::Pdfium;
use tracing::debug;

/// Bind to the PDFium library, downloading it first if necessary.
pub fn bind() -> Result<Pdfium, String> {
    let pdfium = pdfium_auto::bind_pdfium_silent().map_err(|e| e.to_string())?;
    debug!("PDFium bound");
    Ok(pdfium)
}
