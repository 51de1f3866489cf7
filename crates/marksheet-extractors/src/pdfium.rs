//! Explicit pdfium binding.
//!
//! The rendering library is bound from [`PdfiumConfig`] at the call
//! site; each blocking invocation creates and owns its binding rather
//! than sharing process-global state.

use pdfium_render::prelude::*;

use marksheet_core::config::PdfiumConfig;
use marksheet_core::error::{MarksheetError, MarksheetResult};

/// Bind the pdfium dynamic library described by `config`.
pub(crate) fn bind(config: &PdfiumConfig) -> MarksheetResult<Pdfium> {
    let bindings = match &config.library_path {
        Some(path) => {
            let dir = path.to_string_lossy();
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir.as_ref()))
        }
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| {
        MarksheetError::Configuration(format!(
            "Failed to bind pdfium library: {}. Install pdfium or set library_path.",
            e
        ))
    })?;

    Ok(Pdfium::new(bindings))
}

/// Load a document from in-memory bytes.
pub(crate) fn load_document<'a>(
    pdfium: &'a Pdfium,
    bytes: &'a [u8],
) -> MarksheetResult<PdfDocument<'a>> {
    pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| MarksheetError::InvalidPdf(format!("Failed to parse PDF: {}", e)))
}
