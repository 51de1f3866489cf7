//! Page rasterization for vision extraction.

use image::codecs::jpeg::JpegEncoder;
use pdfium_render::prelude::*;

use marksheet_core::config::{ExtractionConfig, PdfiumConfig};
use marksheet_core::error::{MarksheetError, MarksheetResult};
use marksheet_core::types::InlineImage;

use crate::pdfium;

/// Rasterizes the leading pages of a document to JPEG buffers.
///
/// Only the first `max_pages` pages are rendered; an answer key that
/// continues past them is simply not visible to the vision model. This
/// truncation bounds request size and cost. Pages are processed one at
/// a time so at most one raster buffer is held at once.
pub struct PageRasterizer {
    pdfium: PdfiumConfig,
    max_pages: usize,
    scale: f32,
    jpeg_quality: u8,
}

impl PageRasterizer {
    pub fn new(pdfium: PdfiumConfig, config: &ExtractionConfig) -> Self {
        Self {
            pdfium,
            max_pages: config.max_vision_pages,
            scale: config.render_scale,
            jpeg_quality: config.jpeg_quality,
        }
    }

    /// Render the leading pages to JPEG, in page order.
    pub async fn rasterize(&self, pdf: &[u8]) -> MarksheetResult<Vec<InlineImage>> {
        let bytes = pdf.to_vec();
        let pdfium_config = self.pdfium.clone();
        let max_pages = self.max_pages;
        let scale = self.scale;
        let quality = self.jpeg_quality;

        tokio::task::spawn_blocking(move || {
            let pdfium = pdfium::bind(&pdfium_config)?;
            let document = pdfium::load_document(&pdfium, &bytes)?;

            let total = document.pages().len() as usize;
            let selected = page_count_to_render(total, max_pages);
            if selected < total {
                tracing::debug!(total, selected, "truncating document for vision extraction");
            }

            let mut images = Vec::with_capacity(selected);
            for page in document.pages().iter().take(selected) {
                images.push(render_page_jpeg(&page, scale, quality)?);
            }
            Ok(images)
        })
        .await?
    }
}

/// Number of leading pages to render for a document of `total_pages`.
pub(crate) fn page_count_to_render(total_pages: usize, max_pages: usize) -> usize {
    total_pages.min(max_pages)
}

fn render_page_jpeg(page: &PdfPage<'_>, scale: f32, quality: u8) -> MarksheetResult<InlineImage> {
    let width = (page.width().value * scale).round() as i32;
    let height = (page.height().value * scale).round() as i32;

    let render_config = PdfRenderConfig::new().set_target_size(width, height);
    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| MarksheetError::Render(format!("Failed to render page: {}", e)))?;

    let rgb = bitmap.as_image().to_rgb8();

    let mut encoded = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut encoded, quality);
    encoder
        .encode_image(&rgb)
        .map_err(|e| MarksheetError::Render(format!("Failed to encode JPEG: {}", e)))?;

    Ok(InlineImage {
        mime_type: "image/jpeg".to_string(),
        data: encoded,
    })
}
