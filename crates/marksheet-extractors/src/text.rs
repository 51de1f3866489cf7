//! Reading-order text extraction from PDF pages.
//!
//! Pdfium yields text as positioned segments in page coordinates
//! (origin bottom-left, y increasing upward). Reading order is
//! approximated by sorting segments top-to-bottom with a same-line
//! tolerance band, left-to-right within a band. This is a heuristic,
//! not layout analysis; multi-column or rotated text may order
//! incorrectly, which degrades the downstream match rate rather than
//! failing.

use std::cmp::Ordering;

use marksheet_core::config::{ExtractionConfig, PdfiumConfig};
use marksheet_core::error::MarksheetResult;

use crate::pdfium;

/// A positioned text fragment from a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// Extracts a document's text in approximate reading order.
#[derive(Debug, Clone)]
pub struct TextRunExtractor {
    pdfium: PdfiumConfig,
    line_tolerance: f32,
}

impl TextRunExtractor {
    pub fn new(pdfium: PdfiumConfig, config: &ExtractionConfig) -> Self {
        Self {
            pdfium,
            line_tolerance: config.line_tolerance,
        }
    }

    /// Extract the concatenated text of every page, pages joined with a
    /// leading space.
    ///
    /// A page without extractable text contributes an empty string; a
    /// pure-image PDF therefore yields near-empty output rather than an
    /// error, and the caller sees it as a low match rate.
    pub async fn extract_text(&self, pdf: &[u8]) -> MarksheetResult<String> {
        let bytes = pdf.to_vec();
        let pdfium_config = self.pdfium.clone();
        let tolerance = self.line_tolerance;

        tokio::task::spawn_blocking(move || {
            let pdfium = pdfium::bind(&pdfium_config)?;
            let document = pdfium::load_document(&pdfium, &bytes)?;

            let mut all_text = String::new();
            for page in document.pages().iter() {
                let mut runs = Vec::new();
                if let Ok(text) = page.text() {
                    for segment in text.segments().iter() {
                        let bounds = segment.bounds();
                        runs.push(TextRun {
                            text: segment.text(),
                            x: bounds.left.value,
                            y: bounds.bottom.value,
                        });
                    }
                }
                all_text.push(' ');
                all_text.push_str(&join_reading_order(runs, tolerance));
            }

            tracing::debug!(chars = all_text.len(), "extracted document text");
            Ok(all_text)
        })
        .await?
    }
}

/// Order runs top-to-bottom then left-to-right and join with single
/// spaces.
///
/// Runs whose vertical positions differ by no more than `tolerance`
/// count as the same line and are ordered by x.
pub(crate) fn join_reading_order(mut runs: Vec<TextRun>, tolerance: f32) -> String {
    runs.sort_by(|a, b| {
        if (a.y - b.y).abs() > tolerance {
            // Higher y first: top of the page leads.
            b.y.partial_cmp(&a.y).unwrap_or(Ordering::Equal)
        } else {
            a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal)
        }
    });

    runs.iter()
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
