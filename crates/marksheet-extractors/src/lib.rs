//! marksheet-extractors - Answer-key extraction pipeline for marksheet.
//!
//! Turns the raw bytes of a bubble-sheet answer-key PDF into an ordered
//! list of question-number/answer pairs, via two strategies behind one
//! façade:
//!
//! - **Deterministic** - embedded text in approximate reading order,
//!   matched against regex patterns.
//! - **AI** - leading pages rasterized to JPEG and sent to a multimodal
//!   vision model.
//!
//! # Example
//!
//! ```ignore
//! use marksheet_core::{ExtractionConfig, ExtractionMode, PdfiumConfig};
//! use marksheet_extractors::AnswerKeyPipeline;
//!
//! let pipeline = AnswerKeyPipeline::new(PdfiumConfig::default(), &ExtractionConfig::default(), None);
//! let answers = pipeline.extract(&pdf_bytes, ExtractionMode::Deterministic).await?;
//! ```

mod factory;
mod pattern;
mod pdfium;
mod pipeline;
mod raster;
mod text;
mod vision;

pub use factory::ExtractorFactory;
pub use pattern::{answer_index_for_token, PatternAnswerMatcher, TextPatternExtractor};
pub use pipeline::AnswerKeyPipeline;
pub use raster::PageRasterizer;
pub use text::{TextRun, TextRunExtractor};
pub use vision::VisionAnswerExtractor;

use async_trait::async_trait;
use marksheet_core::error::MarksheetResult;
use marksheet_core::types::ParsedAnswer;

/// Core trait implemented by every answer-key extraction strategy.
#[async_trait]
pub trait AnswerExtractor: Send + Sync {
    /// Extract answer-key entries from the raw bytes of a PDF document.
    ///
    /// The returned list is sorted ascending by question number and
    /// contains no duplicate question numbers; gaps are legal and mark
    /// questions the strategy could not recover. An empty list is a
    /// valid result, not an error.
    async fn extract(&self, pdf: &[u8]) -> MarksheetResult<Vec<ParsedAnswer>>;

    /// Human-readable name for this extractor.
    fn name(&self) -> &str;
}
