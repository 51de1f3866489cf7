//! Factory for creating answer extractors.

use std::sync::Arc;

use marksheet_core::config::{ExtractionConfig, PdfiumConfig};
use marksheet_core::traits::VisionModel;

use crate::pattern::TextPatternExtractor;
use crate::pipeline::AnswerKeyPipeline;
use crate::vision::VisionAnswerExtractor;
use crate::AnswerExtractor;

/// Factory for creating answer-key extractors.
pub struct ExtractorFactory;

impl ExtractorFactory {
    /// Create the deterministic text-pattern extractor.
    pub fn text_pattern(
        pdfium: PdfiumConfig,
        config: &ExtractionConfig,
    ) -> Arc<dyn AnswerExtractor> {
        Arc::new(TextPatternExtractor::new(pdfium, config))
    }

    /// Create a vision extractor backed by the given model.
    pub fn vision(
        pdfium: PdfiumConfig,
        config: &ExtractionConfig,
        model: Arc<dyn VisionModel>,
    ) -> Arc<dyn AnswerExtractor> {
        Arc::new(VisionAnswerExtractor::new(pdfium, config, model))
    }

    /// Create the façade with both strategies registered. Passing
    /// `None` for the model leaves AI mode unavailable.
    pub fn pipeline(
        pdfium: PdfiumConfig,
        config: &ExtractionConfig,
        vision_model: Option<Arc<dyn VisionModel>>,
    ) -> AnswerKeyPipeline {
        AnswerKeyPipeline::new(pdfium, config, vision_model)
    }
}
