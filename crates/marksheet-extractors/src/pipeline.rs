//! Answer-key extraction façade.

use std::sync::Arc;

use marksheet_core::config::{ExtractionConfig, PdfiumConfig};
use marksheet_core::error::{MarksheetError, MarksheetResult};
use marksheet_core::traits::VisionModel;
use marksheet_core::types::{ExtractionMode, ParsedAnswer};

use crate::pattern::TextPatternExtractor;
use crate::vision::VisionAnswerExtractor;
use crate::AnswerExtractor;

/// Façade over the deterministic and vision extraction strategies.
///
/// The caller picks the mode per invocation; the pipeline never
/// escalates from deterministic to AI on its own, since vision calls
/// carry real monetary and latency cost. Each invocation owns its
/// buffers and accumulators, so concurrent invocations share nothing
/// mutable.
pub struct AnswerKeyPipeline {
    deterministic: TextPatternExtractor,
    vision: Option<VisionAnswerExtractor>,
}

impl AnswerKeyPipeline {
    /// Build a pipeline. Passing `None` for the vision model leaves
    /// [`ExtractionMode::Ai`] unavailable.
    pub fn new(
        pdfium: PdfiumConfig,
        config: &ExtractionConfig,
        vision_model: Option<Arc<dyn VisionModel>>,
    ) -> Self {
        let vision =
            vision_model.map(|model| VisionAnswerExtractor::new(pdfium.clone(), config, model));
        Self {
            deterministic: TextPatternExtractor::new(pdfium, config),
            vision,
        }
    }

    /// Extract the answer key from `pdf` using the selected mode.
    pub async fn extract(
        &self,
        pdf: &[u8],
        mode: ExtractionMode,
    ) -> MarksheetResult<Vec<ParsedAnswer>> {
        match mode {
            ExtractionMode::Deterministic => self.deterministic.extract(pdf).await,
            ExtractionMode::Ai => match &self.vision {
                Some(vision) => vision.extract(pdf).await,
                None => Err(MarksheetError::Configuration(
                    "AI mode requested but no vision model is configured".to_string(),
                )),
            },
        }
    }

    /// Whether AI mode is available on this pipeline.
    pub fn supports_ai(&self) -> bool {
        self.vision.is_some()
    }
}
