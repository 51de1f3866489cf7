//! Factory for creating vision model providers.

use std::sync::Arc;

use marksheet_core::error::MarksheetResult;
use marksheet_core::traits::{VisionConfig, VisionModel};

use crate::gemini::GeminiVision;

/// Factory for creating vision model providers.
pub struct VisionFactory;

impl VisionFactory {
    /// Create a Gemini provider with default configuration.
    pub fn gemini() -> MarksheetResult<Arc<dyn VisionModel>> {
        Self::gemini_with_config(VisionConfig::default())
    }

    /// Create a Gemini provider with a specific model.
    pub fn gemini_with_model(model: impl Into<String>) -> MarksheetResult<Arc<dyn VisionModel>> {
        let config = VisionConfig {
            model: model.into(),
            ..Default::default()
        };
        Self::gemini_with_config(config)
    }

    /// Create a Gemini provider from the given configuration.
    pub fn gemini_with_config(config: VisionConfig) -> MarksheetResult<Arc<dyn VisionModel>> {
        let provider = GeminiVision::new(config)?;
        Ok(Arc::new(provider))
    }
}
