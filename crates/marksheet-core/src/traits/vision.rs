//! Multimodal vision model abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MarksheetResult;
use crate::types::InlineImage;

/// Configuration for a vision model provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Model name/identifier. Empty means the provider's default.
    pub model: String,
    /// Maximum tokens to generate.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// API key (if not using the environment variable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL for the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Caller-side deadline for a single completion call, in seconds.
    /// The service defines no worst-case latency bound of its own.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_temperature() -> f32 {
    0.1
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            api_key: None,
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl VisionConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(model) = std::env::var("MARKSHEET_VISION_MODEL") {
            config.model = model;
        }
        if let Ok(api_key) = std::env::var("GEMINI_API_KEY") {
            config.api_key = Some(api_key);
        }
        if let Ok(timeout) = std::env::var("MARKSHEET_VISION_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                config.timeout_secs = secs;
            }
        }

        config
    }
}

/// A multimodal completion model accepting one text prompt plus inline
/// image attachments.
///
/// Implementations make exactly one attempt per call; retrying is the
/// caller's decision.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Send the prompt with the given images and return the raw
    /// response text.
    async fn complete(&self, prompt: &str, images: &[InlineImage]) -> MarksheetResult<String>;

    /// Model name/identifier in use.
    fn model_name(&self) -> &str;
}
