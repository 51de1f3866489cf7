//! Gemini vision model provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use marksheet_core::error::{MarksheetError, MarksheetResult};
use marksheet_core::traits::{VisionConfig, VisionModel};
use marksheet_core::types::InlineImage;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Gemini multimodal provider.
pub struct GeminiVision {
    client: Client,
    config: VisionConfig,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text { text: String },
    InlineData { inline_data: GeminiInlineData },
}

#[derive(Debug, Serialize)]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

impl GeminiVision {
    /// Create a new Gemini provider.
    ///
    /// The API key is taken from the config, falling back to the
    /// `GEMINI_API_KEY` environment variable; a missing key is a
    /// configuration error distinct from service failures so the caller
    /// can name the remediation.
    pub fn new(config: VisionConfig) -> MarksheetResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .ok_or_else(|| {
                MarksheetError::Configuration(
                    "Gemini API key not found. Set GEMINI_API_KEY environment variable or provide api_key in config.".to_string(),
                )
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                MarksheetError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| GEMINI_API_URL.to_string());

        let mut config = config;
        if config.model.is_empty() {
            config.model = DEFAULT_MODEL.to_string();
        }

        Ok(Self {
            client,
            config,
            api_key,
            base_url,
        })
    }

    fn build_request(&self, prompt: &str, images: &[InlineImage]) -> GeminiRequest {
        let mut parts = vec![GeminiPart::Text {
            text: prompt.to_string(),
        }];
        for image in images {
            parts.push(GeminiPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: image.mime_type.clone(),
                    data: STANDARD.encode(&image.data),
                },
            });
        }

        GeminiRequest {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiGenerationConfig {
                max_output_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            },
        }
    }

    /// Pull the response text out of a successful response body.
    fn extract_text(body: &str) -> MarksheetResult<String> {
        let response: GeminiResponse = serde_json::from_str(body)
            .map_err(|e| MarksheetError::vision(format!("Failed to parse response: {}", e)))?;

        let text = response
            .candidates
            .first()
            .and_then(|c| c.content.parts.iter().find_map(|p| p.text.clone()))
            .ok_or_else(|| MarksheetError::vision("Empty response from Gemini"))?;

        Ok(text)
    }
}

#[async_trait]
impl VisionModel for GeminiVision {
    async fn complete(&self, prompt: &str, images: &[InlineImage]) -> MarksheetResult<String> {
        let request = self.build_request(prompt, images);

        tracing::debug!(
            model = %self.config.model,
            images = images.len(),
            "sending vision request"
        );

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent?key={}",
                self.base_url, self.config.model, self.api_key
            ))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                MarksheetError::vision_with_source("Gemini API request failed", e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            MarksheetError::vision_with_source("Failed to read response body", e)
        })?;

        if !status.is_success() {
            let error: Result<GeminiErrorBody, _> = serde_json::from_str(&body);
            let message = error
                .map(|e| e.error.message)
                .unwrap_or_else(|_| body.clone());
            // A rejected credential is a configuration problem, not a
            // transient service failure.
            if status == reqwest::StatusCode::UNAUTHORIZED
                || status == reqwest::StatusCode::FORBIDDEN
            {
                return Err(MarksheetError::Configuration(format!(
                    "Gemini API rejected the credential ({}): {}",
                    status, message
                )));
            }
            return Err(MarksheetError::vision(format!(
                "Gemini API error ({}): {}",
                status, message
            )));
        }

        let text = Self::extract_text(&body)?;
        tracing::debug!(chars = text.len(), "vision response received");

        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> VisionConfig {
        VisionConfig {
            api_key: Some("test-key".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_fills_default_model() {
        let provider = GeminiVision::new(test_config()).unwrap();
        assert_eq!(provider.model_name(), DEFAULT_MODEL);
    }

    #[test]
    fn test_new_keeps_explicit_model() {
        let config = VisionConfig {
            model: "gemini-1.5-pro".to_string(),
            ..test_config()
        };
        let provider = GeminiVision::new(config).unwrap();
        assert_eq!(provider.model_name(), "gemini-1.5-pro");
    }

    #[test]
    fn test_request_shape_has_text_then_inline_images() {
        let provider = GeminiVision::new(test_config()).unwrap();
        let images = vec![InlineImage {
            mime_type: "image/jpeg".to_string(),
            data: vec![0xFF, 0xD8, 0xFF],
        }];
        let request = provider.build_request("read the key", &images);
        let json = serde_json::to_value(&request).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "read the key");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(parts[1]["inline_data"]["data"], STANDARD.encode([0xFF, 0xD8, 0xFF]));
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2000);
    }

    #[test]
    fn test_extract_text_from_candidate() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "[{\"questionNum\": 1, \"answer\": 3}]"}]}}
            ]
        }"#;
        let text = GeminiVision::extract_text(body).unwrap();
        assert!(text.contains("questionNum"));
    }

    #[test]
    fn test_extract_text_rejects_empty_candidates() {
        let result = GeminiVision::extract_text(r#"{"candidates": []}"#);
        assert!(matches!(result, Err(MarksheetError::Vision { .. })));
    }

    #[test]
    fn test_extract_text_rejects_non_json_body() {
        let result = GeminiVision::extract_text("<html>502 Bad Gateway</html>");
        assert!(matches!(result, Err(MarksheetError::Vision { .. })));
    }
}
