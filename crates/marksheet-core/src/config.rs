//! Configuration for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{MarksheetError, MarksheetResult};

/// Tuning knobs for answer-key extraction.
///
/// The confidence values are hand-tuned constants carried over from
/// field use, not calibrated probabilities. They live here rather than
/// as hidden literals so deployments can adjust them without code
/// changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Confidence assigned to strict-pattern matches ("1. A", "2) B").
    pub strict_confidence: f32,
    /// Confidence assigned to loose-pattern matches ("1 A").
    pub loose_confidence: f32,
    /// Confidence assigned to vision-derived answers. The model exposes
    /// no calibrated uncertainty, so every entry gets this fixed value.
    pub vision_confidence: f32,
    /// Strict-match count below which the loose pattern is attempted.
    /// A heuristic, not a load-bearing correctness constraint.
    pub loose_fallback_threshold: usize,
    /// Vertical distance (page units) under which two text runs are
    /// treated as the same line when approximating reading order.
    pub line_tolerance: f32,
    /// Pages rasterized for vision extraction. Later pages are dropped
    /// to bound request size; an answer key continuing past this limit
    /// is not visible to the model.
    pub max_vision_pages: usize,
    /// Render scale factor for rasterization. 2.0 keeps small print
    /// legible to the model.
    pub render_scale: f32,
    /// JPEG quality (1-100) for rasterized pages. JPEG over lossless
    /// keeps the request payload bounded.
    pub jpeg_quality: u8,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strict_confidence: 0.9,
            loose_confidence: 0.7,
            vision_confidence: 0.95,
            loose_fallback_threshold: 5,
            line_tolerance: 5.0,
            max_vision_pages: 3,
            render_scale: 2.0,
            jpeg_quality: 80,
        }
    }
}

impl ExtractionConfig {
    /// Load configuration from a file (TOML or JSON).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> MarksheetResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| MarksheetError::Configuration(e.to_string())),
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| MarksheetError::Configuration(e.to_string())),
            _ => Err(MarksheetError::Configuration(
                "Unsupported config file format. Use .toml or .json".to_string(),
            )),
        }
    }
}

/// Explicit pdfium binding configuration.
///
/// The rendering library is bound from this configuration inside each
/// invocation instead of through process-global state, so two pipelines
/// with different library locations can coexist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfiumConfig {
    /// Directory containing the pdfium dynamic library. When unset the
    /// system library search path is used.
    pub library_path: Option<PathBuf>,
}
