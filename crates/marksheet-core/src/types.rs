//! Core types for answer-key extraction.

use serde::{Deserialize, Serialize};

/// Extraction strategy selected by the caller.
///
/// Mode switching is a caller decision, never an automatic escalation:
/// AI mode carries real monetary and latency cost and must be opted
/// into per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Regex pattern matching over the PDF's embedded text.
    #[default]
    Deterministic,
    /// Rasterized pages sent to a multimodal vision model.
    Ai,
}

/// A single extracted answer-key entry.
///
/// Serializes with camelCase keys so the JSON output matches the
/// surrounding application's exchange shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAnswer {
    /// 1-based question index as it appears in the source document.
    pub question_number: u32,
    /// Selected option in 1..=5 (A..E); 0 marks an unrecognized token
    /// and never appears in a returned result set.
    pub answer_index: u8,
    /// Heuristic reliability score in [0, 1]. Not a calibrated
    /// probability.
    pub confidence: f32,
    /// The substring (pattern mode) or serialized source item (AI mode)
    /// that produced this record. Kept for audit, never re-parsed.
    pub raw_text: String,
}

impl ParsedAnswer {
    /// Create a new answer entry.
    pub fn new(
        question_number: u32,
        answer_index: u8,
        confidence: f32,
        raw_text: impl Into<String>,
    ) -> Self {
        Self {
            question_number,
            answer_index,
            confidence,
            raw_text: raw_text.into(),
        }
    }

    /// Whether the answer index is inside the legal option alphabet.
    pub fn has_valid_answer(&self) -> bool {
        (1..=5).contains(&self.answer_index)
    }
}

/// An encoded image attachment for a vision request.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    /// MIME type of the encoded bytes (e.g. "image/jpeg").
    pub mime_type: String,
    /// Encoded image bytes.
    pub data: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_answer_serializes_camel_case() {
        let answer = ParsedAnswer::new(3, 2, 0.9, "3. B");
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(json["questionNumber"], 3);
        assert_eq!(json["answerIndex"], 2);
        assert_eq!(json["rawText"], "3. B");
        assert!((json["confidence"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_parsed_answer_round_trip() {
        let answer = ParsedAnswer::new(12, 5, 0.7, "12 E");
        let json = serde_json::to_string(&answer).unwrap();
        let back: ParsedAnswer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, answer);
    }

    #[test]
    fn test_mode_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ExtractionMode::Deterministic).unwrap(),
            "\"deterministic\""
        );
        assert_eq!(serde_json::to_string(&ExtractionMode::Ai).unwrap(), "\"ai\"");
    }

    #[test]
    fn test_answer_validity_range() {
        for index in 1..=5u8 {
            assert!(ParsedAnswer::new(1, index, 0.9, "").has_valid_answer());
        }
        assert!(!ParsedAnswer::new(1, 0, 0.9, "").has_valid_answer());
        assert!(!ParsedAnswer::new(1, 6, 0.9, "").has_valid_answer());
    }
}
