//! Vision-model answer-key extraction.
//!
//! Rasterizes the leading pages, sends them with a fixed instruction
//! block to a multimodal model, and parses the free-form response into
//! answer entries. One attempt per invocation; failures propagate to
//! the caller, which decides whether the user retries.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use marksheet_core::config::{ExtractionConfig, PdfiumConfig};
use marksheet_core::error::{MarksheetError, MarksheetResult};
use marksheet_core::traits::VisionModel;
use marksheet_core::types::ParsedAnswer;

use crate::raster::PageRasterizer;
use crate::AnswerExtractor;

/// Instruction block sent with the rasterized pages.
const EXTRACTION_PROMPT: &str = "\
You are an expert OMR answer key extractor.
Analyze the following images which contain an answer key for an exam.
Extract the Question Number and the Correct Answer.

Rules:
1. Answers might be numbers (1-5) or alphabets (A-E). Map alphabets to numbers: A=1, B=2, C=3, D=4, E=5.
2. Ignore headers, footers, or irrelevant text.
3. Return ONLY a valid JSON array of objects.
4. Format: [{\"questionNum\": 1, \"answer\": 3}, {\"questionNum\": 2, \"answer\": 1}, ...]
5. Ensure the numbers are integers.";

/// First `[ { ... } ]`-shaped span in the response text.
static JSON_ARRAY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\s*\{[\s\S]*\}\s*\]").unwrap());

/// Accepted key aliases per logical field, highest priority first.
const QUESTION_KEYS: [&str; 3] = ["questionNum", "id", "number"];
const ANSWER_KEYS: [&str; 2] = ["answer", "val"];

/// Answer-key extractor that rasterizes leading pages and queries a
/// multimodal vision model.
pub struct VisionAnswerExtractor {
    rasterizer: PageRasterizer,
    model: Arc<dyn VisionModel>,
    confidence: f32,
}

impl VisionAnswerExtractor {
    pub fn new(
        pdfium: PdfiumConfig,
        config: &ExtractionConfig,
        model: Arc<dyn VisionModel>,
    ) -> Self {
        Self {
            rasterizer: PageRasterizer::new(pdfium, config),
            model,
            confidence: config.vision_confidence,
        }
    }
}

#[async_trait]
impl AnswerExtractor for VisionAnswerExtractor {
    async fn extract(&self, pdf: &[u8]) -> MarksheetResult<Vec<ParsedAnswer>> {
        let images = self.rasterizer.rasterize(pdf).await?;

        tracing::debug!(
            model = %self.model.model_name(),
            pages = images.len(),
            "requesting vision extraction"
        );

        let response = self.model.complete(EXTRACTION_PROMPT, &images).await?;
        parse_answer_response(&response, self.confidence)
    }

    fn name(&self) -> &str {
        "vision"
    }
}

/// Pull the JSON array candidate out of free-form response text.
///
/// Falls back to stripping Markdown code fences when no bracketed span
/// is found; that candidate may still fail to parse, which is the
/// signal that the model went off-script.
fn json_candidate(text: &str) -> String {
    if let Some(m) = JSON_ARRAY_PATTERN.find(text) {
        return m.as_str().to_string();
    }
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse response text into answer entries at the given confidence.
///
/// Entries whose question number or answer cannot be read as an
/// integer, or whose answer falls outside 1..=5, are dropped rather
/// than fabricated.
pub(crate) fn parse_answer_response(
    text: &str,
    confidence: f32,
) -> MarksheetResult<Vec<ParsedAnswer>> {
    let candidate = json_candidate(text);

    let items: Vec<Value> = serde_json::from_str(&candidate).map_err(|_| {
        MarksheetError::MalformedResponse(
            "Vision model did not return a JSON array of answers; the page images may be too unclear to read"
                .to_string(),
        )
    })?;

    let mut answers = Vec::with_capacity(items.len());
    for item in &items {
        let Some(question) = integer_field(item, &QUESTION_KEYS) else {
            tracing::debug!(%item, "dropping entry without a question number");
            continue;
        };
        let Some(answer) = integer_field(item, &ANSWER_KEYS) else {
            tracing::debug!(%item, "dropping entry without an answer");
            continue;
        };
        if question == 0 || !(1..=5).contains(&answer) {
            continue;
        }
        answers.push(ParsedAnswer::new(
            question as u32,
            answer as u8,
            confidence,
            item.to_string(),
        ));
    }

    answers.sort_by_key(|a| a.question_number);
    answers.dedup_by_key(|a| a.question_number);
    Ok(answers)
}

/// Resolve the first present alias to an integer, accepting numeric
/// strings as the models sometimes emit them.
fn integer_field(item: &Value, keys: &[&str]) -> Option<u64> {
    for key in keys {
        match item.get(key) {
            Some(value) => {
                if let Some(n) = value.as_u64() {
                    return Some(n);
                }
                if let Some(s) = value.as_str() {
                    if let Ok(n) = s.trim().parse::<u64>() {
                        return Some(n);
                    }
                }
                return None;
            }
            None => continue,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_bare_json_array() {
        let text = r#"[{"questionNum": 2, "answer": 1}, {"questionNum": 1, "answer": 3}]"#;
        let answers = parse_answer_response(text, 0.95).unwrap();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].question_number, 1);
        assert_eq!(answers[0].answer_index, 3);
        assert_eq!(answers[1].question_number, 2);
        assert!(answers.iter().all(|a| (a.confidence - 0.95).abs() < 1e-6));
    }

    #[test]
    fn test_parses_array_embedded_in_prose() {
        let text = "Here is the extracted key:\n[ {\"questionNum\": 1, \"answer\": 2} ]\nLet me know!";
        let answers = parse_answer_response(text, 0.95).unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].answer_index, 2);
    }

    #[test]
    fn test_parses_code_fenced_array() {
        let text = "```json\n[{\"questionNum\": 4, \"answer\": 5}]\n```";
        let answers = parse_answer_response(text, 0.95).unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].question_number, 4);
    }

    #[test]
    fn test_malformed_response_is_an_error_not_empty() {
        let result = parse_answer_response("I could not read the images, sorry.", 0.95);
        assert!(matches!(result, Err(MarksheetError::MalformedResponse(_))));
    }

    #[test]
    fn test_alias_priority_question_num_first() {
        let text = r#"[{"questionNum": 7, "id": 99, "answer": 1}]"#;
        let answers = parse_answer_response(text, 0.95).unwrap();
        assert_eq!(answers[0].question_number, 7);
    }

    #[test]
    fn test_alternate_key_names_accepted() {
        let text = r#"[{"id": 3, "val": 2}, {"number": 4, "answer": 1}]"#;
        let answers = parse_answer_response(text, 0.95).unwrap();
        let pairs: Vec<(u32, u8)> = answers
            .iter()
            .map(|a| (a.question_number, a.answer_index))
            .collect();
        assert_eq!(pairs, vec![(3, 2), (4, 1)]);
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let text = r#"[{"questionNum": "12", "answer": "4"}]"#;
        let answers = parse_answer_response(text, 0.95).unwrap();
        assert_eq!(answers[0].question_number, 12);
        assert_eq!(answers[0].answer_index, 4);
    }

    #[test]
    fn test_unparseable_entries_are_dropped() {
        let text = r#"[
            {"questionNum": 1, "answer": 3},
            {"questionNum": "not a number", "answer": 2},
            {"answer": 2},
            {"questionNum": 4}
        ]"#;
        let answers = parse_answer_response(text, 0.95).unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].question_number, 1);
    }

    #[test]
    fn test_out_of_range_answers_are_dropped() {
        let text = r#"[
            {"questionNum": 1, "answer": 0},
            {"questionNum": 2, "answer": 6},
            {"questionNum": 3, "answer": 5}
        ]"#;
        let answers = parse_answer_response(text, 0.95).unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].question_number, 3);
    }

    #[test]
    fn test_output_sorted_with_duplicates_collapsed() {
        let text = r#"[
            {"questionNum": 9, "answer": 1},
            {"questionNum": 2, "answer": 4},
            {"questionNum": 9, "answer": 3}
        ]"#;
        let answers = parse_answer_response(text, 0.95).unwrap();
        let numbers: Vec<u32> = answers.iter().map(|a| a.question_number).collect();
        assert_eq!(numbers, vec![2, 9]);
    }

    #[test]
    fn test_raw_text_keeps_serialized_item() {
        let text = r#"[{"questionNum": 1, "answer": 3}]"#;
        let answers = parse_answer_response(text, 0.95).unwrap();
        let raw: Value = serde_json::from_str(&answers[0].raw_text).unwrap();
        assert_eq!(raw["questionNum"], 1);
    }

    #[test]
    fn test_prompt_names_the_output_shape() {
        assert!(EXTRACTION_PROMPT.contains("JSON array"));
        assert!(EXTRACTION_PROMPT.contains("questionNum"));
        assert!(EXTRACTION_PROMPT.contains("A=1"));
    }
}
