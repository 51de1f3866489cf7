//! Deterministic regex answer-key matching.
//!
//! Two strategies run over the document text in priority order. The
//! strict pattern requires a separator between question number and
//! option token; the loose table pattern accepts bare whitespace but
//! only engages when the strict pass recovered too few entries, and
//! never overrides a strict result.

use std::collections::BTreeMap;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use marksheet_core::config::{ExtractionConfig, PdfiumConfig};
use marksheet_core::error::MarksheetResult;
use marksheet_core::types::ParsedAnswer;

use crate::text::TextRunExtractor;
use crate::AnswerExtractor;

/// Strict form: question number, required separator, option token
/// ("1. A", "2) B", "3-C").
static STRICT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*[.)\-]\s*([A-Ea-e①-⑤])").unwrap());

/// Loose table form with no separator ("1 A", "2 B").
static LOOSE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s+([A-Ea-e])").unwrap());

/// Map an option token to its 1-based index.
///
/// Letters A-E (either case) and circled digits ①-⑤ map to 1..=5;
/// anything else maps to 0, the unrecognized marker, and must be
/// excluded from results.
pub fn answer_index_for_token(token: &str) -> u8 {
    match token.trim().to_uppercase().as_str() {
        "A" | "①" => 1,
        "B" | "②" => 2,
        "C" | "③" => 3,
        "D" | "④" => 4,
        "E" | "⑤" => 5,
        _ => 0,
    }
}

/// Deterministic matcher applying the strict strategy and, below the
/// fallback threshold, the loose strategy.
#[derive(Debug, Clone)]
pub struct PatternAnswerMatcher {
    strict_confidence: f32,
    loose_confidence: f32,
    fallback_threshold: usize,
}

impl PatternAnswerMatcher {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            strict_confidence: config.strict_confidence,
            loose_confidence: config.loose_confidence,
            fallback_threshold: config.loose_fallback_threshold,
        }
    }

    /// Scan `text` and return the recovered entries sorted ascending by
    /// question number. Zero matches is an empty list, not an error;
    /// the caller may suggest AI mode instead.
    pub fn match_answers(&self, text: &str) -> Vec<ParsedAnswer> {
        // Within the strict pass a repeated question number overwrites
        // (a key repeated in a table and a summary resolves to the
        // later occurrence). Across passes the strict result stands.
        let mut by_question: BTreeMap<u32, ParsedAnswer> = BTreeMap::new();

        for caps in STRICT_PATTERN.captures_iter(text) {
            let Ok(question) = caps[1].parse::<u32>() else {
                continue;
            };
            let answer = answer_index_for_token(&caps[2]);
            if question == 0 || answer == 0 {
                continue;
            }
            by_question.insert(
                question,
                ParsedAnswer::new(question, answer, self.strict_confidence, &caps[0]),
            );
        }

        let strict_count = by_question.len();
        if strict_count < self.fallback_threshold {
            tracing::debug!(
                strict_count,
                threshold = self.fallback_threshold,
                "strict pass below threshold, trying loose table pattern"
            );
            for caps in LOOSE_PATTERN.captures_iter(text) {
                let Ok(question) = caps[1].parse::<u32>() else {
                    continue;
                };
                if question == 0 || by_question.contains_key(&question) {
                    continue;
                }
                let answer = answer_index_for_token(&caps[2]);
                if answer == 0 {
                    continue;
                }
                by_question.insert(
                    question,
                    ParsedAnswer::new(question, answer, self.loose_confidence, &caps[0]),
                );
            }
        }

        by_question.into_values().collect()
    }
}

/// Deterministic answer-key extractor: embedded text in reading order
/// plus regex matching.
pub struct TextPatternExtractor {
    text: TextRunExtractor,
    matcher: PatternAnswerMatcher,
}

impl TextPatternExtractor {
    pub fn new(pdfium: PdfiumConfig, config: &ExtractionConfig) -> Self {
        Self {
            text: TextRunExtractor::new(pdfium, config),
            matcher: PatternAnswerMatcher::new(config),
        }
    }
}

#[async_trait]
impl AnswerExtractor for TextPatternExtractor {
    async fn extract(&self, pdf: &[u8]) -> MarksheetResult<Vec<ParsedAnswer>> {
        let text = self.text.extract_text(pdf).await?;
        let answers = self.matcher.match_answers(&text);
        if answers.is_empty() {
            tracing::debug!("no deterministic matches; the document may need AI mode");
        }
        Ok(answers)
    }

    fn name(&self) -> &str {
        "text-pattern"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> PatternAnswerMatcher {
        PatternAnswerMatcher::new(&ExtractionConfig::default())
    }

    #[test]
    fn test_token_mapping_letters_and_glyphs() {
        for (token, expected) in [
            ("A", 1),
            ("B", 2),
            ("C", 3),
            ("D", 4),
            ("E", 5),
            ("a", 1),
            ("e", 5),
            ("①", 1),
            ("②", 2),
            ("③", 3),
            ("④", 4),
            ("⑤", 5),
        ] {
            assert_eq!(answer_index_for_token(token), expected, "token {}", token);
        }
    }

    #[test]
    fn test_token_mapping_rejects_everything_else() {
        for token in ["F", "f", "1", "⑥", "", " ", "AB", "?"] {
            assert_eq!(answer_index_for_token(token), 0, "token {:?}", token);
        }
    }

    #[test]
    fn test_strict_separators() {
        let answers = matcher().match_answers("1. A 2) B 3-C 4 . D 5)E");
        let pairs: Vec<(u32, u8)> = answers
            .iter()
            .map(|a| (a.question_number, a.answer_index))
            .collect();
        assert_eq!(pairs, vec![(1, 1), (2, 2), (3, 3), (4, 4), (5, 5)]);
        assert!(answers.iter().all(|a| (a.confidence - 0.9).abs() < 1e-6));
    }

    #[test]
    fn test_strict_accepts_circled_glyphs() {
        let answers = matcher().match_answers("1. ① 2. ⑤ 3. ③ 4. ② 5. ④");
        let pairs: Vec<(u32, u8)> = answers
            .iter()
            .map(|a| (a.question_number, a.answer_index))
            .collect();
        assert_eq!(pairs, vec![(1, 1), (2, 5), (3, 3), (4, 2), (5, 4)]);
    }

    #[test]
    fn test_intra_strategy_last_write_wins() {
        // The same question listed twice within one pass: the later
        // occurrence stands.
        let answers = matcher().match_answers("3. B ... later summary ... 3. D 1. A 2. C 4. E 5. A");
        let q3 = answers.iter().find(|a| a.question_number == 3).unwrap();
        assert_eq!(q3.answer_index, 4);
    }

    #[test]
    fn test_inter_strategy_strict_wins() {
        // Strict "3. B" and loose "3 D" for the same question: the
        // strict result is never overwritten.
        let answers = matcher().match_answers("3. B and elsewhere 3 D");
        let q3 = answers.iter().find(|a| a.question_number == 3).unwrap();
        assert_eq!(q3.answer_index, 2);
        assert!((q3.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_loose_skipped_at_or_above_threshold() {
        // Five strict matches: the loose-only "10 B" must not appear.
        let text = "1. A 2. B 3. C 4. D 5. E 10 B";
        let answers = matcher().match_answers(text);
        assert_eq!(answers.len(), 5);
        assert!(answers.iter().all(|a| a.question_number <= 5));
    }

    #[test]
    fn test_loose_engages_below_threshold() {
        let text = "1. A 2. B 3. C 10 B";
        let answers = matcher().match_answers(text);
        assert_eq!(answers.len(), 4);
        let q10 = answers.iter().find(|a| a.question_number == 10).unwrap();
        assert_eq!(q10.answer_index, 2);
        assert!((q10.confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_worked_example() {
        let answers = matcher().match_answers("1. A  2) C  3-E  10 B");
        let triples: Vec<(u32, u8, f32)> = answers
            .iter()
            .map(|a| (a.question_number, a.answer_index, a.confidence))
            .collect();
        assert_eq!(
            triples,
            vec![(1, 1, 0.9), (2, 3, 0.9), (3, 5, 0.9), (10, 2, 0.7)]
        );
    }

    #[test]
    fn test_result_sorted_and_unique() {
        let answers = matcher().match_answers("7. C 2. A 9. B 2. E 4 D");
        let numbers: Vec<u32> = answers.iter().map(|a| a.question_number).collect();
        let mut sorted = numbers.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(numbers, sorted);
    }

    #[test]
    fn test_no_matches_is_empty_not_error() {
        assert!(matcher().match_answers("an essay with no key at all").is_empty());
        assert!(matcher().match_answers("").is_empty());
    }

    #[test]
    fn test_question_zero_is_dropped() {
        let answers = matcher().match_answers("0. A 1. B");
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].question_number, 1);
    }

    #[test]
    fn test_raw_text_keeps_matched_substring() {
        let answers = matcher().match_answers("12) D");
        assert_eq!(answers[0].raw_text, "12) D");
    }
}
