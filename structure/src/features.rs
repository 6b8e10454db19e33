//! Structural feature extraction.
//!
//! Turns raw reflection text into a fixed vector of measurable, non-semantic
//! properties. Tokenization is whitespace/punctuation based only: no locale
//! rules, no dictionaries, no stemming.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Structural features of one reflection.
///
/// Every ratio is in `[0, 1]` and every field is finite; empty text yields
/// all zeros.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralFeatures {
    /// Number of word tokens
    pub word_count: usize,
    /// Distinct (case-folded) words over total words
    pub unique_word_ratio: f64,
    /// Number of sentences containing at least one word
    pub sentence_count: usize,
    /// Words per sentence
    pub average_sentence_length: f64,
    /// ASCII punctuation over non-whitespace characters
    pub punctuation_density: f64,
    /// Uppercase letters over alphabetic characters
    pub capitalization_ratio: f64,
}

impl StructuralFeatures {
    /// Extract features from text.
    pub fn extract(text: &str) -> Self {
        let words = words(text);
        let word_count = words.len();

        let unique_word_ratio = if word_count == 0 {
            0.0
        } else {
            let distinct: BTreeSet<String> = words.iter().map(|w| w.to_lowercase()).collect();
            distinct.len() as f64 / word_count as f64
        };

        let sentence_count = sentence_count(text);
        let average_sentence_length = ratio(word_count, sentence_count);

        let mut visible = 0usize;
        let mut punctuation = 0usize;
        let mut alphabetic = 0usize;
        let mut uppercase = 0usize;
        for c in text.chars() {
            if c.is_whitespace() {
                continue;
            }
            visible += 1;
            if c.is_ascii_punctuation() {
                punctuation += 1;
            }
            if c.is_alphabetic() {
                alphabetic += 1;
                if c.is_uppercase() {
                    uppercase += 1;
                }
            }
        }

        Self {
            word_count,
            unique_word_ratio,
            sentence_count,
            average_sentence_length,
            punctuation_density: ratio(punctuation, visible),
            capitalization_ratio: ratio(uppercase, alphabetic),
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Whitespace tokens with surrounding punctuation trimmed.
fn words(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|token| !token.is_empty())
        .collect()
}

/// Count terminator-delimited segments that contain a word.
fn sentence_count(text: &str) -> usize {
    text.split(|c| matches!(c, '.' | '!' | '?'))
        .filter(|segment| segment.chars().any(char::is_alphanumeric))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_all_zero() {
        let features = StructuralFeatures::extract("");
        assert_eq!(features, StructuralFeatures::default());

        let blank = StructuralFeatures::extract("   \n\t ");
        assert_eq!(blank, StructuralFeatures::default());
    }

    #[test]
    fn test_punctuation_only_text() {
        let features = StructuralFeatures::extract("?!... --");
        assert_eq!(features.word_count, 0);
        assert_eq!(features.sentence_count, 0);
        assert_eq!(features.average_sentence_length, 0.0);
        assert_eq!(features.punctuation_density, 1.0);
        assert_eq!(features.capitalization_ratio, 0.0);
    }

    #[test]
    fn test_basic_counts() {
        let features = StructuralFeatures::extract("The sea was calm. The sky, too!");
        assert_eq!(features.word_count, 7);
        assert_eq!(features.sentence_count, 2);
        assert_eq!(features.average_sentence_length, 3.5);
        // "the" repeats: 6 distinct of 7
        assert!((features.unique_word_ratio - 6.0 / 7.0).abs() < 1e-12);
        // 3 punctuation marks over 25 visible characters
        assert!((features.punctuation_density - 3.0 / 25.0).abs() < 1e-12);
        // T and T over 22 letters
        assert!((features.capitalization_ratio - 2.0 / 22.0).abs() < 1e-12);
    }

    #[test]
    fn test_unterminated_sentence_counts() {
        let features = StructuralFeatures::extract("no terminator here");
        assert_eq!(features.sentence_count, 1);
        assert_eq!(features.average_sentence_length, 3.0);
    }

    #[test]
    fn test_case_folded_uniqueness() {
        let features = StructuralFeatures::extract("Echo echo ECHO");
        assert!((features.unique_word_ratio - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let text = "Morning pages, again. Nothing new? Maybe.";
        assert_eq!(StructuralFeatures::extract(text), StructuralFeatures::extract(text));
    }
}
