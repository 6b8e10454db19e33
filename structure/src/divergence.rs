//! Pairwise structural divergence.

use crate::features::StructuralFeatures;

/// Weight of the word-count difference
pub const WORD_COUNT_WEIGHT: f64 = 0.2;
/// Weight of the unique-word-ratio difference
pub const UNIQUE_WORD_RATIO_WEIGHT: f64 = 0.25;
/// Weight of the sentence-count difference
pub const SENTENCE_COUNT_WEIGHT: f64 = 0.15;
/// Weight of the average-sentence-length difference
pub const AVERAGE_SENTENCE_LENGTH_WEIGHT: f64 = 0.15;
/// Weight of the punctuation-density difference
pub const PUNCTUATION_DENSITY_WEIGHT: f64 = 0.1;
/// Weight of the capitalization-ratio difference
pub const CAPITALIZATION_RATIO_WEIGHT: f64 = 0.15;

/// Symmetric structural divergence in `[0, 1]`.
///
/// A fixed weighted sum of per-feature normalized absolute differences.
/// Unbounded counts are normalized by the larger of the two values; ratios
/// are compared directly.
pub fn divergence(a: &StructuralFeatures, b: &StructuralFeatures) -> f64 {
    let sum = WORD_COUNT_WEIGHT * relative_difference(a.word_count as f64, b.word_count as f64)
        + UNIQUE_WORD_RATIO_WEIGHT * absolute_difference(a.unique_word_ratio, b.unique_word_ratio)
        + SENTENCE_COUNT_WEIGHT
            * relative_difference(a.sentence_count as f64, b.sentence_count as f64)
        + AVERAGE_SENTENCE_LENGTH_WEIGHT
            * relative_difference(a.average_sentence_length, b.average_sentence_length)
        + PUNCTUATION_DENSITY_WEIGHT
            * absolute_difference(a.punctuation_density, b.punctuation_density)
        + CAPITALIZATION_RATIO_WEIGHT
            * absolute_difference(a.capitalization_ratio, b.capitalization_ratio);

    sum.clamp(0.0, 1.0)
}

/// `|a - b| / max(a, b)`, zero when both are zero.
fn relative_difference(a: f64, b: f64) -> f64 {
    let scale = a.max(b);
    if scale <= 0.0 {
        0.0
    } else {
        ((a - b).abs() / scale).min(1.0)
    }
}

fn absolute_difference(a: f64, b: f64) -> f64 {
    (a - b).abs().min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(text: &str) -> StructuralFeatures {
        StructuralFeatures::extract(text)
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total = WORD_COUNT_WEIGHT
            + UNIQUE_WORD_RATIO_WEIGHT
            + SENTENCE_COUNT_WEIGHT
            + AVERAGE_SENTENCE_LENGTH_WEIGHT
            + PUNCTUATION_DENSITY_WEIGHT
            + CAPITALIZATION_RATIO_WEIGHT;
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_identical_text_has_zero_divergence() {
        let a = features("Quiet day. Walked to the river.");
        assert_eq!(divergence(&a, &a), 0.0);
    }

    #[test]
    fn test_empty_against_empty() {
        let empty = StructuralFeatures::default();
        assert_eq!(divergence(&empty, &empty), 0.0);
    }

    #[test]
    fn test_symmetric_and_bounded() {
        let samples = [
            "",
            "ok",
            "A LOUD DAY!!!",
            "Long, winding; sentences: with many clauses, pauses, and turns.",
            "one. two. three. four. five.",
        ];
        for a in &samples {
            for b in &samples {
                let fa = features(a);
                let fb = features(b);
                let ab = divergence(&fa, &fb);
                let ba = divergence(&fb, &fa);
                assert_eq!(ab, ba);
                assert!((0.0..=1.0).contains(&ab));
            }
        }
    }

    #[test]
    fn test_empty_against_text() {
        // Every count differs fully; unique ratio 1, no punctuation, no capitals.
        let d = divergence(&StructuralFeatures::default(), &features("calm sea"));
        let expected = WORD_COUNT_WEIGHT
            + UNIQUE_WORD_RATIO_WEIGHT
            + SENTENCE_COUNT_WEIGHT
            + AVERAGE_SENTENCE_LENGTH_WEIGHT;
        assert!((d - expected).abs() < 1e-12);
    }
}
