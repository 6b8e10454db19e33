//! Structural novelty of an incoming reflection.
//!
//! Decides whether a new reflection may reinforce accumulated meaning. Only
//! structure is compared: a paraphrase or a repeated confirmation has the
//! same shape as what came before and therefore is not novel.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::NoveltyConfig;
use crate::divergence::divergence;
use crate::features::StructuralFeatures;
use crate::types::ReflectionRecord;

/// Weight of the nearest-prior divergence
pub const NEAREST_WEIGHT: f64 = 0.6;
/// Weight of the mean divergence
pub const MEAN_WEIGHT: f64 = 0.4;

/// Novelty assessment of one incoming reflection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoveltyScore {
    /// Blended score in `[0, 1]`
    pub score: f64,
    /// Whether the score reached the threshold
    pub is_novel: bool,
    /// Divergence from the structurally nearest prior, in `[0, 1]`
    pub structural_divergence: f64,
}

impl NoveltyScore {
    /// Score for a reflection with no priors.
    pub fn first() -> Self {
        Self {
            score: 1.0,
            is_novel: true,
            structural_divergence: 1.0,
        }
    }

    /// Whether the reflection may reinforce accumulated meaning.
    pub fn may_reinforce(&self) -> bool {
        self.is_novel
    }
}

/// Detector comparing a new reflection against prior ones.
#[derive(Debug, Clone)]
pub struct NoveltyDetector {
    threshold: f64,
}

impl NoveltyDetector {
    /// Create a detector with the default threshold.
    pub fn new() -> Self {
        Self::from_config(&NoveltyConfig::default())
    }

    /// Create with custom threshold.
    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Create from configuration.
    pub fn from_config(config: &NoveltyConfig) -> Self {
        Self::with_threshold(config.threshold)
    }

    /// Get detector threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Assess raw text against the live priors.
    ///
    /// `score = 0.6 * min(divergences) + 0.4 * mean(divergences)`. With no
    /// live priors the reflection is always novel with score 1.
    pub fn assess(&self, text: &str, priors: &[ReflectionRecord]) -> NoveltyScore {
        self.assess_filtered(text, priors.iter().filter(|p| p.is_live()))
    }

    /// Assess a stored reflection, ignoring itself if it appears among the
    /// priors.
    pub fn assess_record(
        &self,
        reflection: &ReflectionRecord,
        priors: &[ReflectionRecord],
    ) -> NoveltyScore {
        self.assess_filtered(
            &reflection.plaintext,
            priors
                .iter()
                .filter(|p| p.is_live() && p.id != reflection.id),
        )
    }

    fn assess_filtered<'a>(
        &self,
        text: &str,
        priors: impl Iterator<Item = &'a ReflectionRecord>,
    ) -> NoveltyScore {
        let incoming = StructuralFeatures::extract(text);
        let divergences: Vec<f64> = priors
            .map(|p| divergence(&incoming, &StructuralFeatures::extract(&p.plaintext)))
            .collect();

        if divergences.is_empty() {
            debug!("No prior reflections; first reflection is novel");
            return NoveltyScore::first();
        }

        let nearest = divergences.iter().copied().fold(f64::INFINITY, f64::min);
        let mean = divergences.iter().sum::<f64>() / divergences.len() as f64;
        let score = (NEAREST_WEIGHT * nearest + MEAN_WEIGHT * mean).clamp(0.0, 1.0);
        let is_novel = score >= self.threshold;

        debug!(
            priors = divergences.len(),
            score = score,
            is_novel = is_novel,
            "Assessed reflection novelty"
        );

        NoveltyScore {
            score,
            is_novel,
            structural_divergence: nearest,
        }
    }
}

impl Default for NoveltyDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn prior(id: &str, text: &str) -> ReflectionRecord {
        ReflectionRecord::new(id, Utc.timestamp_opt(1, 0).unwrap(), text)
    }

    #[test]
    fn test_first_reflection_is_novel() {
        let score = NoveltyDetector::new().assess("Anything at all.", &[]);
        assert_eq!(score.score, 1.0);
        assert!(score.is_novel);
        assert!(score.may_reinforce());
    }

    #[test]
    fn test_deleted_priors_do_not_count() {
        let deleted = prior("p", "Anything at all.").deleted(Utc.timestamp_opt(2, 0).unwrap());
        let score = NoveltyDetector::new().assess("Anything at all.", &[deleted]);
        assert_eq!(score, NoveltyScore::first());
    }

    #[test]
    fn test_repetition_is_not_novel() {
        let priors = vec![prior("p", "I trust the process. It works.")];
        let score = NoveltyDetector::new().assess("I trust the process. It works.", &priors);
        assert_eq!(score.score, 0.0);
        assert!(!score.is_novel);
        assert!(!score.may_reinforce());
    }

    #[test]
    fn test_paraphrase_is_not_novel() {
        // Same shape, different words
        let priors = vec![prior("p", "I felt calm today.")];
        let score = NoveltyDetector::new().assess("I felt good today.", &priors);
        assert_eq!(score.score, 0.0);
        assert!(!score.is_novel);
    }

    #[test]
    fn test_structurally_different_text_is_novel() {
        let priors = vec![prior("p", "short")];
        let score = NoveltyDetector::new()
            .assess("A much longer entry. It has several sentences! Does it not?", &priors);
        assert!(score.is_novel, "{score:?}");
        // one prior: nearest and mean coincide
        assert!((score.score - score.structural_divergence).abs() < 1e-12);
    }

    #[test]
    fn test_blend_uses_nearest_and_mean() {
        let priors = vec![prior("same", "short"), prior("far", "Much longer. Really!")];
        let detector = NoveltyDetector::with_threshold(0.0);
        let score = detector.assess("short", &priors);

        let far = divergence(
            &StructuralFeatures::extract("short"),
            &StructuralFeatures::extract("Much longer. Really!"),
        );
        assert_eq!(score.structural_divergence, 0.0);
        assert!((score.score - MEAN_WEIGHT * far / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_assess_record_skips_itself() {
        let own = prior("own", "Same text.");
        let score = NoveltyDetector::new().assess_record(&own, &[own.clone()]);
        assert_eq!(score, NoveltyScore::first());
    }
}
