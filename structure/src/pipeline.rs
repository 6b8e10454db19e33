//! Session pipeline.
//!
//! Runs the stages strictly in order, each consuming only the previous
//! stages' output:
//!
//! ```text
//! reflections ─► lineage ─► distance ─► neighborhood ─► density ─► gradient
//!                               │             │                       │
//!                               └─────────────┴──────► curvature ◄────┘
//!                                                          │
//!                      density, gradient, neighborhood ─► emergence ─► marker
//! ```
//!
//! Nothing downstream writes back upstream, and the observation only leaves
//! this module as a presence marker or as sealed envelopes for storage.

use presence::PresenceMarker;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::config::StructureConfig;
use crate::distance::DistanceMatrix;
use crate::emergence::{EmergenceBoundaryDetector, EmergenceBoundaryState};
use crate::field::{CurvatureIndex, DensityGradient, DensityMap};
use crate::lineage::LineageGraph;
use crate::neighborhood::NeighborhoodIndex;
use crate::novelty::{NoveltyDetector, NoveltyScore};
use crate::store::{SealedStructure, StructureKind};
use crate::types::{ReflectionRecord, Result, SessionContext};

/// Stateless driver for one session's observation.
#[derive(Debug, Clone, Default)]
pub struct ObservationPipeline {
    config: StructureConfig,
}

impl ObservationPipeline {
    /// Create a pipeline with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with validated configuration.
    pub fn with_config(config: StructureConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use.
    pub fn config(&self) -> &StructureConfig {
        &self.config
    }

    /// Observe a reflection snapshot.
    ///
    /// Pure and deterministic: the same snapshot and context always yield
    /// the same observation.
    pub fn observe(
        &self,
        reflections: &[ReflectionRecord],
        session: &SessionContext,
    ) -> SessionObservation {
        let lineage = LineageGraph::build(reflections, self.config.lineage.divergence_threshold);
        let distances = DistanceMatrix::from_graph(&lineage);
        let neighborhoods =
            NeighborhoodIndex::build(&distances, self.config.neighborhood.distance_threshold);
        let density = DensityMap::from_neighborhoods(&neighborhoods);
        let gradient = DensityGradient::compute(&neighborhoods, &density);
        let curvature = CurvatureIndex::compute(&distances, &neighborhoods, &gradient);
        let boundary = EmergenceBoundaryDetector::detect(
            &density,
            &gradient,
            &curvature,
            &neighborhoods,
            session,
        );
        let marker = boundary.presence_marker();

        info!(
            session = %session.session_id,
            reflections = lineage.node_count(),
            links = lineage.link_count(),
            "Observed reflection structure"
        );

        SessionObservation {
            session: session.clone(),
            lineage,
            distances,
            neighborhoods,
            density,
            gradient,
            curvature,
            boundary,
            marker,
        }
    }

    /// Assess whether an incoming reflection may reinforce meaning.
    pub fn assess_novelty(&self, text: &str, priors: &[ReflectionRecord]) -> NoveltyScore {
        NoveltyDetector::from_config(&self.config.novelty).assess(text, priors)
    }
}

/// Everything derived for one session.
///
/// Intermediate structures stay inside; callers get the presence marker,
/// sealed envelopes for storage, and a fingerprint.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionObservation {
    session: SessionContext,
    lineage: LineageGraph,
    distances: DistanceMatrix,
    neighborhoods: NeighborhoodIndex,
    density: DensityMap,
    gradient: DensityGradient,
    curvature: CurvatureIndex,
    boundary: EmergenceBoundaryState,
    marker: PresenceMarker,
}

impl SessionObservation {
    /// The presence marker, the only value the witness may read.
    pub fn presence_marker(&self) -> &PresenceMarker {
        &self.marker
    }

    /// Session the observation was made in.
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Number of live reflections observed.
    pub fn reflection_count(&self) -> usize {
        self.lineage.node_count()
    }

    /// Seal every derived structure for storage under a wallet.
    pub fn seal(&self, wallet_address: &str) -> Result<Vec<SealedStructure>> {
        let s = &self.session;
        Ok(vec![
            SealedStructure::seal(wallet_address, s, StructureKind::LineageGraph, &self.lineage)?,
            SealedStructure::seal(wallet_address, s, StructureKind::DistanceMatrix, &self.distances)?,
            SealedStructure::seal(
                wallet_address,
                s,
                StructureKind::NeighborhoodIndex,
                &self.neighborhoods,
            )?,
            SealedStructure::seal(wallet_address, s, StructureKind::DensityMap, &self.density)?,
            SealedStructure::seal(wallet_address, s, StructureKind::DensityGradient, &self.gradient)?,
            SealedStructure::seal(wallet_address, s, StructureKind::CurvatureIndex, &self.curvature)?,
            SealedStructure::seal(
                wallet_address,
                s,
                StructureKind::EmergenceBoundary,
                &self.boundary,
            )?,
            SealedStructure::seal(wallet_address, s, StructureKind::PresenceMarker, &self.marker)?,
        ])
    }

    /// SHA-256 over every derived structure, hex encoded.
    ///
    /// Equal fingerprints mean bit-identical observations.
    pub fn fingerprint(&self) -> Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(&self.session)?);
        hasher.update(serde_json::to_vec(&self.lineage)?);
        hasher.update(serde_json::to_vec(&self.distances)?);
        hasher.update(serde_json::to_vec(&self.neighborhoods)?);
        hasher.update(serde_json::to_vec(&self.density)?);
        hasher.update(serde_json::to_vec(&self.gradient)?);
        hasher.update(serde_json::to_vec(&self.curvature)?);
        hasher.update(serde_json::to_vec(&self.boundary)?);
        hasher.update(serde_json::to_vec(&self.marker)?);
        Ok(hex::encode(hasher.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn session() -> SessionContext {
        SessionContext::new("session-1", Utc.timestamp_opt(1_700_000_000, 0).unwrap())
    }

    fn reflections() -> Vec<ReflectionRecord> {
        let t = |s| Utc.timestamp_opt(s, 0).unwrap();
        vec![
            ReflectionRecord::new("r1", t(1), "short"),
            ReflectionRecord::new("r2", t(2), "A much longer entry. It has several sentences!"),
            ReflectionRecord::new("r3", t(3), "WHY? WHY NOT."),
            ReflectionRecord::new("r4", t(4), "quiet, slow, careful; listening"),
        ]
    }

    #[test]
    fn test_empty_snapshot() {
        let observation = ObservationPipeline::new().observe(&[], &session());
        assert_eq!(observation.reflection_count(), 0);
        assert!(!observation.presence_marker().is_present());
        assert_eq!(observation.presence_marker().session_id(), "session-1");
    }

    #[test]
    fn test_observation_is_deterministic() {
        let pipeline = ObservationPipeline::new();
        let a = pipeline.observe(&reflections(), &session());
        let b = pipeline.observe(&reflections(), &session());
        assert_eq!(a, b);
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn test_seal_covers_every_structure() {
        let observation = ObservationPipeline::new().observe(&reflections(), &session());
        let sealed = observation.seal("0xabc").unwrap();
        assert_eq!(sealed.len(), 8);
        assert!(sealed.iter().all(|s| s.session_id == "session-1"));
        assert!(sealed.iter().all(|s| s.created_at == session().started_at));

        let marker = sealed
            .iter()
            .find(|s| s.kind == StructureKind::PresenceMarker)
            .unwrap()
            .open_presence_marker()
            .unwrap();
        assert_eq!(&marker, observation.presence_marker());
    }

    #[test]
    fn test_with_config_validates() {
        let mut config = StructureConfig::default();
        config.novelty.threshold = 2.0;
        assert!(ObservationPipeline::with_config(config).is_err());
    }

    #[test]
    fn test_assess_novelty_uses_configured_threshold() {
        let mut config = StructureConfig::default();
        config.novelty.threshold = 0.0;
        let pipeline = ObservationPipeline::with_config(config).unwrap();
        let score = pipeline.assess_novelty("short", &reflections());
        assert!(score.is_novel);
    }
}
