//! Emergence boundary detection.
//!
//! A single binary classification of the whole reflection set. Four fixed
//! criteria must all hold; there is no partial score, no adaptation and no
//! memory of prior sessions.

use chrono::{DateTime, Utc};
use presence::PresenceMarker;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::field::{CurvatureIndex, DensityGradient, DensityMap};
use crate::neighborhood::NeighborhoodIndex;
use crate::types::SessionContext;

/// Minimum share of reflections denser than the mean density
pub const DENSE_SHARE_MIN: f64 = 0.30;
/// Mean gradient magnitude must exceed this
pub const MEAN_GRADIENT_MIN: f64 = 0.3;
/// Mean curvature must exceed this
pub const MEAN_CURVATURE_MIN: f64 = 0.2;
/// Minimum share of well-connected reflections
pub const CONNECTED_SHARE_MIN: f64 = 0.40;
/// Neighbor count at which a reflection counts as well connected
pub const CONNECTED_NEIGHBORS: usize = 3;

/// Session-wide statistics the boundary criteria are evaluated on.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryStatistics {
    /// Reflections considered
    pub reflection_count: usize,
    /// Share of reflections with density strictly above the mean
    pub dense_share: f64,
    /// Mean density-gradient magnitude
    pub mean_gradient: f64,
    /// Mean curvature
    pub mean_curvature: f64,
    /// Share of reflections with at least three neighbors
    pub connected_share: f64,
}

impl BoundaryStatistics {
    /// Gather statistics from the session's fields.
    pub fn gather(
        density: &DensityMap,
        gradient: &DensityGradient,
        curvature: &CurvatureIndex,
        index: &NeighborhoodIndex,
    ) -> Self {
        let reflection_count = density.len();
        if reflection_count == 0 {
            return Self::default();
        }

        let mean_density = density.mean();
        let dense = density.iter().filter(|(_, d)| *d as f64 > mean_density).count();
        let connected = index
            .iter()
            .filter(|(_, neighbors)| neighbors.len() >= CONNECTED_NEIGHBORS)
            .count();
        let connected_share = if index.is_empty() {
            0.0
        } else {
            connected as f64 / index.len() as f64
        };

        Self {
            reflection_count,
            dense_share: dense as f64 / reflection_count as f64,
            mean_gradient: gradient.mean(),
            mean_curvature: curvature.mean(),
            connected_share,
        }
    }

    /// Whether all four criteria hold.
    pub fn is_emergent(&self) -> bool {
        self.reflection_count > 0
            && self.dense_share >= DENSE_SHARE_MIN
            && self.mean_gradient > MEAN_GRADIENT_MIN
            && self.mean_curvature > MEAN_CURVATURE_MIN
            && self.connected_share >= CONNECTED_SHARE_MIN
    }
}

/// Binary emergence classification for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergenceBoundaryState {
    /// Whether the reflection set crossed the emergence boundary
    pub is_emergent: bool,
    /// Session the classification belongs to
    pub session_id: String,
    /// When the classification was made
    pub created_at: DateTime<Utc>,
}

impl EmergenceBoundaryState {
    /// Copy the classification into a presence marker, unchanged.
    pub fn presence_marker(&self) -> PresenceMarker {
        PresenceMarker::new(self.is_emergent, self.session_id.clone(), self.created_at)
    }
}

/// Detector applying the fixed emergence criteria.
pub struct EmergenceBoundaryDetector;

impl EmergenceBoundaryDetector {
    /// Classify the session.
    ///
    /// Empty or missing fields classify as not emergent.
    pub fn detect(
        density: &DensityMap,
        gradient: &DensityGradient,
        curvature: &CurvatureIndex,
        index: &NeighborhoodIndex,
        session: &SessionContext,
    ) -> EmergenceBoundaryState {
        let stats = BoundaryStatistics::gather(density, gradient, curvature, index);
        let is_emergent = stats.is_emergent();

        debug!(
            reflections = stats.reflection_count,
            dense_share = stats.dense_share,
            mean_gradient = stats.mean_gradient,
            mean_curvature = stats.mean_curvature,
            connected_share = stats.connected_share,
            is_emergent = is_emergent,
            "Evaluated emergence boundary"
        );

        EmergenceBoundaryState {
            is_emergent,
            session_id: session.session_id.clone(),
            created_at: session.started_at,
        }
    }
}
