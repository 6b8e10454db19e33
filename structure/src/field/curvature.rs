//! Curvature: how unevenly a reflection's neighbors sit around it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{mean_of, DensityGradient};
use crate::distance::DistanceMatrix;
use crate::neighborhood::NeighborhoodIndex;

/// Weight of the neighbor-distance coefficient of variation
pub const COEFFICIENT_OF_VARIATION_WEIGHT: f64 = 0.7;
/// Weight of the local density gradient
pub const GRADIENT_WEIGHT: f64 = 0.3;

/// Local non-uniformity of neighbor distances, blended with gradient.
///
/// `curvature(id) = 0.7 * cv(id) + 0.3 * gradient(id)`, where `cv` is
/// `variance / mean^2` of the distances from `id` to its neighbors (population
/// variance). `cv` is zero without neighbors or when the mean distance is
/// zero. The result is clamped to be non-negative.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurvatureIndex {
    values: BTreeMap<String, f64>,
}

impl CurvatureIndex {
    /// Compute the curvature field.
    pub fn compute(
        matrix: &DistanceMatrix,
        index: &NeighborhoodIndex,
        gradient: &DensityGradient,
    ) -> Self {
        let values = index
            .iter()
            .map(|(id, neighbors)| {
                let distances: Vec<f64> = neighbors
                    .iter()
                    .filter_map(|n| matrix.distance(id, n))
                    .filter(|d| d.is_finite())
                    .collect();

                let cv = coefficient_of_variation(&distances);
                let magnitude = gradient.magnitude(id).unwrap_or(0.0);
                let curvature =
                    COEFFICIENT_OF_VARIATION_WEIGHT * cv + GRADIENT_WEIGHT * magnitude;

                (id.to_string(), curvature.max(0.0))
            })
            .collect();

        Self { values }
    }

    /// Curvature of a reflection.
    pub fn value(&self, id: &str) -> Option<f64> {
        self.values.get(id).copied()
    }

    /// Mean curvature over all reflections, zero when empty.
    pub fn mean(&self) -> f64 {
        mean_of(&self.values)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(id, v)| (id.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// `variance / mean^2`, guarded against empty input and zero mean.
///
/// Equal samples are exactly zero; the summed mean of equal values can
/// drift by an ulp and would otherwise leave a tiny positive residue.
fn coefficient_of_variation(samples: &[f64]) -> f64 {
    let Some(&first) = samples.first() else {
        return 0.0;
    };
    if samples.iter().all(|d| d.to_bits() == first.to_bits()) {
        return 0.0;
    }

    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    if mean == 0.0 || !mean.is_finite() {
        return 0.0;
    }

    let variance = samples.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n;
    let cv = variance / (mean * mean);
    if cv.is_finite() {
        cv
    } else {
        0.0
    }
}
