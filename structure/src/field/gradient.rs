//! Gradient: unsigned local variation of density.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{mean_of, DensityMap};
use crate::neighborhood::NeighborhoodIndex;

/// Unsigned local variation of density.
///
/// `gradient(id)` is the mean of `|density(id) - density(n)|` over the
/// neighbors `n` of `id`, zero without neighbors. There is no direction:
/// nothing here says a region is "growing" or "thinning".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityGradient {
    magnitudes: BTreeMap<String, f64>,
}

impl DensityGradient {
    /// Compute the gradient field.
    pub fn compute(index: &NeighborhoodIndex, density: &DensityMap) -> Self {
        let magnitudes = index
            .iter()
            .map(|(id, neighbors)| {
                let own = density.density(id).unwrap_or(0) as f64;
                let magnitude = if neighbors.is_empty() {
                    0.0
                } else {
                    let total: f64 = neighbors
                        .iter()
                        .map(|n| (own - density.density(n).unwrap_or(0) as f64).abs())
                        .sum();
                    total / neighbors.len() as f64
                };
                (id.to_string(), magnitude)
            })
            .collect();

        Self { magnitudes }
    }

    /// Gradient magnitude of a reflection.
    pub fn magnitude(&self, id: &str) -> Option<f64> {
        self.magnitudes.get(id).copied()
    }

    /// Mean magnitude over all reflections, zero when empty.
    pub fn mean(&self) -> f64 {
        mean_of(&self.magnitudes)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.magnitudes.iter().map(|(id, m)| (id.as_str(), *m))
    }

    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMatrix;
    use crate::lineage::{LineageGraph, LineageLink};

    fn star() -> NeighborhoodIndex {
        // hub linked to three leaves, leaves mutually more than 0.5 apart
        let link = |to: &str| LineageLink {
            from_id: "hub".into(),
            to_id: to.into(),
            divergence: 0.3,
        };
        let graph = LineageGraph::from_parts(
            vec!["hub".into(), "x".into(), "y".into(), "z".into()],
            vec![link("x"), link("y"), link("z")],
        );
        NeighborhoodIndex::build(&DistanceMatrix::from_graph(&graph), 0.5)
    }

    #[test]
    fn test_star_gradient() {
        let index = star();
        let density = DensityMap::from_neighborhoods(&index);
        let gradient = DensityGradient::compute(&index, &density);

        // hub density 3, leaves density 1
        assert_eq!(gradient.magnitude("hub"), Some(2.0));
        assert_eq!(gradient.magnitude("x"), Some(2.0));
        assert_eq!(gradient.mean(), 2.0);
    }

    #[test]
    fn test_no_neighbors_means_zero_gradient() {
        let graph = LineageGraph::from_parts(vec!["solo".into()], vec![]);
        let index = NeighborhoodIndex::build(&DistanceMatrix::from_graph(&graph), 0.5);
        let density = DensityMap::from_neighborhoods(&index);
        let gradient = DensityGradient::compute(&index, &density);
        assert_eq!(gradient.magnitude("solo"), Some(0.0));
    }
}
