//! Density: neighborhood size per reflection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::neighborhood::NeighborhoodIndex;

/// Neighborhood size per reflection.
///
/// Raw counts only; never normalized, ranked or labeled.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityMap {
    densities: BTreeMap<String, usize>,
}

impl DensityMap {
    /// `density(id) = |neighbors(id)|`.
    pub fn from_neighborhoods(index: &NeighborhoodIndex) -> Self {
        Self {
            densities: index
                .iter()
                .map(|(id, neighbors)| (id.to_string(), neighbors.len()))
                .collect(),
        }
    }

    /// Density of a reflection.
    pub fn density(&self, id: &str) -> Option<usize> {
        self.densities.get(id).copied()
    }

    /// Mean density over all reflections, zero when empty.
    pub fn mean(&self) -> f64 {
        if self.densities.is_empty() {
            0.0
        } else {
            self.densities.values().sum::<usize>() as f64 / self.densities.len() as f64
        }
    }

    /// Iterate `(id, density)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.densities.iter().map(|(id, d)| (id.as_str(), *d))
    }

    pub fn len(&self) -> usize {
        self.densities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.densities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMatrix;
    use crate::lineage::{LineageGraph, LineageLink};

    #[test]
    fn test_density_is_neighbor_count() {
        let graph = LineageGraph::from_parts(
            vec!["a".into(), "b".into(), "c".into()],
            vec![LineageLink {
                from_id: "a".into(),
                to_id: "b".into(),
                divergence: 0.3,
            }],
        );
        let index = NeighborhoodIndex::build(&DistanceMatrix::from_graph(&graph), 0.5);
        let density = DensityMap::from_neighborhoods(&index);

        assert_eq!(density.density("a"), Some(1));
        assert_eq!(density.density("b"), Some(1));
        assert_eq!(density.density("c"), Some(0));
        assert!((density.mean() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_density() {
        let density = DensityMap::from_neighborhoods(&NeighborhoodIndex::default());
        assert!(density.is_empty());
        assert_eq!(density.mean(), 0.0);
    }
}
