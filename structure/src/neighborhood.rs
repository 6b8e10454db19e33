//! Neighborhood index over the distance matrix.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::distance::DistanceMatrix;

/// Per-reflection set of neighbors within a distance threshold.
///
/// The distance threshold is independent of the divergence threshold used to
/// build the lineage graph. Every reflection in the matrix has an entry,
/// possibly empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborhoodIndex {
    neighbors: BTreeMap<String, BTreeSet<String>>,
}

impl NeighborhoodIndex {
    /// Build the index: `b` neighbors `a` iff `a != b` and
    /// `distance(a, b)` is finite and `<= distance_threshold`.
    pub fn build(matrix: &DistanceMatrix, distance_threshold: f64) -> Self {
        let neighbors: BTreeMap<String, BTreeSet<String>> = matrix
            .ids()
            .iter()
            .map(|id| {
                let set = matrix
                    .reachable_from(id)
                    .filter(|(_, d)| *d <= distance_threshold)
                    .map(|(other, _)| other.to_string())
                    .collect();
                (id.clone(), set)
            })
            .collect();

        debug!(
            nodes = neighbors.len(),
            threshold = distance_threshold,
            "Built neighborhood index"
        );

        Self { neighbors }
    }

    /// Neighbors of a reflection, `None` for unknown ids.
    pub fn neighbors(&self, id: &str) -> Option<&BTreeSet<String>> {
        self.neighbors.get(id)
    }

    /// Number of neighbors of a reflection, zero for unknown ids.
    pub fn neighbor_count(&self, id: &str) -> usize {
        self.neighbors.get(id).map(BTreeSet::len).unwrap_or(0)
    }

    /// Iterate `(id, neighbors)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.neighbors.iter().map(|(id, set)| (id.as_str(), set))
    }

    /// Number of indexed reflections.
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// Whether nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineage::{LineageGraph, LineageLink};

    fn matrix(ids: &[&str], links: &[(&str, &str, f64)]) -> DistanceMatrix {
        DistanceMatrix::from_graph(&LineageGraph::from_parts(
            ids.iter().map(|s| s.to_string()).collect(),
            links
                .iter()
                .map(|(a, b, d)| LineageLink {
                    from_id: a.to_string(),
                    to_id: b.to_string(),
                    divergence: *d,
                })
                .collect(),
        ))
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let m = matrix(&["a", "b", "c"], &[("a", "b", 0.5), ("b", "c", 0.25)]);
        let index = NeighborhoodIndex::build(&m, 0.5);

        assert!(index.neighbors("a").unwrap().contains("b"));
        // a-c is 0.75 away
        assert!(!index.neighbors("a").unwrap().contains("c"));
        assert_eq!(index.neighbor_count("b"), 2);
    }

    #[test]
    fn test_isolated_reflection_has_empty_entry() {
        let m = matrix(&["a", "b"], &[]);
        let index = NeighborhoodIndex::build(&m, 10.0);
        assert_eq!(index.len(), 2);
        assert!(index.neighbors("a").unwrap().is_empty());
        assert_eq!(index.neighbor_count("unknown"), 0);
    }

    #[test]
    fn test_index_is_symmetric() {
        let m = matrix(
            &["a", "b", "c", "d"],
            &[("a", "b", 0.2), ("b", "c", 0.3), ("c", "d", 0.45), ("a", "d", 0.35)],
        );
        let index = NeighborhoodIndex::build(&m, 0.5);
        for (id, set) in index.iter() {
            assert!(!set.contains(id));
            for other in set {
                assert!(index.neighbors(other).unwrap().contains(id));
            }
        }
    }
}
