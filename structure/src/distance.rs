//! All-pairs shortest-path distances over the lineage graph.
//!
//! Runs Dijkstra from every reflection with link divergence as edge weight.
//! Unreachable pairs are at infinite distance. The result is symmetrized by
//! averaging `d(a, b)` and `d(b, a)`; on an undirected graph the two are
//! already equal, so any pre-averaging asymmetry is measured and reported
//! rather than silently absorbed.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};
use tracing::{debug, warn};

use crate::lineage::LineageGraph;

/// Asymmetry above this is reported as a shortest-path defect.
pub const ASYMMETRY_TOLERANCE: f64 = 1e-12;

/// Complete symmetric distance mapping over one session's reflections.
///
/// Only finite distances are stored; a known pair with no stored entry is
/// unreachable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceMatrix {
    /// Reflection ids in chronological order
    ids: Vec<String>,
    /// Finite distances, keyed by id then id
    finite: BTreeMap<String, BTreeMap<String, f64>>,
    /// Largest `|d(a,b) - d(b,a)|` seen before symmetrization
    #[serde(default)]
    max_raw_asymmetry: f64,
}

impl DistanceMatrix {
    /// Compute the matrix for a lineage graph.
    pub fn from_graph(graph: &LineageGraph) -> Self {
        let ids = graph.ids().to_vec();
        let n = ids.len();
        let index: BTreeMap<&str, usize> =
            ids.iter().enumerate().map(|(i, id)| (id.as_str(), i)).collect();

        let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        for link in graph.links() {
            if let (Some(&u), Some(&v)) = (
                index.get(link.from_id.as_str()),
                index.get(link.to_id.as_str()),
            ) {
                adjacency[u].push((v, link.divergence));
                adjacency[v].push((u, link.divergence));
            }
        }

        let raw: Vec<Vec<f64>> = (0..n).map(|source| shortest_paths(&adjacency, source)).collect();

        let mut finite: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        let mut max_raw_asymmetry: f64 = 0.0;

        for a in 0..n {
            let row = finite.entry(ids[a].clone()).or_default();
            for b in 0..n {
                if a == b {
                    row.insert(ids[b].clone(), 0.0);
                    continue;
                }

                let ab = raw[a][b];
                let ba = raw[b][a];
                let asymmetry = if ab.is_finite() && ba.is_finite() {
                    (ab - ba).abs()
                } else if ab.is_finite() != ba.is_finite() {
                    f64::INFINITY
                } else {
                    0.0
                };
                max_raw_asymmetry = max_raw_asymmetry.max(asymmetry);

                let symmetric = (ab + ba) / 2.0;
                if symmetric.is_finite() {
                    row.insert(ids[b].clone(), symmetric.max(0.0));
                }
            }
        }

        if max_raw_asymmetry > ASYMMETRY_TOLERANCE {
            warn!(
                max_raw_asymmetry = max_raw_asymmetry,
                "Shortest-path distances were asymmetric before symmetrization"
            );
        }

        debug!(
            nodes = n,
            finite_pairs = finite.values().map(BTreeMap::len).sum::<usize>(),
            "Computed distance matrix"
        );

        Self {
            ids,
            finite,
            max_raw_asymmetry,
        }
    }

    /// Distance between two reflections.
    ///
    /// `None` if either id is unknown, `Some(f64::INFINITY)` if unreachable.
    pub fn distance(&self, a: &str, b: &str) -> Option<f64> {
        let row = self.finite.get(a)?;
        if !self.finite.contains_key(b) {
            return None;
        }
        Some(row.get(b).copied().unwrap_or(f64::INFINITY))
    }

    /// Finite distances from one reflection to every reachable other one.
    pub fn reachable_from(&self, id: &str) -> impl Iterator<Item = (&str, f64)> + '_ {
        let own = id.to_string();
        self.finite
            .get(id)
            .into_iter()
            .flat_map(|row| row.iter())
            .filter(move |(other, _)| **other != own)
            .map(|(other, d)| (other.as_str(), *d))
    }

    /// Reflection ids in chronological order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Number of reflections covered.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the matrix covers no reflections.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Largest asymmetry observed before averaging.
    ///
    /// Stays within [`ASYMMETRY_TOLERANCE`] for a correct shortest-path run
    /// on an undirected graph; only summation order can differ.
    pub fn max_raw_asymmetry(&self) -> f64 {
        self.max_raw_asymmetry
    }
}

#[derive(Debug)]
struct State {
    cost: f64,
    vertex: usize,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.vertex == other.vertex
    }
}

impl Eq for State {}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap; ties by vertex keep pops deterministic
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

/// Single-source Dijkstra over an index adjacency list.
fn shortest_paths(adjacency: &[Vec<(usize, f64)>], source: usize) -> Vec<f64> {
    let mut distances = vec![f64::INFINITY; adjacency.len()];
    let mut heap = BinaryHeap::new();

    distances[source] = 0.0;
    heap.push(State {
        cost: 0.0,
        vertex: source,
    });

    while let Some(State { cost, vertex }) = heap.pop() {
        if cost > distances[vertex] {
            continue;
        }

        for &(next, weight) in &adjacency[vertex] {
            let next_cost = cost + weight;
            if next_cost < distances[next] {
                distances[next] = next_cost;
                heap.push(State {
                    cost: next_cost,
                    vertex: next,
                });
            }
        }
    }

    distances
}
