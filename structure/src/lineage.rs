//! Lineage graph construction.
//!
//! Links reflections whose structural divergence reaches a threshold. The
//! graph is built once per session from a fixed snapshot and never rewired.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::divergence::divergence;
use crate::features::StructuralFeatures;
use crate::types::{live_chronological, ReflectionRecord};

/// An undirected weighted link between two reflections.
///
/// `from_id` is always the earlier reflection in chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageLink {
    /// Earlier reflection
    pub from_id: String,
    /// Later reflection
    pub to_id: String,
    /// Structural divergence, used as the edge weight
    pub divergence: f64,
}

/// Weighted undirected simple graph over the live reflections of a session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageGraph {
    /// Reflection ids in chronological order
    ids: Vec<String>,
    /// Links, in construction order
    links: Vec<LineageLink>,
}

impl LineageGraph {
    /// Build the lineage graph for a reflection snapshot.
    ///
    /// Soft-deleted reflections are skipped. For every pair `(j, i)` with
    /// `j < i` in chronological order a link is added iff
    /// `divergence >= divergence_threshold`.
    pub fn build(reflections: &[ReflectionRecord], divergence_threshold: f64) -> Self {
        let live = live_chronological(reflections);
        let features: Vec<StructuralFeatures> = live
            .iter()
            .map(|r| StructuralFeatures::extract(&r.plaintext))
            .collect();

        let mut links = Vec::new();
        for i in 0..live.len() {
            for j in 0..i {
                let d = divergence(&features[j], &features[i]);
                if d >= divergence_threshold {
                    links.push(LineageLink {
                        from_id: live[j].id.clone(),
                        to_id: live[i].id.clone(),
                        divergence: d,
                    });
                }
            }
        }

        debug!(
            nodes = live.len(),
            links = links.len(),
            threshold = divergence_threshold,
            "Built lineage graph"
        );

        Self {
            ids: live.iter().map(|r| r.id.clone()).collect(),
            links,
        }
    }

    /// Assemble a graph from explicit parts.
    ///
    /// Keeps the graph simple: self-links, links touching unknown ids,
    /// repeated pairs and non-finite or negative weights are dropped.
    pub fn from_parts(ids: Vec<String>, links: Vec<LineageLink>) -> Self {
        let known: BTreeSet<&str> = ids.iter().map(String::as_str).collect();
        let mut seen: BTreeSet<(String, String)> = BTreeSet::new();

        let links = links
            .into_iter()
            .filter(|link| {
                if link.from_id == link.to_id
                    || !known.contains(link.from_id.as_str())
                    || !known.contains(link.to_id.as_str())
                    || !link.divergence.is_finite()
                    || link.divergence < 0.0
                {
                    return false;
                }
                let key = if link.from_id < link.to_id {
                    (link.from_id.clone(), link.to_id.clone())
                } else {
                    (link.to_id.clone(), link.from_id.clone())
                };
                seen.insert(key)
            })
            .collect();

        Self { ids, links }
    }

    /// Reflection ids in chronological order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// All links.
    pub fn links(&self) -> &[LineageLink] {
        &self.links
    }

    /// Number of reflections.
    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    /// Number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Whether the graph has no reflections.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether `a` and `b` are linked, in either direction.
    pub fn has_link(&self, a: &str, b: &str) -> bool {
        self.links.iter().any(|link| {
            (link.from_id == a && link.to_id == b) || (link.from_id == b && link.to_id == a)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn reflection(id: &str, secs: i64, text: &str) -> ReflectionRecord {
        ReflectionRecord::new(id, Utc.timestamp_opt(secs, 0).unwrap(), text)
    }

    #[test]
    fn test_empty_input_gives_empty_graph() {
        let graph = LineageGraph::build(&[], 0.2);
        assert!(graph.is_empty());
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn test_identical_reflections_are_not_linked() {
        let reflections = vec![
            reflection("a", 1, "Same words, same shape."),
            reflection("b", 2, "Same words, same shape."),
        ];
        let graph = LineageGraph::build(&reflections, 0.2);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn test_links_point_from_earlier_to_later() {
        let reflections = vec![
            reflection("late", 20, "A much longer entry. It has several sentences! Does it not?"),
            reflection("early", 10, "short"),
        ];
        let graph = LineageGraph::build(&reflections, 0.2);
        assert_eq!(graph.ids(), &["early".to_string(), "late".to_string()]);
        assert_eq!(graph.link_count(), 1);
        assert_eq!(graph.links()[0].from_id, "early");
        assert_eq!(graph.links()[0].to_id, "late");
        assert!(graph.has_link("late", "early"));
    }

    #[test]
    fn test_deleted_reflections_are_excluded() {
        let reflections = vec![
            reflection("a", 1, "short"),
            reflection("b", 2, "A much longer entry. It has several sentences!")
                .deleted(Utc.timestamp_opt(3, 0).unwrap()),
        ];
        let graph = LineageGraph::build(&reflections, 0.0);
        assert_eq!(graph.ids(), &["a".to_string()]);
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let a = "short";
        let b = "A much longer entry. It has several sentences! Does it not?";
        let d = divergence(&StructuralFeatures::extract(a), &StructuralFeatures::extract(b));
        assert!(d > 0.0 && d < 1.0);

        let reflections = vec![reflection("a", 1, a), reflection("b", 2, b)];
        let epsilon = 1e-9;

        assert_eq!(LineageGraph::build(&reflections, d).link_count(), 1);
        assert_eq!(LineageGraph::build(&reflections, d - epsilon).link_count(), 1);
        assert_eq!(LineageGraph::build(&reflections, d + epsilon).link_count(), 0);
    }

    #[test]
    fn test_from_parts_keeps_graph_simple() {
        let ids = vec!["a".to_string(), "b".to_string()];
        let link = |from: &str, to: &str, divergence: f64| LineageLink {
            from_id: from.to_string(),
            to_id: to.to_string(),
            divergence,
        };
        let graph = LineageGraph::from_parts(
            ids,
            vec![
                link("a", "b", 0.4),
                link("b", "a", 0.3),
                link("a", "a", 0.5),
                link("a", "zzz", 0.5),
                link("b", "a", f64::NAN),
            ],
        );
        assert_eq!(graph.link_count(), 1);
        assert_eq!(graph.links()[0].divergence, 0.4);
    }

    #[test]
    fn test_build_is_deterministic() {
        let reflections = vec![
            reflection("a", 1, "one"),
            reflection("b", 2, "Two words. Then more!"),
            reflection("c", 3, "THREE, loud; sharp."),
        ];
        assert_eq!(
            LineageGraph::build(&reflections, 0.2),
            LineageGraph::build(&reflections, 0.2)
        );
    }
}
