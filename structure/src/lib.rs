//! Structural Observation of Reflections
//!
//! A layered, deterministic pipeline that measures relationships among a
//! user's reflections using only structural (non-semantic) text features:
//!
//! - **Features and divergence**: fixed feature vector, weighted distance
//! - **Lineage**: weighted undirected graph of sufficiently divergent pairs
//! - **Metric space**: all-pairs shortest paths and neighborhoods
//! - **Fields**: density, gradient and curvature per reflection
//! - **Emergence**: one binary classification for the whole set
//! - **Novelty**: whether an incoming reflection may reinforce meaning
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ObservationPipeline                      │
//! │                                                             │
//! │  ┌─────────┐  ┌──────────┐  ┌──────────────┐  ┌─────────┐  │
//! │  │ Lineage │──│ Distance │──│ Neighborhood │──│ Fields  │  │
//! │  └─────────┘  └──────────┘  └──────────────┘  └────┬────┘  │
//! │                                                     │       │
//! │                                            ┌────────▼─────┐ │
//! │                                            │  Emergence   │ │
//! │                                            └────────┬─────┘ │
//! └─────────────────────────────────────────────────────┼───────┘
//!                                                       ▼
//!                                               PresenceMarker ──► witness
//! ```
//!
//! Every stage is a pure function of its inputs. Later stages never feed
//! back into earlier ones, and the witness crate that reads the presence
//! marker is not a dependency of anything here.

pub mod config;
pub mod distance;
pub mod divergence;
pub mod emergence;
pub mod features;
pub mod field;
pub mod lineage;
pub mod neighborhood;
pub mod novelty;
pub mod pipeline;
pub mod store;
pub mod types;

// Re-export main types
pub use config::StructureConfig;
pub use distance::DistanceMatrix;
pub use divergence::divergence;
pub use emergence::{BoundaryStatistics, EmergenceBoundaryDetector, EmergenceBoundaryState};
pub use features::StructuralFeatures;
pub use field::{CurvatureIndex, DensityGradient, DensityMap};
pub use lineage::{LineageGraph, LineageLink};
pub use neighborhood::NeighborhoodIndex;
pub use novelty::{NoveltyDetector, NoveltyScore};
pub use pipeline::{ObservationPipeline, SessionObservation};
pub use presence::PresenceMarker;
pub use store::{MemoryStructureStore, SealedStructure, StructureKey, StructureKind, StructureStore};
pub use types::*;
