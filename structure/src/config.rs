//! Configuration for the observation pipeline.
//!
//! Only the three thresholds the host may tune live here. The emergence
//! criteria, divergence weights and blend factors are fixed constants in
//! their own modules.

use serde::{Deserialize, Serialize};

use crate::types::{Result, StructureError};

/// Configuration for one observation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureConfig {
    /// Lineage graph configuration
    #[serde(default)]
    pub lineage: LineageConfig,
    /// Neighborhood configuration
    #[serde(default)]
    pub neighborhood: NeighborhoodConfig,
    /// Novelty configuration
    #[serde(default)]
    pub novelty: NoveltyConfig,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            lineage: LineageConfig::default(),
            neighborhood: NeighborhoodConfig::default(),
            novelty: NoveltyConfig::default(),
        }
    }
}

impl StructureConfig {
    /// Load config from YAML and validate it.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| StructureError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| StructureError::Config(e.to_string()))
    }

    /// Check that every threshold is usable.
    pub fn validate(&self) -> Result<()> {
        unit_interval("lineage.divergence_threshold", self.lineage.divergence_threshold)?;
        unit_interval("novelty.threshold", self.novelty.threshold)?;

        let distance = self.neighborhood.distance_threshold;
        if !distance.is_finite() || distance < 0.0 {
            return Err(StructureError::Config(format!(
                "neighborhood.distance_threshold must be finite and non-negative, got {}",
                distance
            )));
        }

        Ok(())
    }
}

fn unit_interval(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(StructureError::Config(format!(
            "{} must lie in [0, 1], got {}",
            name, value
        )))
    }
}

/// Lineage graph configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineageConfig {
    /// Minimum divergence for two reflections to be linked
    pub divergence_threshold: f64,
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self {
            divergence_threshold: 0.2,
        }
    }
}

/// Neighborhood configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborhoodConfig {
    /// Maximum shortest-path distance for two reflections to be neighbors
    pub distance_threshold: f64,
}

impl Default for NeighborhoodConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 0.5,
        }
    }
}

/// Novelty configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoveltyConfig {
    /// Minimum score for a reflection to count as novel
    pub threshold: f64,
}

impl Default for NoveltyConfig {
    fn default() -> Self {
        Self { threshold: 0.4 }
    }
}
