//! What presentation may do under a gate decision.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::transition::{GateDecision, GateState};

/// Presentation capabilities permitted by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct PresentationPolicy {
    pub narrative: bool,
    pub multiplicity: bool,
    pub spatial_layout: bool,
    pub interpretation: bool,
}

impl PresentationPolicy {
    /// Everything suppressed.
    pub fn silent() -> Self {
        Self {
            narrative: false,
            multiplicity: false,
            spatial_layout: false,
            interpretation: false,
        }
    }

    pub fn from_decision(decision: &GateDecision) -> Self {
        match decision.state {
            GateState::Open => Self {
                narrative: true,
                multiplicity: true,
                spatial_layout: true,
                interpretation: true,
            },
            GateState::Hardened => Self {
                narrative: decision.allow_interpretation,
                multiplicity: true,
                spatial_layout: true,
                interpretation: decision.allow_interpretation,
            },
            GateState::Locked => Self::silent(),
        }
    }
}

impl From<GateDecision> for PresentationPolicy {
    fn from(decision: GateDecision) -> Self {
        Self::from_decision(&decision)
    }
}
