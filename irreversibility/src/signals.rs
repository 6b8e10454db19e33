//! Signals consumed by the gate.
//!
//! These are the typed outputs of sibling inference modules (persistence,
//! load, regime, closure, feedback and continuity). The gate only reads
//! them; how they are produced is not its concern.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Structural deviation above which evidence counts as extreme
pub const EXTREME_DEVIATION: f64 = 0.6;

/// How persistently a structure holds across periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Persistence {
    /// Present in this period only
    Transient,
    /// Holding across periods
    Persistent,
    /// Folded into a single fixed reading
    Collapsed,
}

/// Interpretive load carried by the current period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum InterpretiveLoad {
    /// Near silence
    Minimal,
    /// Ordinary activity
    Moderate,
    /// Heavy activity
    Elevated,
}

/// Dynamical regime of the reflection stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// Open-ended variation
    Exploratory,
    /// Shifting between patterns
    Transitional,
    /// Repeating a fixed pattern
    Deterministic,
}

/// Whether meaning has closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Closure {
    Open,
    Closing,
    Closed,
}

/// Which side dominates the observation feedback loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum FeedbackMode {
    /// The observer's readings dominate
    ObserverDominant,
    /// Neither side dominates
    Reciprocal,
    /// The reflector's own writing dominates
    ReflectorDominant,
}

/// Everything the gate reads for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct GateSignals {
    pub persistence: Persistence,
    pub load: InterpretiveLoad,
    pub regime: Regime,
    pub closure: Closure,
    /// Note from the continuity module, if any
    pub continuity_note: Option<String>,
    pub feedback_mode: FeedbackMode,
    /// Magnitude of structural deviation, `>= 0`
    pub structural_deviation: f64,
}

impl GateSignals {
    /// Create signals with no continuity note, reciprocal feedback and no
    /// deviation.
    pub fn new(
        persistence: Persistence,
        load: InterpretiveLoad,
        regime: Regime,
        closure: Closure,
    ) -> Self {
        Self {
            persistence,
            load,
            regime,
            closure,
            continuity_note: None,
            feedback_mode: FeedbackMode::Reciprocal,
            structural_deviation: 0.0,
        }
    }

    /// Builder: set continuity note.
    pub fn with_continuity_note(mut self, note: impl Into<String>) -> Self {
        self.continuity_note = Some(note.into());
        self
    }

    /// Builder: set feedback mode.
    pub fn with_feedback_mode(mut self, mode: FeedbackMode) -> Self {
        self.feedback_mode = mode;
        self
    }

    /// Builder: set structural deviation magnitude.
    pub fn with_structural_deviation(mut self, magnitude: f64) -> Self {
        self.structural_deviation = magnitude;
        self
    }

    /// Whether all five extreme-evidence conditions hold.
    pub fn is_extreme_evidence(&self) -> bool {
        self.persistence == Persistence::Persistent
            && self.structural_deviation > EXTREME_DEVIATION
            && self.continuity_note.is_some()
            && self.feedback_mode == FeedbackMode::ObserverDominant
            && self.load != InterpretiveLoad::Minimal
    }

    /// Summary kept in history once the period is evaluated.
    pub fn record(&self) -> PeriodRecord {
        PeriodRecord {
            persistence: self.persistence,
            load: self.load,
            regime: self.regime,
            closure: self.closure,
        }
    }
}

/// What history keeps of a past period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct PeriodRecord {
    pub persistence: Persistence,
    pub load: InterpretiveLoad,
    pub regime: Regime,
    pub closure: Closure,
}

impl PeriodRecord {
    /// Whether the period collapsed or closed.
    pub fn shows_collapse_or_closure(&self) -> bool {
        self.persistence == Persistence::Collapsed || self.closure == Closure::Closed
    }
}
