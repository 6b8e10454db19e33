//! Pure transition rules.
//!
//! Rules are checked most severe first; the first that matches decides the
//! state. Nothing here knows about sessions: the floor that keeps a session
//! from regressing lives in [`crate::gate`].

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::signals::{Closure, GateSignals, InterpretiveLoad, Persistence, PeriodRecord, Regime};

/// Gate state, ordered by severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    #[default]
    Open,
    Hardened,
    Locked,
}

impl GateState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Hardened => "hardened",
            Self::Locked => "locked",
        }
    }
}

impl std::fmt::Display for GateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state together with its interpretation permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct GateDecision {
    pub state: GateState,
    /// Whether interpretation may proceed under this state
    pub allow_interpretation: bool,
}

impl GateDecision {
    /// Attach the permission for `state` given the current signals.
    ///
    /// `Open` always permits interpretation and `Locked` never does.
    /// `Hardened` permits it only under extreme evidence.
    pub fn for_state(state: GateState, signals: &GateSignals) -> Self {
        let allow_interpretation = match state {
            GateState::Open => true,
            GateState::Hardened => signals.is_extreme_evidence(),
            GateState::Locked => false,
        };
        Self {
            state,
            allow_interpretation,
        }
    }
}

/// Count history periods that collapsed or closed.
pub fn prior_collapses(history: &[PeriodRecord]) -> usize {
    history
        .iter()
        .filter(|p| p.shows_collapse_or_closure())
        .count()
}

/// State a fresh session starts from.
pub fn initial_state(signals: &GateSignals) -> GateState {
    if signals.closure == Closure::Closed || signals.persistence == Persistence::Collapsed {
        GateState::Hardened
    } else {
        GateState::Open
    }
}

/// Evaluate one period against history, ignoring any session floor.
pub fn evaluate(signals: &GateSignals, history: &[PeriodRecord]) -> GateState {
    let priors = prior_collapses(history);
    let collapsed = signals.persistence == Persistence::Collapsed;
    let deterministic = signals.regime == Regime::Deterministic;

    if signals.closure == Closure::Closed
        || (collapsed && priors >= 1)
        || (deterministic && priors >= 1)
        || priors >= 2
    {
        return GateState::Locked;
    }

    // sticky silence
    let silent = signals.load == InterpretiveLoad::Minimal
        && history
            .last()
            .is_some_and(|previous| previous.load == InterpretiveLoad::Minimal);

    // with no lock, `collapsed` and `deterministic` imply priors == 0
    if collapsed || deterministic || priors == 1 || silent {
        return GateState::Hardened;
    }

    GateState::Open
}
