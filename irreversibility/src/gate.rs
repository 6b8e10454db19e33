//! Session-aware gate.
//!
//! Wraps the pure rules with the two pieces of state they need: the
//! history of evaluated periods and the floor below which the current
//! session may not fall.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::signals::{GateSignals, PeriodRecord};
use crate::transition::{self, GateDecision, GateState};

/// Errors from exporting or restoring gate state
#[derive(Error, Debug)]
pub enum GateError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The value presentation reads and storage persists.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct IrreversibilityState {
    pub state: GateState,
    pub allow_interpretation: bool,
    /// Evaluated periods, oldest first
    pub history: Vec<PeriodRecord>,
}

impl IrreversibilityState {
    pub fn to_json(&self) -> Result<String, GateError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, GateError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn decision(&self) -> GateDecision {
        GateDecision {
            state: self.state,
            allow_interpretation: self.allow_interpretation,
        }
    }
}

/// Most periods kept in history
pub const HISTORY_LIMIT: usize = 32;

/// Gate over `{open, hardened, locked}` for one wallet.
#[derive(Debug, Clone, Default)]
pub struct InterpretiveGate {
    /// Bounded by [`HISTORY_LIMIT`]
    history: Vec<PeriodRecord>,
    /// `None` until the first session begins
    floor: Option<GateState>,
    last: Option<GateDecision>,
}

impl InterpretiveGate {
    /// Create a gate with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a stored state.
    ///
    /// History and the floor both carry over, so a state restored in the
    /// middle of a session cannot fall back. Only `is_new_session` or
    /// [`Self::begin_session`] re-runs the initial-condition check.
    pub fn restore(state: IrreversibilityState) -> Self {
        if state.history.is_empty() {
            return Self::new();
        }
        let mut gate = Self {
            history: state.history,
            floor: Some(state.state),
            last: Some(GateDecision {
                state: state.state,
                allow_interpretation: state.allow_interpretation,
            }),
        };
        gate.compact_history();
        gate
    }

    /// Start a session: reset the floor to the initial-condition check.
    pub fn begin_session(&mut self, signals: &GateSignals) -> GateState {
        let floor = transition::initial_state(signals);
        debug!(floor = %floor, periods = self.history.len(), "Gate session started");
        self.floor = Some(floor);
        floor
    }

    /// Evaluate one period.
    ///
    /// Starts a session first when `is_new_session` is set or none has
    /// begun. The emitted state never drops below the session floor, and
    /// the floor rises to whatever is emitted.
    pub fn evaluate(&mut self, signals: &GateSignals, is_new_session: bool) -> GateDecision {
        let floor = match self.floor {
            Some(floor) if !is_new_session => floor,
            _ => self.begin_session(signals),
        };

        let evaluated = transition::evaluate(signals, &self.history);
        let state = evaluated.max(floor);
        let decision = GateDecision::for_state(state, signals);

        if self.last.map(|d| d.state) != Some(state) {
            info!(
                from = ?self.last.map(|d| d.state),
                to = %state,
                "Gate state changed"
            );
        }
        debug!(
            evaluated = %evaluated,
            floor = %floor,
            state = %state,
            allow_interpretation = decision.allow_interpretation,
            "Gate period evaluated"
        );

        self.floor = Some(state);
        self.history.push(signals.record());
        self.compact_history();
        self.last = Some(decision);
        decision
    }

    /// Keep history within [`HISTORY_LIMIT`] without changing any rule's
    /// outcome.
    ///
    /// The rules read the latest period and the collapse/closure count,
    /// which saturates at two. The oldest record is dropped first when it
    /// is neither the latest nor one of the two collapses still needed.
    fn compact_history(&mut self) {
        while self.history.len() > HISTORY_LIMIT {
            let collapses = transition::prior_collapses(&self.history);
            let latest = self.history.len() - 1;
            let removable = self.history[..latest]
                .iter()
                .position(|p| !p.shows_collapse_or_closure() || collapses > 2);
            match removable {
                Some(i) => {
                    self.history.remove(i);
                }
                None => break,
            }
        }
    }

    /// Most recent decision, if any period has been evaluated.
    pub fn last_decision(&self) -> Option<GateDecision> {
        self.last
    }

    pub fn history(&self) -> &[PeriodRecord] {
        &self.history
    }

    /// Export for storage and presentation.
    ///
    /// Before any evaluation this reports `Open` without interpretation
    /// rights.
    pub fn state(&self) -> IrreversibilityState {
        let decision = self.last.unwrap_or(GateDecision {
            state: GateState::Open,
            allow_interpretation: false,
        });
        IrreversibilityState {
            state: decision.state,
            allow_interpretation: decision.allow_interpretation,
            history: self.history.clone(),
        }
    }
}
