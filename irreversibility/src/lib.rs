//! Interpretive Irreversibility Gate
//!
//! A three-state machine, `open < hardened < locked`, that decides how much
//! interpretation the presentation layer may offer. It reads typed signals
//! from sibling inference modules plus its own history of past periods:
//!
//! - [`transition`]: the pure rules, one period at a time
//! - [`gate`]: session floor, history and the exported state
//! - [`policy`]: what presentation may render under a decision
//!
//! Within a session the state never regresses. Only a new session's
//! initial-condition check can bring the floor back down to `open`.

pub mod gate;
pub mod policy;
pub mod signals;
pub mod transition;

pub use gate::{GateError, InterpretiveGate, IrreversibilityState};
pub use policy::PresentationPolicy;
pub use signals::{
    Closure, FeedbackMode, GateSignals, InterpretiveLoad, PeriodRecord, Persistence, Regime,
    EXTREME_DEVIATION,
};
pub use transition::{GateDecision, GateState};
