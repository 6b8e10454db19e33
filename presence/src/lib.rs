//! Presence Marker
//!
//! The only value that leaves the emergence detector for the outside. It
//! lives in its own crate so that the witness can depend on the marker's
//! type and on nothing else of the observation pipeline.

pub mod error;
pub mod marker;

pub use error::ReconstructionError;
pub use marker::PresenceMarker;
