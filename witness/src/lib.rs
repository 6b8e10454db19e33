//! Witness Channel
//!
//! Reads the presence marker and nothing else. What it produces is a
//! [`WitnessSnapshot`] that:
//!
//! - carries no session id, wallet or timestamp
//! - cannot be cloned or serialized, so it cannot be stored
//! - is consumed by its single read
//!
//! Its only workspace dependency is the marker crate, so it cannot reach the
//! detector or any intermediate structure. No crate in the workspace
//! depends on this one, so no pipeline stage or presentation code can take
//! a snapshot as input.

use presence::PresenceMarker;
use tracing::debug;

/// Ephemeral record that a marker was witnessed.
#[derive(Debug)]
#[must_use = "a snapshot exists only to be read once"]
pub struct WitnessSnapshot {
    witnessed: bool,
}

impl WitnessSnapshot {
    /// Read the snapshot, consuming it.
    pub fn read(self) -> bool {
        self.witnessed
    }
}

/// One-way reader of presence markers.
#[derive(Debug, Default)]
pub struct WitnessChannel {
    _private: (),
}

impl WitnessChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Witness a marker.
    pub fn observe(&self, marker: &PresenceMarker) -> WitnessSnapshot {
        // no session id in the log either
        debug!(present = marker.is_present(), "Presence marker witnessed");
        WitnessSnapshot {
            witnessed: marker.is_present(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn marker(is_present: bool) -> PresenceMarker {
        PresenceMarker::new(
            is_present,
            "session-1",
            Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        )
    }

    #[test]
    fn test_snapshot_mirrors_marker() {
        let channel = WitnessChannel::new();
        assert!(channel.observe(&marker(true)).read());
        assert!(!channel.observe(&marker(false)).read());
    }

    #[test]
    fn test_observing_leaves_marker_untouched() {
        let m = marker(true);
        let before = m.clone();
        let _ = WitnessChannel::new().observe(&m).read();
        assert_eq!(m, before);
    }

    #[test]
    fn test_snapshot_debug_has_no_session() {
        let snapshot = WitnessChannel::new().observe(&marker(true));
        let rendered = format!("{snapshot:?}");
        assert!(!rendered.contains("session-1"));
        assert!(snapshot.read());
    }
}
