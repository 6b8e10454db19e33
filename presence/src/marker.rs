//! The marker type itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ReconstructionError;

/// Opaque marker recording whether the session crossed the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceMarker {
    is_present: bool,
    session_id: String,
    created_at: DateTime<Utc>,
}

impl PresenceMarker {
    /// Record a boundary result as is.
    pub fn new(
        is_present: bool,
        session_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            is_present,
            session_id: session_id.into(),
            created_at,
        }
    }

    /// Rebuild a marker from a decrypted payload.
    ///
    /// Every field is required; a missing node is a fatal reconstruction
    /// error, never filled in with a fallback.
    pub fn from_payload(payload: &serde_json::Value) -> Result<Self, ReconstructionError> {
        for field in ["isPresent", "sessionId", "createdAt"] {
            if payload.get(field).map_or(true, serde_json::Value::is_null) {
                return Err(ReconstructionError::MissingNode {
                    kind: "presence_marker".to_string(),
                    field: field.to_string(),
                });
            }
        }

        serde_json::from_value(payload.clone())
            .map_err(|e| ReconstructionError::Malformed(e.to_string()))
    }

    /// Whether the emergence boundary was crossed.
    pub fn is_present(&self) -> bool {
        self.is_present
    }

    /// Session the marker belongs to.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// When the underlying classification was made.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_marker_keeps_every_field() {
        for present in [true, false] {
            let marker = PresenceMarker::new(present, "session-1", at());
            assert_eq!(marker.is_present(), present);
            assert_eq!(marker.session_id(), "session-1");
            assert_eq!(marker.created_at(), at());
        }
    }

    #[test]
    fn test_payload_roundtrip_preserves_metadata() {
        let marker = PresenceMarker::new(true, "session-1", at());
        let payload = serde_json::to_value(&marker).unwrap();
        assert_eq!(PresenceMarker::from_payload(&payload).unwrap(), marker);
    }

    #[test]
    fn test_missing_node_is_fatal() {
        let payload = serde_json::json!({ "isPresent": true, "sessionId": "s" });
        let err = PresenceMarker::from_payload(&payload).unwrap_err();
        assert_eq!(
            err,
            ReconstructionError::MissingNode {
                kind: "presence_marker".to_string(),
                field: "createdAt".to_string(),
            }
        );

        let payload = serde_json::json!({ "isPresent": null, "sessionId": "s", "createdAt": "2024-01-01T00:00:00Z" });
        assert!(matches!(
            PresenceMarker::from_payload(&payload),
            Err(ReconstructionError::MissingNode { .. })
        ));
    }

    #[test]
    fn test_malformed_payload() {
        let payload = serde_json::json!({ "isPresent": "yes", "sessionId": "s", "createdAt": "2024-01-01T00:00:00Z" });
        assert!(matches!(
            PresenceMarker::from_payload(&payload),
            Err(ReconstructionError::Malformed(_))
        ));
    }
}
