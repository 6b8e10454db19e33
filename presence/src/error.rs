//! Reconstruction errors for sealed payloads.

/// Error raised when a sealed structure cannot be rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconstructionError {
    /// A required node is absent from the payload
    #[error("Missing node `{field}` in {kind} payload")]
    MissingNode {
        /// Structure kind being rebuilt
        kind: String,
        /// Name of the absent field
        field: String,
    },

    /// Payload was sealed as a different structure
    #[error("Kind mismatch: expected {expected}, found {found}")]
    KindMismatch {
        /// Kind the caller asked for
        expected: String,
        /// Kind recorded in the envelope
        found: String,
    },

    /// Payload is present but not decodable
    #[error("Malformed payload: {0}")]
    Malformed(String),
}
