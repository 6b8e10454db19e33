//! Core types shared by every stage of the observation pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single journal entry as handed over by the storage/sync layer.
///
/// The pipeline never mutates a record. Records with `deleted_at` set are
/// soft-deleted and are excluded from every stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionRecord {
    /// Opaque unique identifier
    pub id: String,
    /// When the reflection was written
    pub created_at: DateTime<Utc>,
    /// Decrypted reflection text
    pub plaintext: String,
    /// Soft-deletion timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ReflectionRecord {
    /// Create a live (not deleted) reflection.
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>, plaintext: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at,
            plaintext: plaintext.into(),
            deleted_at: None,
        }
    }

    /// Mark the reflection as soft-deleted.
    pub fn deleted(mut self, at: DateTime<Utc>) -> Self {
        self.deleted_at = Some(at);
        self
    }

    /// Whether the reflection takes part in observation.
    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Identity of one observation session.
///
/// The timestamp is captured once at the boundary so that every structure
/// derived in the session carries the same `created_at`, and re-running the
/// pipeline with the same context reproduces identical output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    /// Session identifier provided by the session layer
    pub session_id: String,
    /// Session start time
    pub started_at: DateTime<Utc>,
}

impl SessionContext {
    /// Create a context from an existing session identifier.
    pub fn new(session_id: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.into(),
            started_at,
        }
    }

    /// Create a context with a fresh random session id, starting now.
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), Utc::now())
    }
}

pub use presence::ReconstructionError;

/// Error types for the structure crate.
///
/// The pure stages never fail; these errors only arise at the
/// configuration and storage boundaries.
#[derive(Debug, thiserror::Error)]
pub enum StructureError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reconstruction error
    #[error("Reconstruction error: {0}")]
    Reconstruction(#[from] ReconstructionError),

    /// Storage collaborator error
    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, StructureError>;

/// Keep only live reflections, ordered chronologically.
///
/// Ties on `created_at` are broken by id so the order is total.
pub fn live_chronological(reflections: &[ReflectionRecord]) -> Vec<&ReflectionRecord> {
    let mut live: Vec<&ReflectionRecord> = reflections.iter().filter(|r| r.is_live()).collect();
    live.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    live
}
