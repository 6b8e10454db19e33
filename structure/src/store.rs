//! Storage boundary for derived structures.
//!
//! The pipeline itself never performs I/O. Derived structures are sealed
//! into envelopes namespaced per `(wallet, session, kind)` and handed to a
//! [`StructureStore`]; encryption and the storage medium belong to the
//! implementor. The envelope carries the session id and creation time so
//! that reconstruction never has to invent them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use presence::PresenceMarker;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::types::{ReconstructionError, Result, SessionContext, StructureError};

/// Kind of a sealed structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    LineageGraph,
    DistanceMatrix,
    NeighborhoodIndex,
    DensityMap,
    DensityGradient,
    CurvatureIndex,
    EmergenceBoundary,
    PresenceMarker,
    NoveltyScore,
    IrreversibilityState,
}

impl StructureKind {
    /// Get string representation for namespacing.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LineageGraph => "lineage_graph",
            Self::DistanceMatrix => "distance_matrix",
            Self::NeighborhoodIndex => "neighborhood_index",
            Self::DensityMap => "density_map",
            Self::DensityGradient => "density_gradient",
            Self::CurvatureIndex => "curvature_index",
            Self::EmergenceBoundary => "emergence_boundary",
            Self::PresenceMarker => "presence_marker",
            Self::NoveltyScore => "novelty_score",
            Self::IrreversibilityState => "irreversibility_state",
        }
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A derived structure ready to be encrypted and stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedStructure {
    /// Wallet the session belongs to
    pub wallet_address: String,
    /// Session the structure was derived in
    pub session_id: String,
    /// Session start time
    pub created_at: DateTime<Utc>,
    /// What the payload contains
    pub kind: StructureKind,
    /// Serialized structure
    pub payload: serde_json::Value,
}

impl SealedStructure {
    /// Seal a structure for a wallet session.
    pub fn seal<T: Serialize>(
        wallet_address: impl Into<String>,
        session: &SessionContext,
        kind: StructureKind,
        value: &T,
    ) -> Result<Self> {
        Ok(Self {
            wallet_address: wallet_address.into(),
            session_id: session.session_id.clone(),
            created_at: session.started_at,
            kind,
            payload: serde_json::to_value(value)?,
        })
    }

    /// Storage key: `{wallet}/{session}/{kind}`.
    pub fn namespace_key(&self) -> String {
        namespace_key(&self.wallet_address, &self.session_id, self.kind)
    }

    /// Structured key of this envelope.
    pub fn key(&self) -> StructureKey {
        StructureKey::new(&self.wallet_address, &self.session_id, self.kind)
    }

    /// Rebuild the typed structure.
    pub fn open<T: DeserializeOwned>(
        &self,
        expected: StructureKind,
    ) -> std::result::Result<T, ReconstructionError> {
        self.expect_kind(expected)?;
        if self.payload.is_null() {
            return Err(ReconstructionError::MissingNode {
                kind: expected.to_string(),
                field: "payload".to_string(),
            });
        }
        serde_json::from_value(self.payload.clone())
            .map_err(|e| ReconstructionError::Malformed(e.to_string()))
    }

    /// Rebuild a presence marker, requiring every node.
    pub fn open_presence_marker(&self) -> std::result::Result<PresenceMarker, ReconstructionError> {
        self.expect_kind(StructureKind::PresenceMarker)?;
        PresenceMarker::from_payload(&self.payload)
    }

    fn expect_kind(&self, expected: StructureKind) -> std::result::Result<(), ReconstructionError> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(ReconstructionError::KindMismatch {
                expected: expected.to_string(),
                found: self.kind.to_string(),
            })
        }
    }
}

/// Build the namespace key for a structure.
///
/// `%` and `/` inside ids are percent-escaped so that distinct
/// `(wallet, session)` pairs never share a key.
pub fn namespace_key(wallet_address: &str, session_id: &str, kind: StructureKind) -> String {
    format!(
        "{}/{}/{}",
        escape_segment(wallet_address),
        escape_segment(session_id),
        kind.as_str()
    )
}

fn escape_segment(segment: &str) -> String {
    segment.replace('%', "%25").replace('/', "%2F")
}

/// Identity of a stored structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructureKey {
    pub wallet_address: String,
    pub session_id: String,
    pub kind: StructureKind,
}

impl StructureKey {
    pub fn new(wallet_address: &str, session_id: &str, kind: StructureKind) -> Self {
        Self {
            wallet_address: wallet_address.to_string(),
            session_id: session_id.to_string(),
            kind,
        }
    }

    /// Whether the key belongs to the given wallet session.
    pub fn is_in_session(&self, wallet_address: &str, session_id: &str) -> bool {
        self.wallet_address == wallet_address && self.session_id == session_id
    }
}

impl fmt::Display for StructureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&namespace_key(
            &self.wallet_address,
            &self.session_id,
            self.kind,
        ))
    }
}

/// Storage collaborator for sealed structures.
///
/// Implementations encrypt at rest and may retry; the pipeline never awaits
/// a store from inside a stage.
#[async_trait]
pub trait StructureStore: Send + Sync {
    /// Store (or replace) a sealed structure.
    async fn put(&self, sealed: SealedStructure) -> Result<()>;

    /// Fetch a sealed structure.
    async fn get(
        &self,
        wallet_address: &str,
        session_id: &str,
        kind: StructureKind,
    ) -> Result<Option<SealedStructure>>;

    /// Drop everything stored for a session, returning how many were removed.
    async fn purge_session(&self, wallet_address: &str, session_id: &str) -> Result<usize>;
}

/// Load the presence marker of a session.
///
/// An absent envelope is a fatal reconstruction error: the marker is
/// structurally required once a session has been observed.
pub async fn load_presence_marker(
    store: &dyn StructureStore,
    wallet_address: &str,
    session_id: &str,
) -> Result<PresenceMarker> {
    let sealed = store
        .get(wallet_address, session_id, StructureKind::PresenceMarker)
        .await?
        .ok_or_else(|| ReconstructionError::MissingNode {
            kind: StructureKind::PresenceMarker.to_string(),
            field: "envelope".to_string(),
        })?;

    Ok(sealed.open_presence_marker()?)
}

/// In-memory store, for tests and offline sessions.
pub struct MemoryStructureStore {
    entries: DashMap<StructureKey, SealedStructure>,
}

impl MemoryStructureStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of stored structures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryStructureStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StructureStore for MemoryStructureStore {
    async fn put(&self, sealed: SealedStructure) -> Result<()> {
        if sealed.wallet_address.is_empty() || sealed.session_id.is_empty() {
            return Err(StructureError::Store(
                "wallet address and session id are required".to_string(),
            ));
        }

        let key = sealed.key();
        debug!(key = %key, "Storing sealed structure");
        self.entries.insert(key, sealed);
        Ok(())
    }

    async fn get(
        &self,
        wallet_address: &str,
        session_id: &str,
        kind: StructureKind,
    ) -> Result<Option<SealedStructure>> {
        let key = StructureKey::new(wallet_address, session_id, kind);
        Ok(self.entries.get(&key).map(|entry| entry.value().clone()))
    }

    async fn purge_session(&self, wallet_address: &str, session_id: &str) -> Result<usize> {
        let before = self.entries.len();
        self.entries
            .retain(|key, _| !key.is_in_session(wallet_address, session_id));
        let removed = before - self.entries.len();

        debug!(
            wallet = %wallet_address,
            session = %session_id,
            removed = removed,
            "Purged session structures"
        );
        Ok(removed)
    }
}
