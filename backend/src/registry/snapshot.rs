//! Registry Snapshot - Save/Load Override Tables
//!
//! The forced-assignment table and the unusable-bed set are the only durable
//! state the engine keeps. They serialize as plain id lists and are resolved
//! again against the current household on load.
//!
//! # Critical Invariants
//!
//! - **Determinism**: snapshots list entries in id order
//! - **Silent resolution**: entries whose ids no longer resolve are dropped,
//!   never reported as errors
//! - **Purge on load**: one purge pass runs after resolution

use crate::models::{BedId, HouseholdState, PawnId};
use crate::registry::OverrideRegistry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("Registry serialization failed: {0}")]
    SerializationError(String),

    #[error("Registry deserialization failed: {0}")]
    DeserializationError(String),
}

// ============================================================================
// Snapshot Structures
// ============================================================================

/// One forced assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForcedEntry {
    pub pawn: PawnId,
    pub bed: BedId,
}

/// Durable registry state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    #[serde(default)]
    pub forced: Vec<ForcedEntry>,

    #[serde(default)]
    pub unusable: Vec<BedId>,
}

impl RegistrySnapshot {
    pub fn to_json(&self) -> Result<String, RegistryError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| RegistryError::SerializationError(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        serde_json::from_str(json).map_err(|e| RegistryError::DeserializationError(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.forced.len() + self.unusable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forced.is_empty() && self.unusable.is_empty()
    }
}

impl From<&OverrideRegistry> for RegistrySnapshot {
    fn from(registry: &OverrideRegistry) -> Self {
        RegistrySnapshot {
            forced: registry
                .forced_entries()
                .map(|(pawn, bed)| ForcedEntry { pawn, bed })
                .collect(),
            unusable: registry.unusable_beds().collect(),
        }
    }
}

// ============================================================================
// Save / Load
// ============================================================================

impl OverrideRegistry {
    pub fn to_snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot::from(self)
    }

    /// Rebuild a registry from a snapshot
    ///
    /// # Returns
    ///
    /// The registry and the number of snapshot entries that did not survive
    /// (unresolvable ids, duplicates, or stale entries removed by the purge).
    pub fn from_snapshot(snapshot: &RegistrySnapshot, state: &HouseholdState) -> (Self, usize) {
        let forced: Vec<(PawnId, BedId)> = snapshot
            .forced
            .iter()
            .filter(|entry| state.pawn(entry.pawn).is_some() && state.bed(entry.bed).is_some())
            .map(|entry| (entry.pawn, entry.bed))
            .collect();
        let unusable: Vec<BedId> = snapshot
            .unusable
            .iter()
            .copied()
            .filter(|bed| state.bed(*bed).is_some())
            .collect();

        let mut registry = OverrideRegistry::new();
        registry.insert_raw(forced, unusable);
        registry.purge(state);

        let kept = registry.forced_len() + registry.unusable_len();
        let dropped = snapshot.len().saturating_sub(kept);
        if dropped > 0 {
            tracing::debug!(dropped, kept, "dropped unresolvable registry entries on load");
        }
        (registry, dropped)
    }
}
