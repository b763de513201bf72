//! Encoding the application snapshot into a storage slot and back.
//!
//! The slot holds a versioned envelope:
//! `{ "state": { "user": ..., "issues": [...], "notifications": [...] }, "version": 0 }`.

use serde::{Deserialize, Serialize};

use crate::action::AppState;
use crate::error::PersistError;
use crate::storage::KeyValueStorage;

/// Envelope version written by this crate. Envelopes with any other
/// version are ignored on load.
pub const STATE_VERSION: u32 = 0;

/// A persisted snapshot together with its format version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub state: AppState,
    pub version: u32,
}

impl PersistedState {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            version: STATE_VERSION,
        }
    }
}

/// Serialize `state` and write it under `key`.
///
/// # Arguments
///
/// * `storage` - Backend holding the slot.
/// * `key` - Slot name, normally `civicfix-storage`.
/// * `state` - Snapshot to wrap in a version-0 envelope.
///
/// # Errors
///
/// Returns [`PersistError`] if encoding or the backend write fails.
pub fn save_state(
    storage: &dyn KeyValueStorage,
    key: &str,
    state: &AppState,
) -> Result<(), PersistError> {
    let envelope = PersistedStateRef {
        state,
        version: STATE_VERSION,
    };
    let json = serde_json::to_string(&envelope)?;
    storage.set(key, &json)?;
    Ok(())
}

/// Read the snapshot stored under `key`.
///
/// Returns `None` when nothing is stored, and also when the slot cannot be
/// read, holds invalid JSON, or carries an unknown version. Those failures
/// are logged via `tracing::warn!` and treated as a cache miss, so a broken
/// slot degrades to the seed state instead of failing startup.
///
/// # Returns
///
/// The stored state, or `None` on any kind of miss.
pub fn load_state(storage: &dyn KeyValueStorage, key: &str) -> Option<AppState> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read persisted state; starting from seed");
            return None;
        }
    };

    match serde_json::from_str::<PersistedState>(&raw) {
        Ok(envelope) if envelope.version == STATE_VERSION => Some(envelope.state),
        Ok(envelope) => {
            tracing::warn!(
                key,
                version = envelope.version,
                expected = STATE_VERSION,
                "persisted state has unknown version; ignoring"
            );
            None
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to deserialize persisted state; ignoring");
            None
        }
    }
}

/// Borrowing twin of [`PersistedState`] so saving does not clone the state.
#[derive(Serialize)]
struct PersistedStateRef<'a> {
    state: &'a AppState,
    version: u32,
}
