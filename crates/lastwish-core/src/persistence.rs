//! Session persistence
//!
//! The whole session is stored as one JSON blob under a single key. Any
//! backend offering synchronous `get/set/remove` of strings will do:
//! - [`MemoryStore`]: in-process map, for tests and embedding
//! - [`FileStore`]: one `<key>.json` file per key in a directory
//!
//! [`Session`] ties a [`SessionState`] to a store and re-serializes after
//! every successful action. The store is a convenience cache: a failed
//! write is reported, but the in-memory state keeps the update.

use crate::config::LastWishConfig;
use crate::error::{PersistenceError, StateError};
use crate::session::{Action, ReducerConfig, SessionState};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Minimal string key-value storage
pub trait KeyValueStore: Send + Sync {
    /// Read a value
    ///
    /// # Errors
    /// Returns [`PersistenceError`] if the backend fails
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Write a value, replacing any previous one
    ///
    /// # Errors
    /// Returns [`PersistenceError`] if the backend fails
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;

    /// Delete a value; deleting a missing key is not an error
    ///
    /// # Errors
    /// Returns [`PersistenceError`] if the backend fails
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Check if store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.inner.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.inner.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.inner.lock().remove(key);
        Ok(())
    }
}

/// Directory-backed store
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed
    ///
    /// # Errors
    /// Returns [`PersistenceError::Io`] if the directory cannot be created
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Directory holding the blobs
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(PersistenceError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        // Write-then-rename so a crash never leaves a truncated blob.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Error from [`Session::dispatch`]
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Action rejected; state unchanged
    #[error(transparent)]
    Rejected(#[from] StateError),

    /// Action applied in memory but the blob could not be saved
    #[error("state updated but not saved: {0}")]
    NotSaved(#[from] PersistenceError),
}

/// A session state bound to a store
#[derive(Debug)]
pub struct Session<S: KeyValueStore> {
    state: SessionState,
    reducer: ReducerConfig,
    store: S,
    key: String,
}

impl<S: KeyValueStore> Session<S> {
    /// Hydrate from the store
    ///
    /// A missing blob starts an empty session. A blob that cannot be read or
    /// decoded is logged and also yields an empty session.
    pub fn open(store: S, config: &LastWishConfig) -> Self {
        let key = config.storage_key.clone();
        let state = match load_state(&store, &key) {
            Ok(Some(state)) => {
                tracing::info!(
                    key = %key,
                    beneficiaries = state.beneficiaries.len(),
                    assignments = state.assignments.len(),
                    "session hydrated"
                );
                state
            }
            Ok(None) => {
                tracing::debug!(key = %key, "no stored session, starting fresh");
                SessionState::default()
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "stored session unreadable, starting fresh");
                SessionState::default()
            }
        };
        Self {
            state,
            reducer: config.reducer(),
            store,
            key,
        }
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Apply an action and persist the result
    ///
    /// # Errors
    /// - `DispatchError::Rejected` if the reducer refused the action
    /// - `DispatchError::NotSaved` if the write failed (state still updated)
    pub fn dispatch(&mut self, action: Action) -> Result<(), DispatchError> {
        self.state.dispatch(action, &self.reducer)?;
        self.save().map_err(|e| {
            tracing::warn!(key = %self.key, error = %e, "session not persisted");
            DispatchError::NotSaved(e)
        })
    }

    /// Serialize the current state to the store
    ///
    /// # Errors
    /// Returns [`PersistenceError`] if encoding or writing fails
    pub fn save(&self) -> Result<(), PersistenceError> {
        let blob = serde_json::to_string(&self.state)?;
        self.store.set(&self.key, &blob)
    }

    /// Pretty-printed JSON of the current state
    ///
    /// # Errors
    /// Returns [`PersistenceError::Encoding`] if the state cannot be encoded
    pub fn export(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(&self.state)?)
    }

    /// Replace the state with an exported blob and persist it
    ///
    /// A blob that does not decode leaves both the state and the store
    /// untouched. A failed write after a successful decode is reported, but
    /// the imported state is kept.
    ///
    /// # Errors
    /// Returns [`PersistenceError`] if decoding or saving fails
    pub fn import(&mut self, json: &str) -> Result<(), PersistenceError> {
        let state: SessionState = serde_json::from_str(json).map_err(|e| {
            tracing::warn!(key = %self.key, error = %e, "import rejected, keeping current session");
            PersistenceError::from(e)
        })?;
        tracing::info!(
            key = %self.key,
            beneficiaries = state.beneficiaries.len(),
            assignments = state.assignments.len(),
            "session imported"
        );
        self.state = state;
        self.save()
    }

    /// Clear both the in-memory state and the stored blob
    ///
    /// # Errors
    /// Returns [`PersistenceError`] if the stored blob cannot be removed
    pub fn clear(&mut self) -> Result<(), PersistenceError> {
        self.state = SessionState::default();
        self.store.remove(&self.key)
    }

    /// Give up the session, returning its state
    #[must_use]
    pub fn into_state(self) -> SessionState {
        self.state
    }
}

/// Read and decode a stored session
///
/// # Errors
/// Returns [`PersistenceError`] if the backend fails or the blob is not a
/// valid session
pub fn load_state<S: KeyValueStore + ?Sized>(
    store: &S,
    key: &str,
) -> Result<Option<SessionState>, PersistenceError> {
    store
        .get(key)?
        .map(|blob| serde_json::from_str(&blob).map_err(PersistenceError::from))
        .transpose()
}
