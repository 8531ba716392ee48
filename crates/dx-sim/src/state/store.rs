use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use tracing::debug;

use super::snapshot::{SnapshotError, StateSnapshot};

const MAX_KEY_LEN: usize = 64;

/// Persistence for user snapshots so the service can run against memory in tests.
pub trait SnapshotStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<StateSnapshot>, StoreError>;
    fn put(&self, key: &str, snapshot: &StateSnapshot) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("snapshot not found")]
    NotFound,
    #[error("invalid snapshot key: {0}")]
    InvalidKey(String),
    #[error("snapshot storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
}

/// Keys become file names, so only ASCII alphanumerics, `-` and `_` pass.
pub(crate) fn validate_key(key: &str) -> Result<&str, StoreError> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
    if valid {
        Ok(key)
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    snapshots: Mutex<HashMap<String, StateSnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, StateSnapshot>>, StoreError> {
        self.snapshots
            .lock()
            .map_err(|_| StoreError::Unavailable("snapshot mutex poisoned".to_string()))
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn get(&self, key: &str) -> Result<Option<StateSnapshot>, StoreError> {
        let key = validate_key(key)?;
        Ok(self.guard()?.get(key).cloned())
    }

    fn put(&self, key: &str, snapshot: &StateSnapshot) -> Result<(), StoreError> {
        let key = validate_key(key)?;
        self.guard()?.insert(key.to_string(), snapshot.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let key = validate_key(key)?;
        match self.guard()?.remove(key) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }
}

/// One JSON file per key under a directory. Older snapshot shapes are migrated
/// on read.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    root: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let key = validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn get(&self, key: &str) -> Result<Option<StateSnapshot>, StoreError> {
        let path = self.path_for(key)?;
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        let snapshot = StateSnapshot::migrate(value, Utc::now())?;
        debug!(path = %path.display(), version = snapshot.version, "snapshot loaded");
        Ok(Some(snapshot))
    }

    fn put(&self, key: &str, snapshot: &StateSnapshot) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, serde_json::to_vec_pretty(snapshot)?)?;
        fs::rename(&staging, &path)?;
        debug!(path = %path.display(), "snapshot saved");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(err) => Err(err.into()),
        }
    }
}
