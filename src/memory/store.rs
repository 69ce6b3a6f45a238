use std::collections::HashMap;
use std::path::{Path, PathBuf};
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use crate::error::CoachError;

/// Failure of the external key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize value for key '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Whole-record key-value JSON store. Last writer wins; there are no
/// version tokens, locks across calls, or retries.
pub trait KvStore: Send + Sync {
    fn read_raw(&self, key: &str) -> Result<Option<Value>, StoreError>;
    fn write_raw(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

/// Read and decode a record. Missing, unreadable, or malformed records all
/// come back as `None`; callers fall back to defaults.
pub fn read<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Option<T> {
    let raw = match store.read_raw(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key = key, error = %e, "Store read failed, treating record as absent");
            return None;
        }
    };
    match serde_json::from_value::<T>(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key = key, error = %e, "Malformed record in store, treating as absent");
            None
        }
    }
}

/// Encode and write a record, replacing whatever was there.
pub fn write<T: Serialize>(store: &dyn KvStore, key: &str, value: &T) -> Result<(), CoachError> {
    let json = serde_json::to_value(value).map_err(|source| StoreError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.write_raw(key, json)?;
    tracing::debug!(key = key, "Record written");
    Ok(())
}

/// In-process store, used by tests and as a scratch backend.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl KvStore for MemoryStore {
    fn read_raw(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.records.read().get(key).cloned())
    }

    fn write_raw(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.records.write().insert(key.to_string(), value);
        Ok(())
    }
}

/// One pretty-printed JSON file per key under a data directory.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        JsonFileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Characters outside `[A-Za-z0-9._-]` become `_`, so keys that differ
    /// only there (`a/b` and `a_b`) share a file. Keys must stay distinct
    /// after that mapping; the constants in `memory::keys` are.
    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file))
    }
}

impl KvStore for JsonFileStore {
    fn read_raw(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io { key: key.to_string(), source });
            }
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(
                    path = ?path,
                    error = %e,
                    "Failed to parse store file, treating as absent"
                );
                Ok(None)
            }
        }
    }

    fn write_raw(&self, key: &str, value: Value) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|source| StoreError::Io { key: key.to_string(), source })?;
        let json = serde_json::to_string_pretty(&value)
            .map_err(|source| StoreError::Serialize { key: key.to_string(), source })?;
        std::fs::write(self.path_for(key), json)
            .map_err(|source| StoreError::Io { key: key.to_string(), source })
    }
}
