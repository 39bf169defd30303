//! Local Flag Storage
//!
//! Durable, device-local key-value storage for [`ReactionFlagSet`]s, keyed
//! by slug. Reads never fail: a missing or unreadable entry reads as
//! absent, and callers substitute defaults.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use serde_json::{Map, Value};
use thiserror::Error;

use super::types::ReactionFlagSet;

/// Errors that can occur when persisting flags
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type alias for flag storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value store for per-article reaction flags
pub trait FlagStore: Send + Sync {
    /// Stored flags for `key`; `None` when absent or unreadable
    fn get(&self, key: &str) -> Option<ReactionFlagSet>;

    /// Replace the stored flags for `key`
    fn set(&self, key: &str, flags: &ReactionFlagSet) -> StoreResult<()>;
}

fn decode(key: &str, value: Value) -> Option<ReactionFlagSet> {
    match serde_json::from_value(value) {
        Ok(flags) => Some(flags),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding unreadable reaction flags");
            None
        }
    }
}

// ============================================
// In-memory store
// ============================================

/// Process-local store; entries are held serialised, like browser storage
#[derive(Default)]
pub struct MemoryFlagStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw serialised value, bypassing encoding
    pub fn insert_raw(&self, key: &str, raw: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), raw.to_string());
        }
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> Option<ReactionFlagSet> {
        let raw = self.raw(key)?;
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => decode(key, value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding unreadable reaction flags");
                None
            }
        }
    }

    fn set(&self, key: &str, flags: &ReactionFlagSet) -> StoreResult<()> {
        let raw = serde_json::to_string(flags)?;
        self.entries
            .write()
            .map_err(|e| StoreError::Lock(e.to_string()))?
            .insert(key.to_string(), raw);
        Ok(())
    }
}

// ============================================
// File-backed store
// ============================================

/// JSON file holding every article's flags for this device
pub struct FileFlagStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileFlagStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whole file as a map; a missing or corrupt file reads as empty
    fn read_all(&self) -> Map<String, Value> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "Failed to read reaction flags");
                return Map::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                tracing::warn!(path = ?self.path, "Reaction flag file is corrupt, starting fresh");
                Map::new()
            }
        }
    }

    fn write_all(&self, entries: &Map<String, Value>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl FlagStore for FileFlagStore {
    fn get(&self, key: &str) -> Option<ReactionFlagSet> {
        let value = self.read_all().remove(key)?;
        decode(key, value)
    }

    fn set(&self, key: &str, flags: &ReactionFlagSet) -> StoreResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?;

        let mut entries = self.read_all();
        entries.insert(key.to_string(), serde_json::to_value(flags)?);
        self.write_all(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactions::types::ReactionKind;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryFlagStore::new();
        assert!(store.get("post").is_none());

        let mut flags = ReactionFlagSet::default();
        flags.toggle(ReactionKind::Love);
        store.set("post", &flags).unwrap();

        assert_eq!(store.get("post"), Some(flags));
        assert!(store.get("other").is_none());
    }

    #[test]
    fn test_memory_store_corrupt_entry() {
        let store = MemoryFlagStore::new();
        store.insert_raw("post", "{not json");
        assert!(store.get("post").is_none());

        store.insert_raw("post", "[1, 2, 3]");
        assert!(store.get("post").is_none());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("reactions.json");

        let mut flags = ReactionFlagSet::default();
        flags.toggle(ReactionKind::Like);
        FileFlagStore::new(&path).set("hello-world", &flags).unwrap();

        let reopened = FileFlagStore::new(&path);
        assert_eq!(reopened.get("hello-world"), Some(flags));
        assert!(reopened.get("other-post").is_none());
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let store = FileFlagStore::new(dir.path().join("reactions.json"));

        let mut a = ReactionFlagSet::default();
        a.toggle(ReactionKind::Clap);
        let mut b = ReactionFlagSet::default();
        b.toggle(ReactionKind::Party);

        store.set("a", &a).unwrap();
        store.set("b", &b).unwrap();

        assert_eq!(store.get("a"), Some(a));
        assert_eq!(store.get("b"), Some(b));
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reactions.json");
        std::fs::write(&path, "garbage").unwrap();

        let store = FileFlagStore::new(&path);
        assert!(store.get("post").is_none());

        // Writing recovers the file
        store.set("post", &ReactionFlagSet::default()).unwrap();
        assert_eq!(store.get("post"), Some(ReactionFlagSet::default()));
    }

    #[test]
    fn test_file_store_corrupt_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reactions.json");
        std::fs::write(&path, r#"{"post": "yes", "ok": {"liked": true}}"#).unwrap();

        let store = FileFlagStore::new(&path);
        assert!(store.get("post").is_none());
        assert!(store.get("ok").unwrap().liked);
    }
}
