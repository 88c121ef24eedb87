//! JSON file backend for durable storage
//!
//! Mirrors the whole namespace into a single JSON object file, rewritten
//! on every mutation. Suited to small client-side namespaces; entries
//! survive process restarts.

use crate::store::{KeyValueStore, StoreError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File-backed key-value store
pub struct FileStore {
    path: PathBuf,
    // Cache of the file contents; the file is the source of truth only at
    // open time, every mutation writes through.
    data: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open a store at `path`, loading existing entries if the file exists
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| StoreError::Storage(format!("failed to read {:?}: {}", path, e).into()))?;
            serde_json::from_str(&content)
                .map_err(|e| StoreError::Storage(format!("failed to parse {:?}: {}", path, e).into()))?
        } else {
            HashMap::new()
        };
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, data: &HashMap<String, String>) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| StoreError::Storage(format!("failed to serialize store: {}", e).into()))?;
        std::fs::write(&self.path, content)
            .map_err(|e| StoreError::Storage(format!("failed to write {:?}: {}", self.path, e).into()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let data = self
            .data
            .lock()
            .map_err(|e| StoreError::Storage(e.to_string().into()))?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut data = self
            .data
            .lock()
            .map_err(|e| StoreError::Storage(e.to_string().into()))?;
        data.insert(key.to_owned(), value.to_owned());
        self.flush(&data)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut data = self
            .data
            .lock()
            .map_err(|e| StoreError::Storage(e.to_string().into()))?;
        if data.remove(key).is_some() {
            self.flush(&data)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cells.json");

        {
            let store = FileStore::open(&path).unwrap();
            store.set("name", "\"Miri\"").unwrap();
            store.set("animal", "\"cat\"").unwrap();
        }

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("name").unwrap().as_deref(), Some("\"Miri\""));
        assert_eq!(store.get("animal").unwrap().as_deref(), Some("\"cat\""));
    }

    #[test]
    fn remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cells.json");

        let store = FileStore::open(&path).unwrap();
        store.set("name", "\"Miri\"").unwrap();
        store.remove("name").unwrap();
        drop(store);

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("name").unwrap(), None);
    }

    #[test]
    fn open_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cells.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(FileStore::open(&path).is_err());
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("absent.json")).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
    }
}
