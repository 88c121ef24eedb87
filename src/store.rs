//! Durable key-value store trait
//!
//! The store is a shared, process-wide namespace with last-write-wins
//! semantics and no locking; independent cells writing the same key race
//! by design.

/// Durable key-value storage trait.
///
/// All operations are synchronous from the caller's perspective.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Insert or replace the value under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Delete the entry under `key`; deleting an absent key is not an error
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Error from a key-value store operation
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend failure
    #[error("storage error: {0}")]
    Storage(Box<str>),
}

/// In-memory store for testing
pub struct InMemoryStore {
    data: std::sync::RwLock<std::collections::HashMap<String, String>>,
}

impl InMemoryStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self {
            data: std::sync::RwLock::new(std::collections::HashMap::new()),
        }
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.data.read().map(|d| d.len()).unwrap_or(0)
    }

    /// True when the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let data = self
            .data
            .read()
            .map_err(|e| StoreError::Storage(e.to_string().into()))?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StoreError::Storage(e.to_string().into()))?;
        data.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StoreError::Storage(e.to_string().into()))?;
        data.remove(key);
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("name").unwrap(), None);

        store.set("name", "\"Miri\"").unwrap();
        assert_eq!(store.get("name").unwrap().as_deref(), Some("\"Miri\""));

        store.remove("name").unwrap();
        assert_eq!(store.get("name").unwrap(), None);
    }

    #[test]
    fn remove_absent_key_is_ok() {
        let store = InMemoryStore::new();
        store.remove("never-set").unwrap();
    }

    #[test]
    fn last_write_wins() {
        let store = InMemoryStore::new();
        store.set("k", "first").unwrap();
        store.set("k", "second").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("second"));
        assert_eq!(store.len(), 1);
    }
}
