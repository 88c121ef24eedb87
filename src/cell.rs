//! Persistent keyed state cell
//!
//! A [`PersistentCell`] owns a value and mirrors it to a durable
//! [`KeyValueStore`] under a string key through a pluggable
//! [`ValueCodec`]. Synchronization runs after every tracked-input change
//! (value set, key change); a key change migrates the stored entry by
//! deleting the old key's entry before writing under the new key, so at
//! most one entry is ever live per cell.
//!
//! The store is shared and unlocked: independent cells writing the same
//! key race last-write-wins.

use crate::codec::{JsonCodec, SerializationError, ValueCodec};
use crate::store::{KeyValueStore, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Error from a cell operation
#[derive(Debug, thiserror::Error)]
pub enum CellError {
    /// Durable store failure
    #[error("store: {0}")]
    Store(#[from] StoreError),
    /// Codec failure
    #[error("serialization: {0}")]
    Serialization(#[from] SerializationError),
}

/// Initial value for a cell that finds no stored entry.
///
/// `Lazy` defers an expensive computation; the producer is invoked at most
/// once per cell, and not at all when a stored entry decodes successfully.
pub enum DefaultValue<T> {
    /// A literal default
    Eager(T),
    /// A zero-argument producer, invoked only if the default is needed
    Lazy(Box<dyn FnOnce() -> T + Send>),
}

impl<T> DefaultValue<T> {
    /// Lazily-computed default
    pub fn lazy(producer: impl FnOnce() -> T + Send + 'static) -> Self {
        Self::Lazy(Box::new(producer))
    }

    fn take(self) -> T {
        match self {
            Self::Eager(value) => value,
            Self::Lazy(producer) => producer(),
        }
    }
}

impl<T> From<T> for DefaultValue<T> {
    fn from(value: T) -> Self {
        Self::Eager(value)
    }
}

/// Policy for a stored entry that fails to decode.
///
/// The default is `Propagate`: construction fails with
/// [`CellError::Serialization`] and the corrupt entry is left in place.
/// `FallBackToDefault` discards the entry and uses the default value,
/// logging a warning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Surface the decode error to the caller
    #[default]
    Propagate,
    /// Discard the corrupt entry and fall back to the default value
    FallBackToDefault,
}

/// A value mirrored to a durable key-value store under a string key
pub struct PersistentCell<T, C = JsonCodec> {
    store: Arc<dyn KeyValueStore>,
    codec: C,
    key: String,
    // Tracks the key of the live store entry; compared on every sync so a
    // key change deletes the old entry before writing the new one.
    prev_key: String,
    value: T,
}

impl<T> PersistentCell<T, JsonCodec>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Create a cell with the JSON codec and strict decode policy.
    ///
    /// Reads the store at `key`: a present entry is decoded and used as
    /// the initial value, otherwise `default` is taken. The initial value
    /// is written through to the store.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        default: impl Into<DefaultValue<T>>,
    ) -> Result<Self, CellError> {
        Self::with_codec(store, key, default, JsonCodec::new(), DecodePolicy::default())
    }
}

impl<T, C: ValueCodec<T>> PersistentCell<T, C> {
    /// Create a cell with an explicit codec and decode policy
    pub fn with_codec(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        default: impl Into<DefaultValue<T>>,
        codec: C,
        policy: DecodePolicy,
    ) -> Result<Self, CellError> {
        let key = key.into();
        let value = match store.get(&key)? {
            Some(raw) => match codec.decode(&raw) {
                Ok(value) => value,
                Err(err) if policy == DecodePolicy::FallBackToDefault => {
                    tracing::warn!(key = %key, error = %err, "Discarding corrupt store entry");
                    default.into().take()
                }
                Err(err) => return Err(err.into()),
            },
            None => default.into().take(),
        };

        let mut cell = Self {
            store,
            codec,
            prev_key: key.clone(),
            key,
            value,
        };
        cell.sync()?;
        Ok(cell)
    }

    /// Borrow the current value
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value and write it through under the current key
    pub fn set(&mut self, value: T) -> Result<(), CellError> {
        self.value = value;
        self.sync()
    }

    /// Mutate the value in place, then write it through
    pub fn update(&mut self, mutate: impl FnOnce(&mut T)) -> Result<(), CellError> {
        mutate(&mut self.value);
        self.sync()
    }

    /// Change the key the value is stored under.
    ///
    /// Migrates the store entry: the entry under the old key is removed
    /// before the value is written under the new key, so the two are never
    /// both present. A same-key call (string equality) is a no-op.
    pub fn set_key(&mut self, key: impl Into<String>) -> Result<(), CellError> {
        let key = key.into();
        if key == self.key {
            return Ok(());
        }
        self.key = key;
        self.sync()
    }

    /// Current key
    pub fn key(&self) -> &str {
        &self.key
    }

    // Synchronize the store with the tracked inputs: migrate first when
    // the key changed, then write the value under the current key.
    fn sync(&mut self) -> Result<(), CellError> {
        if self.prev_key != self.key {
            self.store.remove(&self.prev_key)?;
            tracing::debug!(from = %self.prev_key, to = %self.key, "Store entry migrated");
            self.prev_key = self.key.clone();
        }
        let raw = self.codec.encode(&self.value)?;
        self.store.set(&self.key, &raw)?;
        Ok(())
    }
}
