//! Key-value persistence contract and JSON helpers.
//!
//! Failures are caught here: the helpers log them and report absence or
//! `false`, so a storage outage never corrupts in-memory game state.

use crate::db::StoreError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, instrument};

/// Storage key for the game in progress.
pub const CURRENT_GAME_KEY: &str = "mahjong_current_game";

/// Storage key for default settings of new games.
pub const GAME_SETTINGS_KEY: &str = "mahjong_game_settings";

/// Storage key for the archive of completed games.
pub const GAME_HISTORY_KEY: &str = "mahjong_game_history";

/// A string key-value store.
pub trait KeyValueStore {
    /// Stores `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Returns the value under `key`, or `None` if absent.
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Deletes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).save(key, value)
    }

    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).load(key)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// In-memory store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    /// Returns true when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|e| StoreError::new(format!("Memory store lock poisoned: {}", e)))
    }
}

impl KeyValueStore for MemoryStore {
    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Typed JSON access over a [`KeyValueStore`] that logs instead of failing.
#[derive(Debug, Clone)]
pub struct JsonStorage<S> {
    store: S,
}

impl<S: KeyValueStore> JsonStorage<S> {
    /// Wraps a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Serializes and saves `value`. Returns false (after logging) on failure.
    #[instrument(skip(self, value))]
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> bool {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                error!(key, error = %e, "Failed to serialize value");
                return false;
            }
        };
        self.save_raw(key, &json)
    }

    /// Saves an already-encoded document. Returns false (after logging) on failure.
    #[instrument(skip(self, json), fields(len = json.len()))]
    pub fn save_raw(&self, key: &str, json: &str) -> bool {
        match self.store.save(key, json) {
            Ok(()) => {
                debug!(key, "Saved");
                true
            }
            Err(e) => {
                error!(key, error = %e, "Failed to save");
                false
            }
        }
    }

    /// Loads the raw document under `key`. Failures are logged and read as absent.
    #[instrument(skip(self))]
    pub fn load_raw(&self, key: &str) -> Option<String> {
        match self.store.load(key) {
            Ok(value) => value,
            Err(e) => {
                error!(key, error = %e, "Failed to load");
                None
            }
        }
    }

    /// Loads and deserializes the value under `key`.
    ///
    /// Missing keys, store failures and undecodable documents all read as `None`.
    #[instrument(skip(self))]
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let json = self.load_raw(key)?;
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                error!(key, error = %e, "Failed to parse stored value");
                None
            }
        }
    }

    /// Removes `key`. Returns false (after logging) on failure.
    #[instrument(skip(self))]
    pub fn remove(&self, key: &str) -> bool {
        match self.store.remove(key) {
            Ok(()) => true,
            Err(e) => {
                error!(key, error = %e, "Failed to remove");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store whose every operation fails.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn save(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::new("disk full"))
        }

        fn load(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::new("disk unreadable"))
        }

        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::new("disk read-only"))
        }
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        store.save("k", "v").unwrap();
        assert_eq!(store.load("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.load("k").unwrap(), None);
        store.remove("k").unwrap();
    }

    #[test]
    fn test_memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let clone = store.clone();
        clone.save("k", "v").unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_json_storage_swallows_failures() {
        let storage = JsonStorage::new(BrokenStore);
        assert!(!storage.save("k", &vec![1, 2, 3]));
        assert_eq!(storage.load::<Vec<i32>>("k"), None);
        assert!(!storage.remove("k"));
    }

    #[test]
    fn test_json_storage_reads_garbage_as_absent() {
        let store = MemoryStore::new();
        store.save("k", "{not json").unwrap();
        let storage = JsonStorage::new(store);
        assert_eq!(storage.load::<Vec<i32>>("k"), None);
    }
}
