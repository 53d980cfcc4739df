use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::io::storage::Storage;

/// Callback fired after every successful write, with the key written
pub type OnSave = Box<dyn FnMut(&str)>;

/// JSON adapter over a [`Storage`] port.
///
/// Reads never fail: absent or unreadable data yields the caller's fallback.
/// Writes never fail either: a rejected write is logged and dropped.
pub struct PersistentStore<S: Storage> {
    storage: S,
    on_save: Option<OnSave>,
}

impl<S: Storage> PersistentStore<S> {
    pub fn new(storage: S) -> Self {
        PersistentStore {
            storage,
            on_save: None,
        }
    }

    /// Install the save callback (replaces any previous one)
    pub fn with_on_save(mut self, on_save: impl FnMut(&str) + 'static) -> Self {
        self.on_save = Some(Box::new(on_save));
        self
    }

    /// Parsed value under `key`, or `fallback` if absent or unreadable.
    pub fn get<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let raw = match self.storage.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return fallback,
            Err(e) => {
                warn!(key, error = %e, "error reading stored value");
                return fallback;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "error parsing stored value");
                fallback
            }
        }
    }

    /// Serialize `value` under `key`. Returns whether the write landed.
    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> bool {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(key, error = %e, "error serializing value");
                return false;
            }
        };
        match self.storage.set_item(key, &json) {
            Ok(()) => {
                debug!(key, bytes = json.len(), "saved");
                if let Some(on_save) = self.on_save.as_mut() {
                    on_save(key);
                }
                true
            }
            Err(e) => {
                warn!(key, error = %e, "error saving value");
                false
            }
        }
    }

    /// Remove `key`. Returns whether the removal landed.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.storage.remove_item(key) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "error removing value");
                false
            }
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}

/// A value mirrored to one storage key.
///
/// The in-memory value is authoritative: it changes first, then is written
/// through. A failed write leaves the new value in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Persisted<T> {
    key: &'static str,
    value: T,
}

impl<T: Serialize + DeserializeOwned> Persisted<T> {
    /// Load the value under `key`, falling back to `fallback`
    pub fn load<S: Storage>(store: &PersistentStore<S>, key: &'static str, fallback: T) -> Self {
        Persisted {
            key,
            value: store.get(key, fallback),
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value and write it through. Returns whether it was saved.
    pub fn set<S: Storage>(&mut self, store: &mut PersistentStore<S>, value: T) -> bool {
        self.value = value;
        store.set(self.key, &self.value)
    }

    /// Replace the value with `f(current)` and write it through.
    pub fn update<S, F>(&mut self, store: &mut PersistentStore<S>, f: F) -> bool
    where
        S: Storage,
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.value);
        self.set(store, next)
    }
}
