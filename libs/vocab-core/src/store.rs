//! Key-value persistence seam.
//!
//! All app state is stored as JSON strings under fixed keys. Backends only
//! need to provide string get/set/remove; typed access goes through
//! [`KeyValueExt`].

use crate::error::{Result, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;

/// Persisted keys.
pub mod keys {
    pub const WORDS: &str = "words";
    pub const FAVORITES: &str = "flags.favorite";
    pub const LEARNED: &str = "flags.learned";
    pub const REQUIRED: &str = "flags.required";
    pub const STATUS: &str = "homework.status";
    pub const PAIR: &str = "homework.pair";
    pub const CYCLE_INDEX: &str = "homework.cycle_index";
    pub const CYCLE_START: &str = "homework.cycle_start";
    pub const VARIANT_PREFIX: &str = "homework.variant.";
    pub const HISTORY: &str = "homework.history";
    pub const SETTINGS: &str = "homework.settings";
    pub const IMPORTED_IDS: &str = "homework.imported_ids";
    pub const SELECTION: &str = "homework.selection";
}

/// Synchronous string key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Typed JSON access on top of any [`KeyValueStore`].
pub trait KeyValueExt: KeyValueStore {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StoreError::Corrupt {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.set(key, &raw)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueExt for S {}

/// In-memory store, used in tests and as a scratch backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}
