use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{DatabaseError, KeyValueStorage};

/// Process-local storage. Clones share the same entries, which lets a test
/// keep a handle on what the inventory wrote.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::default();
        storage.lock().insert(key.into(), value.into());
        storage
    }

    /// Current raw value under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
