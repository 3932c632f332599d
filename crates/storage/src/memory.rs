//! In-memory storage backend.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::backend::{StorageBackend, StorageError};

/// In-memory key-value storage.
///
/// Intended for tests/dev. Hand it to a store behind an `Arc` to keep a
/// handle for inspecting what was persisted.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value under `key`, bypassing the async trait (test helper).
    pub fn value_of(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StorageError::read("lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::write("lock poisoned"))?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
