//! Key-value store port
//!
//! Small client-side records that survive between steps of the operator
//! flow. Keys are documented in [`keys`].

use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

/// Documented store keys
pub mod keys {
    /// JSON record of the most recently published survey, written on publish
    /// and consumed once by the results view
    pub const LAST_PUBLISHED_SURVEY: &str = "last_published_survey";
}

/// Errors from a key-value store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(String),

    #[error("Corrupt store contents: {0}")]
    Corrupt(String),
}

/// String-keyed store of string values
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key, returning its previous value
    fn remove(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Read a value and remove it in one step
    fn take(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.remove(key)
    }
}

/// Process-local store, used in tests and when no store path is configured
#[derive(Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Io(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(entries.remove(key))
    }
}
