//! In-memory byte store

use crate::error::{Error, Result};
use crate::store::ByteStore;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Holds encrypted blobs in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a blob under `locator`, replacing any previous one
    pub fn insert(&self, locator: impl Into<String>, blob: impl Into<String>) {
        self.blobs.write().insert(locator.into(), blob.into());
    }

    /// Remove a blob
    pub fn remove(&self, locator: &str) -> Option<String> {
        self.blobs.write().remove(locator)
    }

    pub fn contains(&self, locator: &str) -> bool {
        self.blobs.read().contains_key(locator)
    }

    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }
}

impl ByteStore for MemoryStore {
    async fn fetch(&self, locator: &str) -> Result<String> {
        self.blobs
            .read()
            .get(locator)
            .cloned()
            .ok_or_else(|| Error::StoreUnavailable {
                locator: locator.to_string(),
                reason: "not found".to_string(),
            })
    }
}
