//! Directory-backed byte store

use crate::error::{Error, Result};
use crate::store::ByteStore;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads encrypted blobs from files under a base directory
#[derive(Debug, Clone)]
pub struct DirStore {
    base_dir: PathBuf,
}

impl DirStore {
    /// Create a store rooted at `base_dir`. Trailing separators are dropped.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        let raw = base_dir.as_ref().to_string_lossy();
        let trimmed = raw.trim_end_matches(['/', '\\']);
        let base_dir = if trimmed.is_empty() {
            base_dir.as_ref().to_path_buf()
        } else {
            PathBuf::from(trimmed)
        };

        DirStore { base_dir }
    }

    /// Base directory of this store
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Full path of a locator
    pub fn path_of(&self, locator: &str) -> PathBuf {
        self.base_dir.join(locator)
    }
}

impl ByteStore for DirStore {
    async fn fetch(&self, locator: &str) -> Result<String> {
        let path = self.path_of(locator);
        debug!("Reading encrypted blob {:?}", path);

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Error::StoreUnavailable {
                locator: locator.to_string(),
                reason: e.to_string(),
            })?;

        Ok(content.trim().to_string())
    }
}
