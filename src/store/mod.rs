//! Byte store module
//!
//! Encrypted data files are fetched as opaque base64 text blobs. The store
//! only knows locators; it never sees plaintext.

mod dir;
mod memory;

pub use dir::DirStore;
pub use memory::MemoryStore;

use crate::error::Result;
use std::fmt;
use std::future::Future;

/// Suffix appended to every encrypted file name
pub const ENCRYPTED_SUFFIX: &str = ".enc";

/// Source of encrypted blobs
pub trait ByteStore: Send + Sync {
    /// Fetch the full base64 text stored under `locator`.
    ///
    /// Fails with `Error::StoreUnavailable` when the blob is missing or the
    /// backing storage cannot be reached.
    fn fetch(&self, locator: &str) -> impl Future<Output = Result<String>> + Send;
}

/// The encrypted resources that make up one dataset bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    CharFreq,
    CharCohesion,
    CharSummary,
    CharNetwork,
    RawText,
}

impl Resource {
    /// All resources, in login order
    pub const ALL: [Resource; 5] = [
        Resource::CharFreq,
        Resource::CharCohesion,
        Resource::CharSummary,
        Resource::CharNetwork,
        Resource::RawText,
    ];

    /// Resource name without extension
    pub fn name(&self) -> &'static str {
        match self {
            Resource::CharFreq => "char_freq",
            Resource::CharCohesion => "char_cohesion",
            Resource::CharSummary => "char_summary",
            Resource::CharNetwork => "char_network",
            Resource::RawText => "raw_text",
        }
    }

    /// Whether the plaintext is JSON (otherwise raw text)
    pub fn is_json(&self) -> bool {
        !matches!(self, Resource::RawText)
    }

    /// Locator of the encrypted file, e.g. `char_freq.json.enc`
    pub fn locator(&self) -> String {
        let ext = if self.is_json() { "json" } else { "txt" };
        format!("{}.{}{}", self.name(), ext, ENCRYPTED_SUFFIX)
    }

    /// Plaintext file the encrypt tool reads for this resource
    pub fn source_file(&self) -> &'static str {
        match self {
            Resource::CharFreq => "char_freq.json",
            Resource::CharCohesion => "char_cohesion.json",
            Resource::CharSummary => "char_summary.json",
            Resource::CharNetwork => "char_network.json",
            Resource::RawText => "test.txt",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
