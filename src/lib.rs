//! hanzi-vault - Encrypted Chinese character statistics
//!
//! This library decrypts password-protected data files and reassembles the
//! character frequency, cohesion, summary, network and transcript datasets
//! that a viewer presents.

pub mod config;
pub mod crypto;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod session;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crypto::Decryptor;
    pub use crate::error::{Error, Result};
    pub use crate::session::{Selection, Session, SessionSlot};
    pub use crate::store::{ByteStore, DirStore, MemoryStore, Resource};
}
