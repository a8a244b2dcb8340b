//! Cryptography module for hanzi-vault
//!
//! Provides AES-256-GCM decryption with PBKDF2-HMAC-SHA256 key derivation.
//! The on-disk format is `salt(16) || nonce(12) || ciphertext || tag(16)`,
//! base64-encoded for transport.

mod encryption;
mod kdf;
mod payload;

pub use encryption::{encrypt, Decryptor};
pub use kdf::{derive_key, DerivedKey, KeyDeriver, Pbkdf2Deriver};
pub use payload::EncryptedPayload;

/// Size of AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// Size of GCM nonce in bytes
pub const NONCE_SIZE: usize = 12;

/// Size of GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;

/// Size of salt for key derivation
pub const SALT_SIZE: usize = 16;

/// PBKDF2 rounds used by the encrypted data files
pub const PBKDF2_ITERATIONS: u32 = 200_000;

/// Smallest payload that can hold a salt, a nonce and a tag
pub const MIN_PAYLOAD_SIZE: usize = SALT_SIZE + NONCE_SIZE + TAG_SIZE;
