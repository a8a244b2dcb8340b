//! Encrypted payload layout
//!
//! `salt(16) || nonce(12) || ciphertext-with-tag`, base64 on the wire.

use crate::crypto::{MIN_PAYLOAD_SIZE, NONCE_SIZE, SALT_SIZE};
use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// A parsed encrypted file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    /// Salt for key derivation
    pub salt: [u8; SALT_SIZE],
    /// GCM nonce
    pub nonce: [u8; NONCE_SIZE],
    /// Ciphertext with appended authentication tag
    pub ciphertext: Vec<u8>,
}

impl EncryptedPayload {
    /// Get the total size of the payload
    pub fn size(&self) -> usize {
        SALT_SIZE + NONCE_SIZE + self.ciphertext.len()
    }

    /// Serialize to bytes for storage
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.size());
        bytes.extend_from_slice(&self.salt);
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Deserialize from bytes. Shorter than salt + nonce + tag is malformed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < MIN_PAYLOAD_SIZE {
            return Err(Error::MalformedPayload(format!(
                "payload is {} bytes, need at least {}",
                bytes.len(),
                MIN_PAYLOAD_SIZE
            )));
        }

        let mut salt = [0u8; SALT_SIZE];
        salt.copy_from_slice(&bytes[..SALT_SIZE]);

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&bytes[SALT_SIZE..SALT_SIZE + NONCE_SIZE]);

        Ok(EncryptedPayload {
            salt,
            nonce,
            ciphertext: bytes[SALT_SIZE + NONCE_SIZE..].to_vec(),
        })
    }

    /// Encode as standard padded base64
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Decode a base64 blob. ASCII whitespace (trailing newlines, line
    /// wrapping) is ignored.
    pub fn from_base64(blob: &str) -> Result<Self> {
        let bytes = decode_base64(blob)?;
        Self::from_bytes(&bytes)
    }
}

/// Decode base64 text into raw payload bytes
pub(crate) fn decode_base64(blob: &str) -> Result<Vec<u8>> {
    let compact: String = blob.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| Error::MalformedPayload(format!("invalid base64: {}", e)))
}
