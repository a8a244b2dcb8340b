//! AES-256-GCM Encryption Implementation
//!
//! Decryption fails closed: either the tag verifies and the full plaintext is
//! returned, or nothing is returned at all.

use crate::crypto::payload::decode_base64;
use crate::crypto::{
    EncryptedPayload, KeyDeriver, Pbkdf2Deriver, NONCE_SIZE, SALT_SIZE, TAG_SIZE,
};
use crate::error::{Error, Result};
use rand::RngCore;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use std::sync::Arc;

/// Password-based decryptor for encrypted data files
#[derive(Clone)]
pub struct Decryptor {
    deriver: Arc<dyn KeyDeriver>,
}

impl Decryptor {
    /// Create a decryptor using the given key derivation
    pub fn new<D: KeyDeriver + 'static>(deriver: D) -> Self {
        Decryptor {
            deriver: Arc::new(deriver),
        }
    }

    /// Create a decryptor with a fixed PBKDF2 round count
    pub fn with_iterations(iterations: u32) -> Self {
        Decryptor::new(Pbkdf2Deriver::new(iterations))
    }

    /// Decrypt raw payload bytes.
    ///
    /// The length check runs before any key derivation.
    pub fn decrypt(&self, payload: &[u8], password: &str) -> Result<Vec<u8>> {
        let payload = EncryptedPayload::from_bytes(payload)?;
        self.decrypt_payload(&payload, password)
    }

    /// Decrypt a base64-encoded payload as read from storage
    pub fn decrypt_base64(&self, blob: &str, password: &str) -> Result<Vec<u8>> {
        let bytes = decode_base64(blob)?;
        self.decrypt(&bytes, password)
    }

    /// Decrypt an already parsed payload
    pub fn decrypt_payload(&self, payload: &EncryptedPayload, password: &str) -> Result<Vec<u8>> {
        if payload.ciphertext.len() < TAG_SIZE {
            return Err(Error::MalformedPayload("Ciphertext too short".to_string()));
        }

        let derived = self.deriver.derive(password.as_bytes(), &payload.salt)?;

        let unbound_key = UnboundKey::new(&AES_256_GCM, derived.key())
            .map_err(|_| Error::KeyDerivation("Failed to create decryption key".to_string()))?;
        let opening_key = LessSafeKey::new(unbound_key);
        let nonce = Nonce::assume_unique_for_key(payload.nonce);

        let mut in_out = payload.ciphertext.clone();
        let plaintext = opening_key
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| Error::DecryptionFailed)?;

        Ok(plaintext.to_vec())
    }
}

impl Default for Decryptor {
    fn default() -> Self {
        Decryptor::new(Pbkdf2Deriver::default())
    }
}

impl std::fmt::Debug for Decryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decryptor").finish_non_exhaustive()
    }
}

/// Encrypt `plaintext` into the data file format.
///
/// A fresh random salt and nonce are generated for every call.
pub fn encrypt(
    plaintext: &[u8],
    password: &str,
    deriver: &dyn KeyDeriver,
) -> Result<EncryptedPayload> {
    let mut salt = [0u8; SALT_SIZE];
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    let mut rng = rand::thread_rng();
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut nonce_bytes);

    let derived = deriver.derive(password.as_bytes(), &salt)?;

    let unbound_key = UnboundKey::new(&AES_256_GCM, derived.key())
        .map_err(|_| Error::Encryption("Failed to create encryption key".to_string()))?;
    let sealing_key = LessSafeKey::new(unbound_key);
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    // Prepare buffer: plaintext + space for tag
    let mut in_out = plaintext.to_vec();
    in_out.reserve(TAG_SIZE);

    sealing_key
        .seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| Error::Encryption("Encryption failed".to_string()))?;

    Ok(EncryptedPayload {
        salt,
        nonce: nonce_bytes,
        ciphertext: in_out,
    })
}
