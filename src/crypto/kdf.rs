//! PBKDF2-HMAC-SHA256 key derivation

use crate::crypto::{KEY_SIZE, PBKDF2_ITERATIONS, SALT_SIZE};
use crate::error::{Error, Result};
use ring::pbkdf2;
use std::num::NonZeroU32;
use zeroize::Zeroizing;

/// A 256-bit key derived from a password. Wiped on drop.
pub struct DerivedKey {
    key: Zeroizing<[u8; KEY_SIZE]>,
}

impl DerivedKey {
    /// Get the raw key bytes
    pub fn key(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey(..)")
    }
}

/// Derive a key from `password` and `salt` with PBKDF2-HMAC-SHA256
pub fn derive_key(password: &[u8], salt: &[u8; SALT_SIZE], iterations: u32) -> Result<DerivedKey> {
    let rounds = NonZeroU32::new(iterations)
        .ok_or_else(|| Error::KeyDerivation("PBKDF2 iterations must be at least 1".to_string()))?;

    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        rounds,
        salt,
        password,
        &mut key[..],
    );

    Ok(DerivedKey { key })
}

/// Turns a password and salt into a key.
///
/// Decryption goes through this trait so the expensive derivation step can be
/// observed or cheapened in tests.
pub trait KeyDeriver: Send + Sync {
    fn derive(&self, password: &[u8], salt: &[u8; SALT_SIZE]) -> Result<DerivedKey>;
}

/// PBKDF2-HMAC-SHA256 with a fixed round count
#[derive(Debug, Clone, Copy)]
pub struct Pbkdf2Deriver {
    iterations: u32,
}

impl Pbkdf2Deriver {
    pub fn new(iterations: u32) -> Self {
        Pbkdf2Deriver { iterations }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl Default for Pbkdf2Deriver {
    fn default() -> Self {
        Pbkdf2Deriver::new(PBKDF2_ITERATIONS)
    }
}

impl KeyDeriver for Pbkdf2Deriver {
    fn derive(&self, password: &[u8], salt: &[u8; SALT_SIZE]) -> Result<DerivedKey> {
        derive_key(password, salt, self.iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_deterministic() {
        let salt = [7u8; SALT_SIZE];
        let key1 = derive_key(b"password", &salt, 1000).unwrap();
        let key2 = derive_key(b"password", &salt, 1000).unwrap();

        assert_eq!(key1.key(), key2.key());
    }

    #[test]
    fn test_default_rounds_deterministic() {
        let deriver = Pbkdf2Deriver::default();
        assert_eq!(deriver.iterations(), 200_000);

        let salt = [1u8; SALT_SIZE];
        let key1 = deriver.derive("密码".as_bytes(), &salt).unwrap();
        let key2 = deriver.derive("密码".as_bytes(), &salt).unwrap();

        assert_eq!(key1.key(), key2.key());
    }

    #[test]
    fn test_salt_changes_key() {
        let key1 = derive_key(b"password", &[0u8; SALT_SIZE], 1000).unwrap();
        let key2 = derive_key(b"password", &[1u8; SALT_SIZE], 1000).unwrap();

        assert_ne!(key1.key(), key2.key());
    }

    #[test]
    fn test_password_changes_key() {
        let salt = [0u8; SALT_SIZE];
        let key1 = derive_key(b"password", &salt, 1000).unwrap();
        let key2 = derive_key(b"Password", &salt, 1000).unwrap();

        assert_ne!(key1.key(), key2.key());
    }

    #[test]
    fn test_rounds_change_key() {
        let salt = [0u8; SALT_SIZE];
        let key1 = derive_key(b"password", &salt, 1000).unwrap();
        let key2 = derive_key(b"password", &salt, 1001).unwrap();

        assert_ne!(key1.key(), key2.key());
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let result = derive_key(b"password", &[0u8; SALT_SIZE], 0);
        assert!(matches!(result, Err(Error::KeyDerivation(_))));
    }

    #[test]
    fn test_debug_hides_key() {
        let key = derive_key(b"password", &[0u8; SALT_SIZE], 1).unwrap();
        assert_eq!(format!("{:?}", key), "DerivedKey(..)");
    }
}
