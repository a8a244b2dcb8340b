//! Error types for hanzi-vault

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// The only text a login failure ever shows to the user
pub const GENERIC_LOGIN_FAILURE: &str = "wrong password or data load failed";

/// Main error type for hanzi-vault
#[derive(Error, Debug)]
pub enum Error {
    // Payload / crypto errors
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Authentication failed. Wrong password and tampered ciphertext are
    /// deliberately the same variant with no detail attached.
    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    // Store errors
    #[error("Store unavailable for {locator}: {reason}")]
    StoreUnavailable { locator: String, reason: String },

    // Dataset errors
    #[error("Malformed JSON: {0}")]
    MalformedJson(String),

    /// What the user sees for any failed login, whatever the cause
    #[error("wrong password or data load failed")]
    LoginFailed,

    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable label for diagnostics logging
    pub fn kind(&self) -> &'static str {
        match self {
            Error::MalformedPayload(_) => "malformed_payload",
            Error::DecryptionFailed => "decryption_failed",
            Error::KeyDerivation(_) => "key_derivation",
            Error::Encryption(_) => "encryption",
            Error::StoreUnavailable { .. } => "store_unavailable",
            Error::MalformedJson(_) => "malformed_json",
            Error::LoginFailed => "login_failed",
            Error::Database(_) => "database",
            Error::Config(_) | Error::InvalidConfig(_) => "config",
            Error::Io(_) => "io",
            Error::Serialization(_) => "serialization",
            Error::Internal(_) => "internal",
        }
    }

    /// Text safe to render on a user-facing surface.
    ///
    /// Every error on the login path collapses to one message so the user
    /// cannot learn why a password attempt failed.
    pub fn user_message() -> &'static str {
        GENERIC_LOGIN_FAILURE
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
