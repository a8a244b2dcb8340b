//! Fetch + decrypt helpers
//!
//! Each call pulls one blob from a byte store, decrypts it with the session
//! password and decodes the plaintext. Key derivation is CPU bound, so the
//! decrypt step runs on the blocking pool.

use crate::crypto::Decryptor;
use crate::error::{Error, Result};
use crate::store::ByteStore;
use serde_json::Value;
use tracing::debug;
use zeroize::Zeroizing;

/// Fetch a blob and return the decrypted bytes
pub async fn fetch_and_decrypt<S: ByteStore>(
    store: &S,
    decryptor: &Decryptor,
    locator: &str,
    password: &str,
) -> Result<Vec<u8>> {
    let blob = store.fetch(locator).await?;
    debug!("Fetched {} ({} bytes of base64)", locator, blob.len());

    let decryptor = decryptor.clone();
    let password = Zeroizing::new(password.to_string());
    let plaintext = tokio::task::spawn_blocking(move || decryptor.decrypt_base64(&blob, &password))
        .await
        .map_err(|e| Error::Internal(format!("Decrypt task failed: {}", e)))??;

    debug!("Decrypted {} ({} bytes)", locator, plaintext.len());
    Ok(plaintext)
}

/// Fetch, decrypt and decode as UTF-8 text.
///
/// Invalid UTF-8 sequences are replaced with U+FFFD rather than rejected.
pub async fn fetch_and_decrypt_text<S: ByteStore>(
    store: &S,
    decryptor: &Decryptor,
    locator: &str,
    password: &str,
) -> Result<String> {
    let plaintext = fetch_and_decrypt(store, decryptor, locator, password).await?;
    Ok(decode_text(plaintext))
}

/// Fetch, decrypt and parse as JSON.
///
/// A payload that decrypts but does not parse yields `MalformedJson`; this
/// covers the degenerate case of a swapped file encrypted under the same
/// password.
pub async fn fetch_and_decrypt_json<S: ByteStore>(
    store: &S,
    decryptor: &Decryptor,
    locator: &str,
    password: &str,
) -> Result<Value> {
    let text = fetch_and_decrypt_text(store, decryptor, locator, password).await?;
    parse_json(locator, &text)
}

fn decode_text(plaintext: Vec<u8>) -> String {
    match String::from_utf8(plaintext) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

fn parse_json(locator: &str, text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| Error::MalformedJson(format!("{}: {}", locator, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{encrypt, Pbkdf2Deriver};
    use crate::store::MemoryStore;
    use serde_json::json;

    const TEST_ROUNDS: u32 = 1000;

    fn store_with(locator: &str, plaintext: &[u8], password: &str) -> MemoryStore {
        let payload = encrypt(plaintext, password, &Pbkdf2Deriver::new(TEST_ROUNDS)).unwrap();
        let store = MemoryStore::new();
        store.insert(locator, payload.to_base64());
        store
    }

    #[tokio::test]
    async fn test_fetch_json() {
        let store = store_with("f.json.enc", br#"{"records":[{"char":"de","freq":3}]}"#, "pw");
        let decryptor = Decryptor::with_iterations(TEST_ROUNDS);

        let value = fetch_and_decrypt_json(&store, &decryptor, "f.json.enc", "pw")
            .await
            .unwrap();
        assert_eq!(value, json!({"records": [{"char": "de", "freq": 3}]}));
    }

    #[tokio::test]
    async fn test_fetch_text() {
        let store = store_with("t.txt.enc", "第一行\n第二行".as_bytes(), "pw");
        let decryptor = Decryptor::with_iterations(TEST_ROUNDS);

        let text = fetch_and_decrypt_text(&store, &decryptor, "t.txt.enc", "pw")
            .await
            .unwrap();
        assert_eq!(text, "第一行\n第二行");
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let store = store_with("t.txt.enc", &[0xe4, 0xbd, 0xa0, 0xff], "pw");
        let decryptor = Decryptor::with_iterations(TEST_ROUNDS);

        let text = fetch_and_decrypt_text(&store, &decryptor, "t.txt.enc", "pw")
            .await
            .unwrap();
        assert_eq!(text, "你\u{fffd}");
    }

    #[tokio::test]
    async fn test_garbage_plaintext_is_malformed_json() {
        let store = store_with("f.json.enc", b"not json", "pw");
        let decryptor = Decryptor::with_iterations(TEST_ROUNDS);

        let result = fetch_and_decrypt_json(&store, &decryptor, "f.json.enc", "pw").await;
        assert!(matches!(result, Err(Error::MalformedJson(_))));
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let store = store_with("f.json.enc", b"[]", "pw");
        let decryptor = Decryptor::with_iterations(TEST_ROUNDS);

        let result = fetch_and_decrypt_json(&store, &decryptor, "f.json.enc", "nope").await;
        assert!(matches!(result, Err(Error::DecryptionFailed)));
    }

    #[tokio::test]
    async fn test_missing_blob() {
        let store = MemoryStore::new();
        let decryptor = Decryptor::with_iterations(TEST_ROUNDS);

        let result = fetch_and_decrypt_text(&store, &decryptor, "t.txt.enc", "pw").await;
        assert!(matches!(result, Err(Error::StoreUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_truncated_blob() {
        let store = MemoryStore::new();
        store.insert("t.txt.enc", "QUJD");
        let decryptor = Decryptor::with_iterations(TEST_ROUNDS);

        let result = fetch_and_decrypt_text(&store, &decryptor, "t.txt.enc", "pw").await;
        assert!(matches!(result, Err(Error::MalformedPayload(_))));
    }
}
