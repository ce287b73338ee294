//! API key generation and digesting
//!
//! This module provides the key codec: generating new bearer keys, deriving
//! the one-way digest stored in the database, and deriving the short display
//! prefix. Keys carry 256 bits of CSPRNG entropy, so the digest is a plain
//! unsalted SHA-256; the plaintext cannot be recovered from it.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

/// Tag prepended to every issued key
pub const KEY_TAG: &str = "nm_";

/// Number of random bytes behind each key
pub const KEY_RANDOM_BYTES: usize = 32;

/// Length of the non-secret display prefix (includes the tag)
pub const KEY_PREFIX_LEN: usize = 8;

/// Length of the encoded random portion (unpadded URL-safe base64 of 32 bytes)
pub const KEY_ENCODED_LEN: usize = 43;

/// A freshly issued key with its derived storage fields.
///
/// `plaintext` is handed to the caller exactly once and must never be
/// persisted or logged.
pub struct IssuedKey {
    pub plaintext: String,
    pub digest: String,
    pub prefix: String,
}

/// Generates a new API key: the fixed tag followed by 32 CSPRNG bytes
/// encoded as unpadded URL-safe base64.
///
/// `OsRng` aborts the process if the operating system RNG is unavailable;
/// there is no recoverable failure mode here.
pub fn generate_key() -> String {
    let mut bytes = [0u8; KEY_RANDOM_BYTES];
    OsRng.fill_bytes(&mut bytes);
    format!("{KEY_TAG}{}", URL_SAFE_NO_PAD.encode(bytes))
}

/// Computes the SHA-256 digest of a key as lowercase hex.
///
/// Deterministic: equal inputs always produce equal digests. This is the
/// only form in which keys are stored or compared.
pub fn digest_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Returns the leading characters of a key, safe to display and store.
///
/// Used for recognition in dashboards only; verification never consults it.
pub fn display_prefix(key: &str) -> String {
    key.chars().take(KEY_PREFIX_LEN).collect()
}

/// Generates a key and derives its storage fields in one step.
pub fn issue_key() -> IssuedKey {
    let plaintext = generate_key();
    let digest = digest_key(&plaintext);
    let prefix = display_prefix(&plaintext);
    IssuedKey {
        plaintext,
        digest,
        prefix,
    }
}
