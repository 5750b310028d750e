//! Content hashing and encoding helpers for uploaded images

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 digest of the given bytes
///
/// Identical bytes always produce the same key; the result cache relies on it.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let hash = hasher.finalize();

    format!("{hash:x}")
}

/// `data:` URL embedding the bytes as base64
pub fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Base64 of the bytes without the `data:` prefix
pub fn base64_encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}
