//! SHA-256 digests
//!
//! Used to derive stable fallback identifiers for assets without a sidecar id.

use sha2::{Digest, Sha256};

/// Compute the bare lowercase hex SHA-256 digest of string content.
pub fn hex_digest(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
