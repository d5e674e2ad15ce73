//! Content hashing for the chronicle
//!
//! A single leaf utility: the SHA-256 hex digest of arbitrary text. The
//! chronicle chains entries by hashing each snapshot together with its
//! predecessor's hash, and any party can recompute the digest to detect
//! tampering, so the function must be deterministic across platforms.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hex digest of a string
///
/// Returns a 64-character lowercase hexadecimal string. Deterministic: the
/// same input always produces the same digest.
///
/// # Example
///
/// ```rust
/// use promptvault::hashing::digest_hex;
///
/// let hash = digest_hex("hello");
/// assert_eq!(hash.len(), 64);
/// assert_eq!(
///     hash,
///     "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
/// );
/// ```
pub fn digest_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
