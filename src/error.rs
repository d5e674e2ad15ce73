//! Error types for the promptvault library
//!
//! This module defines all error types that can occur during vault operations.
//! Bundle-decoding errors are deliberately fine-grained so callers can tell an
//! unreadable file, a missing password, a wrong password, and a corrupt
//! compressed payload apart. Chain operations never error; they fall back to
//! documented defaults instead.

use thiserror::Error;

/// Type alias for Results in the promptvault library
pub type Result<T> = std::result::Result<T, VaultError>;

/// Main error type for all vault operations
#[derive(Debug, Error)]
pub enum VaultError {
    /// I/O errors from the persistence layer
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bundle envelope failed validation (not JSON, missing fields, ...)
    #[error("Invalid bundle: {0}")]
    InvalidBundle(String),

    /// Bundle payload (or salt/IV) is not valid base64
    #[error("Invalid bundle payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Bundle is encrypted and no password was supplied
    #[error("This bundle is encrypted; a password is required")]
    PasswordRequired,

    /// Authenticated decryption failed. Wrong password and tampered
    /// ciphertext are indistinguishable by design of AES-GCM.
    #[error("Decryption failed (wrong password or corrupted bundle)")]
    DecryptionFailed,

    /// Encryption of a bundle payload failed
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Decompression of a bundle payload failed
    #[error("Decompression failed: {0}; bundle may be corrupt")]
    Decompression(String),

    /// Decoded bundle payload is not valid UTF-8
    #[error("Bundle payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// A chronicle entry does not match its recomputed hash or its
    /// predecessor's hash
    #[error("Chronicle entry {index} violates the hash chain: {reason}")]
    ChronicleViolation {
        /// Zero-based index of the offending entry
        index: usize,
        /// What failed to match
        reason: String,
    },

    /// Chronicle entry not found on the addressed item
    #[error("Chronicle entry not found: {0}")]
    EntryNotFound(String),

    /// Library item not found when addressed by id through the vault.
    /// Read-only chain lookups return empty results instead of this error.
    #[error("Library item not found: {0}")]
    ItemNotFound(String),

    /// Persistence collaborator errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl VaultError {
    /// Create an invalid-bundle error with a custom message
    pub fn invalid_bundle(msg: impl Into<String>) -> Self {
        VaultError::InvalidBundle(msg.into())
    }

    /// Create an encryption error with a custom message
    pub fn encryption(msg: impl Into<String>) -> Self {
        VaultError::Encryption(msg.into())
    }

    /// Create a decompression error with a custom message
    pub fn decompression(msg: impl Into<String>) -> Self {
        VaultError::Decompression(msg.into())
    }

    /// Create a storage error with a custom message
    pub fn storage(msg: impl Into<String>) -> Self {
        VaultError::Storage(msg.into())
    }

    /// Check if this error indicates corrupted or tampered data
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            VaultError::DecryptionFailed
                | VaultError::Decompression(_)
                | VaultError::ChronicleViolation { .. }
        )
    }

    /// Check if supplying (the correct) password could resolve this error
    pub fn needs_password(&self) -> bool {
        matches!(
            self,
            VaultError::PasswordRequired | VaultError::DecryptionFailed
        )
    }
}
