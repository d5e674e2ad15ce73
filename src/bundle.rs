//! Portable bundle export/import
//!
//! A bundle is a single JSON document carrying a full workspace snapshot
//! (items, collections, tags) through an optional compress and encrypt
//! pipeline:
//!
//! ```text
//! payload JSON -> [lz4] -> [AES-256-GCM] -> base64 -> envelope
//! ```
//!
//! The envelope records which stages actually ran; the import side reverses
//! exactly those stages and nothing else. Encryption keys are derived from
//! the user's password with PBKDF2-HMAC-SHA256 and a random per-bundle salt,
//! and the GCM nonce is random per bundle as well, so re-exporting the same
//! library twice never produces the same ciphertext.
//!
//! Decoding also accepts the legacy pre-envelope format where the payload
//! was a bare item array with no collections or tags.

use crate::compression;
use crate::error::{Result, VaultError};
use crate::types::{BundlePayload, LibraryItem};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

/// Envelope format version written by this implementation
pub const BUNDLE_VERSION: &str = "1.0";

/// PBKDF2-HMAC-SHA256 iteration count for key derivation
const PBKDF2_ITERATIONS: u32 = 100_000;
/// Random salt length in bytes
const SALT_SIZE: usize = 16;
/// AES-GCM nonce length in bytes
const NONCE_SIZE: usize = 12;
/// AES-256 key length in bytes
const KEY_SIZE: usize = 32;

/// The outer bundle envelope as written to disk or the clipboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Envelope format version, currently "1.0"
    pub version: String,
    /// When the bundle was exported
    pub created: DateTime<Utc>,
    /// Number of library items inside, readable without decoding
    pub item_count: usize,
    /// Whether the payload is AES-256-GCM encrypted
    #[serde(default)]
    pub encrypted: bool,
    /// Whether the payload is LZ4 compressed (under the encryption, if any)
    #[serde(default)]
    pub compressed: bool,
    /// Base64 PBKDF2 salt; present iff `encrypted`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
    /// Base64 GCM nonce; present iff `encrypted`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iv: Option<String>,
    /// The base64 payload after all enabled stages
    pub payload: String,
}

impl Bundle {
    /// Serialize the envelope to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Knobs for [`create_bundle`]
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// LZ4-compress the payload (on by default)
    pub compress: bool,
    /// Encrypt the payload; ignored unless `password` is also set
    pub encrypt: bool,
    /// Password for key derivation
    pub password: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            compress: true,
            encrypt: false,
            password: None,
        }
    }
}

/// A decoded bundle: the workspace snapshot plus the envelope it came in
#[derive(Debug, Clone)]
pub struct ImportResult {
    /// The decoded workspace snapshot
    pub payload: BundlePayload,
    /// The envelope, for metadata such as `created` and `item_count`
    pub bundle: Bundle,
}

/// Either payload shape a bundle may carry. Legacy exports wrote the item
/// array directly, without collections or tags.
#[derive(Deserialize)]
#[serde(untagged)]
enum PayloadShape {
    Full(BundlePayload),
    Legacy(Vec<LibraryItem>),
}

/// Build a bundle envelope around a workspace snapshot
///
/// Compression and encryption each run only when requested, and encryption
/// additionally requires a password; the envelope flags record what actually
/// ran, never what was merely asked for.
pub fn create_bundle(payload: &BundlePayload, options: &ExportOptions) -> Result<Bundle> {
    let mut data = serde_json::to_vec(payload)?;

    let compressed = options.compress;
    if compressed {
        data = compression::compress(&data);
    }

    let encrypting = options.encrypt && options.password.is_some();
    let mut salt = None;
    let mut iv = None;
    if encrypting {
        // password presence checked just above
        let password = options.password.as_deref().unwrap_or_default();
        let (ciphertext, salt_bytes, nonce_bytes) = encrypt(&data, password)?;
        data = ciphertext;
        salt = Some(BASE64.encode(salt_bytes));
        iv = Some(BASE64.encode(nonce_bytes));
    }

    debug!(
        items = payload.items.len(),
        compressed, encrypted = encrypting,
        "created bundle"
    );

    Ok(Bundle {
        version: BUNDLE_VERSION.to_string(),
        created: Utc::now(),
        item_count: payload.items.len(),
        encrypted: encrypting,
        compressed,
        salt,
        iv,
        payload: BASE64.encode(&data),
    })
}

/// Decode a bundle back into a workspace snapshot
///
/// Reverses exactly the stages the envelope flags say were applied. Error
/// kinds distinguish the failing stage: [`VaultError::InvalidBundle`] for a
/// malformed envelope, [`VaultError::Base64`] for an undecodable payload,
/// [`VaultError::PasswordRequired`] / [`VaultError::DecryptionFailed`] for
/// the crypto stage, and [`VaultError::Decompression`] for a corrupt
/// compressed stream.
pub fn parse_bundle(text: &str, password: Option<&str>) -> Result<ImportResult> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| VaultError::invalid_bundle(format!("not valid JSON: {e}")))?;

    let Some(object) = value.as_object() else {
        return Err(VaultError::invalid_bundle("not a bundle object"));
    };
    if !object.contains_key("version") || !object.contains_key("payload") {
        return Err(VaultError::invalid_bundle(
            "missing required fields (version, payload)",
        ));
    }

    let bundle: Bundle = serde_json::from_value(value)
        .map_err(|e| VaultError::invalid_bundle(format!("malformed envelope: {e}")))?;

    let mut data = BASE64.decode(&bundle.payload)?;

    if bundle.encrypted {
        let password = password.ok_or(VaultError::PasswordRequired)?;
        let salt = decode_field(bundle.salt.as_deref(), "salt")?;
        let nonce = decode_field(bundle.iv.as_deref(), "iv")?;
        data = decrypt(&data, password, &salt, &nonce)?;
    }

    if bundle.compressed {
        data = compression::decompress(&data)?;
    }

    let json = String::from_utf8(data)?;
    let payload = match serde_json::from_str::<PayloadShape>(&json)
        .map_err(|e| VaultError::invalid_bundle(format!("unrecognized payload: {e}")))?
    {
        PayloadShape::Full(payload) => payload,
        PayloadShape::Legacy(items) => BundlePayload {
            items,
            ..BundlePayload::default()
        },
    };

    debug!(items = payload.items.len(), "parsed bundle");

    Ok(ImportResult { payload, bundle })
}

/// Decode a base64 envelope field that must be present when `encrypted`
fn decode_field(field: Option<&str>, name: &str) -> Result<Vec<u8>> {
    let encoded = field
        .ok_or_else(|| VaultError::invalid_bundle(format!("encrypted bundle missing {name}")))?;
    Ok(BASE64.decode(encoded)?)
}

/// Derive an AES-256 key from a password and salt
fn derive_key(password: &str, salt: &[u8]) -> [u8; KEY_SIZE] {
    let mut key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    key
}

/// Encrypt a payload with a fresh random salt and nonce
fn encrypt(data: &[u8], password: &str) -> Result<(Vec<u8>, [u8; SALT_SIZE], [u8; NONCE_SIZE])> {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);

    let key = derive_key(password, &salt);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, data)
        .map_err(|e| VaultError::encryption(format!("AES-GCM encryption failed: {e}")))?;

    Ok((ciphertext, salt, nonce_bytes))
}

/// Decrypt a payload. Any authentication failure, whether a wrong password
/// or tampered ciphertext, surfaces as [`VaultError::DecryptionFailed`].
fn decrypt(data: &[u8], password: &str, salt: &[u8], nonce_bytes: &[u8]) -> Result<Vec<u8>> {
    if nonce_bytes.len() != NONCE_SIZE {
        return Err(VaultError::invalid_bundle("iv has the wrong length"));
    }

    let key = derive_key(password, salt);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
    let nonce = Nonce::from_slice(nonce_bytes);

    cipher
        .decrypt(nonce, data)
        .map_err(|_| VaultError::DecryptionFailed)
}
