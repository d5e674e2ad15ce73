//! LZ4 compression for bundle payloads
//!
//! Uses the size-prepended framing from `lz4_flex`, so a compressed buffer
//! carries its own decompressed length. Compression is best-effort on the
//! export side; the bundle envelope records whether it actually happened,
//! and the import side keys on that flag.

use crate::error::{Result, VaultError};
use lz4_flex::{compress_prepend_size, decompress_size_prepended};

/// Compress a payload, prepending the original size
pub fn compress(data: &[u8]) -> Vec<u8> {
    compress_prepend_size(data)
}

/// Decompress a size-prepended payload
///
/// Returns [`VaultError::Decompression`] if the buffer is truncated,
/// corrupt, or was never LZ4 data to begin with.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    decompress_size_prepended(data)
        .map_err(|e| VaultError::decompression(format!("lz4 decompression failed: {e}")))
}
