//! The chronicle: a per-item, append-only, hash-chained audit log
//!
//! Each commit freezes the item's four tracked fields (original prompt,
//! refactored prompt, tags, category) into a [`ChronicleSnapshot`] and
//! appends a [`ChronicleEntry`] whose hash covers both the snapshot and the
//! previous entry's hash. Entries are never edited or removed, so the chain
//! is tamper-evident: recomputing every digest must reproduce the stored
//! hashes, and [`verify`] does exactly that.
//!
//! Rollback restores the live fields from a past snapshot without touching
//! the chronicle itself - the log keeps recording states the item is no
//! longer in, and the rollback is not itself audited.
//!
//! ## Hash input encoding
//!
//! The byte sequence hashed for each entry is the JSON serialization of the
//! snapshot fields followed by the parent hash, in exactly this order:
//!
//! ```json
//! {"originalPrompt":...,"refactoredPrompt":...,"tags":[...],"category":...,"parentHash":...}
//! ```
//!
//! with `parentHash` as the empty string for the first entry. Serde emits
//! struct fields in declaration order, which pins the encoding; hashes are
//! therefore reproducible across implementations that serialize the same
//! way.

use crate::error::{Result, VaultError};
use crate::hashing::digest_hex;
use crate::types::{ChronicleEntry, ChronicleSnapshot, LibraryItem};
use chrono::Utc;
use serde::Serialize;
use tracing::debug;

/// The exact structure hashed for one chronicle entry. Field order is part
/// of the wire contract - do not reorder.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HashInput<'a> {
    original_prompt: &'a str,
    refactored_prompt: &'a str,
    tags: &'a [String],
    category: &'a str,
    parent_hash: &'a str,
}

/// Compute the content hash for a snapshot chained onto `parent_hash`
pub fn entry_hash(snapshot: &ChronicleSnapshot, parent_hash: Option<&str>) -> Result<String> {
    let input = HashInput {
        original_prompt: &snapshot.original_prompt,
        refactored_prompt: &snapshot.refactored_prompt,
        tags: &snapshot.tags,
        category: &snapshot.category,
        parent_hash: parent_hash.unwrap_or(""),
    };
    let encoded = serde_json::to_string(&input)?;
    Ok(digest_hex(&encoded))
}

/// Commit the item's current live fields as a new chronicle entry
///
/// The snapshot is taken from the live fields, not from `staged_changes` -
/// committing freezes whatever the item currently holds, and the staged
/// overlay is discarded. Returns a new item with the entry appended; the
/// input is not modified.
pub fn commit(item: &LibraryItem, note: Option<&str>) -> Result<LibraryItem> {
    let snapshot = ChronicleSnapshot {
        original_prompt: item.original_prompt.clone(),
        refactored_prompt: item.refactored_prompt.clone(),
        tags: item.tags.clone(),
        category: item.category.clone(),
    };

    let parent_hash = item.chronicle.last().map(|entry| entry.hash.clone());
    let hash = entry_hash(&snapshot, parent_hash.as_deref())?;

    debug!(item = %item.id, hash = %&hash[..8], "committed chronicle entry");

    let entry = ChronicleEntry {
        hash,
        timestamp: Utc::now(),
        note: note.map(String::from),
        parent_hash,
        snapshot,
    };

    let mut updated = item.clone();
    updated.chronicle.push(entry);
    updated.staged_changes = None;
    Ok(updated)
}

/// Restore the item's live fields from a past chronicle entry
///
/// Overwrites the four tracked fields from `entry.snapshot` and leaves the
/// chronicle untouched. Does not validate that `entry` belongs to the item's
/// chronicle - that is the caller's responsibility (the vault checks when
/// addressing entries by hash).
pub fn rollback(item: &LibraryItem, entry: &ChronicleEntry) -> LibraryItem {
    let mut updated = item.clone();
    updated.original_prompt = entry.snapshot.original_prompt.clone();
    updated.refactored_prompt = entry.snapshot.refactored_prompt.clone();
    updated.tags = entry.snapshot.tags.clone();
    updated.category = entry.snapshot.category.clone();
    updated
}

/// Verify the integrity of an item's chronicle
///
/// Recomputes every entry's hash and checks parent linkage. Returns
/// [`VaultError::ChronicleViolation`] naming the first offending entry, or
/// `Ok(())` for an intact (possibly empty) chronicle.
pub fn verify(item: &LibraryItem) -> Result<()> {
    let mut expected_parent: Option<&str> = None;

    for (index, entry) in item.chronicle.iter().enumerate() {
        if entry.parent_hash.as_deref() != expected_parent {
            return Err(VaultError::ChronicleViolation {
                index,
                reason: format!(
                    "parent hash {:?} does not match preceding entry {:?}",
                    entry.parent_hash, expected_parent
                ),
            });
        }

        let recomputed = entry_hash(&entry.snapshot, entry.parent_hash.as_deref())?;
        if recomputed != entry.hash {
            return Err(VaultError::ChronicleViolation {
                index,
                reason: format!("stored hash {} != recomputed {}", entry.hash, recomputed),
            });
        }

        expected_parent = Some(entry.hash.as_str());
    }

    Ok(())
}
