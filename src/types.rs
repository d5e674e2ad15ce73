//! Core data types used throughout the promptvault library
//!
//! This module contains the data structures shared across components:
//!
//! - **Library**: [`LibraryItem`], [`ProcessedWith`], [`StagedChanges`] - the
//!   saved prompt artifact and its working overlay
//! - **Chronicle**: [`ChronicleEntry`], [`ChronicleSnapshot`] - the immutable,
//!   hash-chained audit records attached to an item
//! - **Organization**: [`Collection`], [`Tag`] - folders and structured tags
//! - **Bundles**: [`BundlePayload`] - the exportable workspace snapshot
//!
//! All types serialize with camelCase field names so the JSON wire format
//! matches the `.prb` bundle layout produced by earlier generations of the
//! tool; a bundle written by one is readable by the other.
//!
//! ## Examples
//!
//! ```rust
//! use promptvault::types::LibraryItem;
//!
//! let item = LibraryItem::new(
//!     "Email summarizer",
//!     "summarize my emails",
//!     "You are an email summarization assistant...",
//! );
//! assert!(item.is_chain_root());
//! assert_eq!(item.version_number.as_deref(), Some("1.0"));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider/model/mode record attached when a prompt is processed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedWith {
    /// Provider name, e.g. "anthropic"
    pub provider: String,
    /// Model identifier
    pub model: String,
    /// Processing mode, e.g. "standard"
    pub mode: String,
}

/// A saved prompt artifact - the central data model
///
/// Every item belongs to exactly one version chain, identified by `root_id`
/// (or its own id when the item is itself a root). Chain membership is keyed
/// on `root_id` matching, not on walking `parent_id` edges; `parent_id` only
/// records which item this one was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItem {
    /// Unique stable identifier, immutable once created
    pub id: String,
    /// Display title
    pub title: String,
    /// The prompt as the user submitted it
    pub original_prompt: String,
    /// The processed (templatized or expanded) prompt
    pub refactored_prompt: String,
    /// Free-text category label
    #[serde(default)]
    pub category: String,
    /// Complexity label assigned during processing
    #[serde(default)]
    pub complexity: String,
    /// Ordered free-text labels
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Provider/model/mode the prompt was processed with
    #[serde(default)]
    pub processed_with: ProcessedWith,
    /// true when created via the expand flow rather than templatize
    #[serde(default)]
    pub is_generated: bool,

    /// Id of the item this was derived from (None for a chain root)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Id of the chain's root item (None when this item is the root)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_id: Option<String>,
    /// "major.minor" version string, e.g. "1.0", "1.1", "2.0"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_number: Option<String>,

    /// Append-only, hash-chained audit records (see [`crate::chronicle`])
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chronicle: Vec<ChronicleEntry>,
    /// Uncommitted edits; cleared by a chronicle commit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staged_changes: Option<StagedChanges>,

    /// Collection (folder) this item belongs to - weak reference by id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    /// Structured tag references - weak references by id
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_ids: Vec<String>,
}

impl LibraryItem {
    /// Create a new self-rooted item at version "1.0" with a fresh id
    pub fn new(
        title: impl Into<String>,
        original_prompt: impl Into<String>,
        refactored_prompt: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            original_prompt: original_prompt.into(),
            refactored_prompt: refactored_prompt.into(),
            category: String::new(),
            complexity: String::new(),
            tags: Vec::new(),
            created_at: Utc::now(),
            processed_with: ProcessedWith::default(),
            is_generated: false,
            parent_id: None,
            root_id: None,
            version_number: Some("1.0".to_string()),
            chronicle: Vec::new(),
            staged_changes: None,
            collection_id: None,
            tag_ids: Vec::new(),
        }
    }

    /// Id of the version chain this item belongs to: its `root_id` when
    /// present, otherwise its own id (the item is its own root)
    pub fn chain_root_id(&self) -> &str {
        self.root_id.as_deref().unwrap_or(&self.id)
    }

    /// Whether this item heads a version chain
    pub fn is_chain_root(&self) -> bool {
        self.parent_id.is_none() || self.id == *self.chain_root_id()
    }
}

/// Working changes staged on an item before the next chronicle commit
///
/// A partial overlay over the four snapshot fields. Committing freezes the
/// item's *live* fields, not this overlay; the overlay is simply discarded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refactored_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// The frozen subset of an item's fields captured at one chronicle commit
///
/// Field order matters: the chronicle entry hash is computed over the
/// canonical JSON serialization of this struct (plus the parent hash), so
/// reordering fields would change every hash. See [`crate::chronicle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChronicleSnapshot {
    pub original_prompt: String,
    pub refactored_prompt: String,
    pub tags: Vec<String>,
    pub category: String,
}

/// A single immutable entry in an item's chronicle
///
/// Entries are created only by an explicit commit and are never mutated or
/// removed. `parent_hash` links each entry to its predecessor, forming a
/// tamper-evident hash chain: recomputing `hash` over `{snapshot,
/// parent_hash}` must reproduce the stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChronicleEntry {
    /// SHA-256 hex digest of the snapshot + parent hash
    pub hash: String,
    /// When this entry was committed
    pub timestamp: DateTime<Utc>,
    /// Optional human-readable commit note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Hash of the previous chronicle entry (None for the first entry)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_hash: Option<String>,
    /// The frozen field values at commit time
    pub snapshot: ChronicleSnapshot,
}

/// A user-created folder for organizing library items
///
/// Collections form a forest via `parent_id`. Items reference collections by
/// id only; deleting a collection must never leave a dangling required
/// reference, only an absent optional one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    /// Parent collection id for nesting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Hex color for the collection badge, e.g. "#6366f1"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Emoji or icon identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A reusable tag with a fixed color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    /// Hex color for the tag pill, e.g. "#10b981"
    pub color: String,
}

/// Full workspace snapshot serialized inside a bundle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundlePayload {
    #[serde(default)]
    pub items: Vec<LibraryItem>,
    #[serde(default)]
    pub collections: Vec<Collection>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_root_id() {
        let mut item = LibraryItem::new("t", "o", "r");
        assert_eq!(item.chain_root_id(), item.id);
        assert!(item.is_chain_root());

        item.root_id = Some("root-1".to_string());
        item.parent_id = Some("parent-1".to_string());
        assert_eq!(item.chain_root_id(), "root-1");
        assert!(!item.is_chain_root());
    }

    #[test]
    fn test_item_wire_format_is_camel_case() {
        let item = LibraryItem::new("Title", "orig", "refactored");
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("originalPrompt").is_some());
        assert!(json.get("refactoredPrompt").is_some());
        assert!(json.get("createdAt").is_some());
        // Empty optional chain fields are omitted from the wire format
        assert!(json.get("parentId").is_none());
        assert!(json.get("rootId").is_none());
    }

    #[test]
    fn test_item_deserializes_with_missing_optionals() {
        let json = r#"{
            "id": "1700000000-test",
            "title": "Legacy",
            "originalPrompt": "o",
            "refactoredPrompt": "r",
            "createdAt": "2024-01-15T10:00:00Z"
        }"#;
        let item: LibraryItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "1700000000-test");
        assert!(item.chronicle.is_empty());
        assert!(item.version_number.is_none());
        assert!(item.tag_ids.is_empty());
    }
}
