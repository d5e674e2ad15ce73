//! # promptvault
//!
//! Data management for a prompt library: version chains, a hash-chained
//! audit log, line diffs, and a portable export bundle.
//!
//! Every prompt is a [`LibraryItem`]. Saving an edit as a new version links
//! items into a chain (`parent_id`/`root_id`/`version_number`), and deleting
//! any link repairs the chain so no survivor ever points at a ghost. Each
//! item additionally carries a chronicle, an append-only log of committed
//! states where every entry's SHA-256 hash covers the previous entry's hash,
//! making history tamper-evident.
//!
//! Workspaces travel as bundles: a JSON envelope around an optionally
//! LZ4-compressed, optionally AES-256-GCM-encrypted, base64 payload holding
//! items, collections, and tags.
//!
//! ## Quick start
//!
//! ```
//! use promptvault::{ExportOptions, LibraryItem, MemoryStore, Vault};
//!
//! # fn main() -> promptvault::Result<()> {
//! let mut vault = Vault::open(MemoryStore::new())?;
//!
//! let item = LibraryItem::new("Greeting", "say hi", "Write a warm greeting");
//! vault.save_item(item.clone())?;
//!
//! // Commit the current state into the tamper-evident chronicle
//! vault.commit_item(&item.id, Some("initial"))?;
//! vault.verify_item(&item.id)?;
//!
//! // Save an edit as version 1.1 of the same chain
//! let edit = LibraryItem::new("Greeting", "say hi", "Write a brief, warm greeting");
//! let v2 = vault.derive_version(&item.id, edit)?;
//! assert_eq!(v2.version_number.as_deref(), Some("1.1"));
//! assert_eq!(vault.version_chain(&item.id).len(), 2);
//!
//! // Export the workspace as a compressed bundle
//! let bundle = vault.export_bundle(&ExportOptions::default())?;
//! assert_eq!(bundle.item_count, 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`vault`] — the workspace coordinator; start here.
//! - [`chain`] — version numbering, chain assembly, deletion repair.
//! - [`chronicle`] — hash-chained commit/rollback/verify.
//! - [`diff`] — line-level LCS diff between prompt texts.
//! - [`bundle`] — export/import codec (compress, encrypt, base64).
//! - [`store`] — persistence backends ([`MemoryStore`], [`JsonFileStore`]).

pub mod bundle;
pub mod chain;
pub mod chronicle;
pub mod compression;
pub mod diff;
pub mod error;
pub mod hashing;
pub mod store;
pub mod types;
pub mod vault;

pub use bundle::{create_bundle, parse_bundle, Bundle, ExportOptions, ImportResult};
pub use chain::{next_version_number, repair_chain_after_deletion, version_chain};
pub use chronicle::{commit, rollback, verify};
pub use diff::{diff_lines, DiffSegment, SegmentKind};
pub use error::{Result, VaultError};
pub use store::{JsonFileStore, LibraryStore, MemoryStore};
pub use types::{
    BundlePayload, ChronicleEntry, ChronicleSnapshot, Collection, LibraryItem, ProcessedWith,
    StagedChanges, Tag,
};
pub use vault::{ImportStats, Vault};
