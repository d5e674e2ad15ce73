//! The vault: in-memory workspace state plus a persistence collaborator
//!
//! `Vault` owns the loaded items, collections, and tags, and routes every
//! mutation through its [`LibraryStore`] so memory and storage never drift.
//! There is exactly one instance per workspace and no global state; embed it
//! wherever the application keeps its state.
//!
//! Deletion is where the invariants live: deleting an item runs the chain
//! repair before anything is persisted, deleting a collection re-parents its
//! children and releases its member items, and deleting a tag strips the id
//! from any item still referencing it. No deletion leaves a dangling
//! reference behind.

use crate::bundle::{self, Bundle, ExportOptions};
use crate::chain;
use crate::chronicle;
use crate::error::{Result, VaultError};
use crate::store::LibraryStore;
use crate::types::{BundlePayload, Collection, LibraryItem, StagedChanges, Tag};
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

/// Outcome of a merge import, per record family
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// Items added (ids not already present)
    pub items_added: usize,
    /// Items skipped because their id already existed
    pub items_skipped: usize,
    /// Collections added
    pub collections_added: usize,
    /// Tags added
    pub tags_added: usize,
}

/// Workspace coordinator over a [`LibraryStore`]
#[derive(Debug)]
pub struct Vault<S: LibraryStore> {
    store: S,
    items: Vec<LibraryItem>,
    collections: Vec<Collection>,
    tags: Vec<Tag>,
}

impl<S: LibraryStore> Vault<S> {
    /// Open a vault, loading the full workspace from the store
    pub fn open(store: S) -> Result<Self> {
        let items = store.load_items()?;
        let collections = store.load_collections()?;
        let tags = store.load_tags()?;
        info!(
            items = items.len(),
            collections = collections.len(),
            tags = tags.len(),
            "opened vault"
        );
        Ok(Self {
            store,
            items,
            collections,
            tags,
        })
    }

    /// All loaded items
    pub fn items(&self) -> &[LibraryItem] {
        &self.items
    }

    /// All loaded collections
    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    /// All loaded tags
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Look up an item by id
    pub fn get_item(&self, id: &str) -> Option<&LibraryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn require_item(&self, id: &str) -> Result<&LibraryItem> {
        self.get_item(id)
            .ok_or_else(|| VaultError::ItemNotFound(id.to_string()))
    }

    /// Insert or update an item, matched by id
    pub fn save_item(&mut self, item: LibraryItem) -> Result<()> {
        self.store.save_item(&item)?;
        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
        Ok(())
    }

    /// Save `item` as a new version derived from `parent_id`
    ///
    /// Links the chain fields and assigns the next version number; all other
    /// fields of `item` are kept as given. Returns the saved item.
    pub fn derive_version(&mut self, parent_id: &str, mut item: LibraryItem) -> Result<LibraryItem> {
        let parent = self.require_item(parent_id)?;
        item.parent_id = Some(parent.id.clone());
        item.root_id = Some(parent.chain_root_id().to_string());
        item.version_number = Some(chain::next_version_number(
            parent.version_number.as_deref().unwrap_or("1.0"),
        ));
        debug!(
            parent = %parent_id,
            version = item.version_number.as_deref().unwrap_or(""),
            "derived new version"
        );
        self.save_item(item.clone())?;
        Ok(item)
    }

    /// Duplicate an item as a fresh, self-rooted copy
    ///
    /// The copy gets a new id, a "Copy of" title, the current timestamp, and
    /// version "1.0" with no chain links; everything else, chronicle
    /// included, carries over.
    pub fn duplicate_item(&mut self, id: &str) -> Result<LibraryItem> {
        let source = self.require_item(id)?;
        let mut copy = source.clone();
        copy.id = Uuid::new_v4().to_string();
        copy.title = format!("Copy of {}", source.title);
        copy.created_at = Utc::now();
        copy.parent_id = None;
        copy.root_id = None;
        copy.version_number = Some("1.0".to_string());
        self.save_item(copy.clone())?;
        Ok(copy)
    }

    /// Delete an item and repair its version chain
    ///
    /// An unknown id is a no-op. The repaired library replaces the stored
    /// one wholesale, so re-parented survivors persist in the same write.
    pub fn delete_item(&mut self, id: &str) -> Result<()> {
        let Some(deleted) = self.get_item(id).cloned() else {
            return Ok(());
        };
        let repaired = chain::repair_chain_after_deletion(&deleted, &self.items);
        self.store.replace_items(&repaired)?;
        self.items = repaired;
        debug!(item = %id, "deleted item and repaired chain");
        Ok(())
    }

    /// The ordered version chain an item belongs to
    pub fn version_chain(&self, item_id: &str) -> Vec<LibraryItem> {
        chain::version_chain(item_id, &self.items)
    }

    /// Stage a partial overlay of changes on an item without committing
    pub fn stage_changes(&mut self, id: &str, changes: StagedChanges) -> Result<()> {
        let mut item = self.require_item(id)?.clone();
        item.staged_changes = Some(changes);
        self.save_item(item)
    }

    /// Commit an item's current fields as a new chronicle entry
    pub fn commit_item(&mut self, id: &str, note: Option<&str>) -> Result<LibraryItem> {
        let item = self.require_item(id)?;
        let committed = chronicle::commit(item, note)?;
        self.save_item(committed.clone())?;
        Ok(committed)
    }

    /// Roll an item back to the chronicle entry with the given hash
    pub fn rollback_item(&mut self, id: &str, entry_hash: &str) -> Result<LibraryItem> {
        let item = self.require_item(id)?;
        let entry = item
            .chronicle
            .iter()
            .find(|entry| entry.hash == entry_hash)
            .ok_or_else(|| VaultError::EntryNotFound(entry_hash.to_string()))?;
        let rolled = chronicle::rollback(item, entry);
        self.save_item(rolled.clone())?;
        Ok(rolled)
    }

    /// Verify an item's chronicle hash chain
    pub fn verify_item(&self, id: &str) -> Result<()> {
        chronicle::verify(self.require_item(id)?)
    }

    /// Create a collection
    pub fn create_collection(
        &mut self,
        name: impl Into<String>,
        parent_id: Option<String>,
    ) -> Result<Collection> {
        let collection = Collection {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            parent_id,
            color: None,
            icon: None,
            created_at: Utc::now(),
        };
        self.collections.push(collection.clone());
        self.store.save_collections(&self.collections)?;
        Ok(collection)
    }

    /// Update a collection in place, matched by id
    pub fn update_collection(&mut self, collection: Collection) -> Result<()> {
        match self
            .collections
            .iter_mut()
            .find(|existing| existing.id == collection.id)
        {
            Some(existing) => *existing = collection,
            None => return Err(VaultError::ItemNotFound(collection.id)),
        }
        self.store.save_collections(&self.collections)
    }

    /// Delete a collection, re-parenting children and releasing members
    ///
    /// Child collections move up to the deleted one's parent; items in the
    /// collection lose their `collection_id`. Unknown id is a no-op.
    pub fn delete_collection(&mut self, id: &str) -> Result<()> {
        let Some(position) = self.collections.iter().position(|c| c.id == id) else {
            return Ok(());
        };
        let deleted = self.collections.remove(position);

        for collection in &mut self.collections {
            if collection.parent_id.as_deref() == Some(id) {
                collection.parent_id = deleted.parent_id.clone();
            }
        }
        self.store.save_collections(&self.collections)?;

        let mut released = false;
        for item in &mut self.items {
            if item.collection_id.as_deref() == Some(id) {
                item.collection_id = None;
                released = true;
            }
        }
        if released {
            self.store.replace_items(&self.items)?;
        }
        debug!(collection = %id, "deleted collection");
        Ok(())
    }

    /// Create a tag
    pub fn create_tag(
        &mut self,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<Tag> {
        let tag = Tag {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            color: color.into(),
        };
        self.tags.push(tag.clone());
        self.store.save_tags(&self.tags)?;
        Ok(tag)
    }

    /// Delete a tag and strip its id from any item referencing it
    pub fn delete_tag(&mut self, id: &str) -> Result<()> {
        let before = self.tags.len();
        self.tags.retain(|tag| tag.id != id);
        if self.tags.len() == before {
            return Ok(());
        }
        self.store.save_tags(&self.tags)?;

        let mut stripped = false;
        for item in &mut self.items {
            let count = item.tag_ids.len();
            item.tag_ids.retain(|tag_id| tag_id != id);
            stripped |= item.tag_ids.len() != count;
        }
        if stripped {
            self.store.replace_items(&self.items)?;
        }
        Ok(())
    }

    /// Export the whole workspace as a bundle
    pub fn export_bundle(&self, options: &ExportOptions) -> Result<Bundle> {
        let payload = BundlePayload {
            items: self.items.clone(),
            collections: self.collections.clone(),
            tags: self.tags.clone(),
        };
        bundle::create_bundle(&payload, options)
    }

    /// Import a bundle, merging by id and skipping records already present
    pub fn import_bundle(&mut self, text: &str, password: Option<&str>) -> Result<ImportStats> {
        let imported = bundle::parse_bundle(text, password)?;
        let mut stats = ImportStats::default();

        for item in imported.payload.items {
            if self.get_item(&item.id).is_some() {
                stats.items_skipped += 1;
            } else {
                self.items.push(item);
                stats.items_added += 1;
            }
        }
        for collection in imported.payload.collections {
            if !self.collections.iter().any(|c| c.id == collection.id) {
                self.collections.push(collection);
                stats.collections_added += 1;
            }
        }
        for tag in imported.payload.tags {
            if !self.tags.iter().any(|t| t.id == tag.id) {
                self.tags.push(tag);
                stats.tags_added += 1;
            }
        }

        self.store.replace_items(&self.items)?;
        self.store.save_collections(&self.collections)?;
        self.store.save_tags(&self.tags)?;
        info!(
            added = stats.items_added,
            skipped = stats.items_skipped,
            "imported bundle"
        );
        Ok(stats)
    }
}
