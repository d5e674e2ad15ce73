//! Persistence backends for the vault
//!
//! [`LibraryStore`] is the seam between the vault's in-memory state and
//! whatever holds it at rest. [`MemoryStore`] backs tests and ephemeral
//! sessions; [`JsonFileStore`] keeps each record family in its own JSON
//! file under a root directory, writing through a temp-file rename so a
//! crash mid-write never leaves a half-written file behind.
//!
//! `JsonFileStore` also performs a one-time migration: if no items file
//! exists but a legacy `library-v3.json` (a bare item array) does, its
//! contents become the initial items file. The legacy file is left in
//! place, and the migration never runs again once `items.json` exists.

use crate::error::{Result, VaultError};
use crate::types::{Collection, LibraryItem, Tag};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name for the items record family
const ITEMS_FILE: &str = "items.json";
/// File name for collections
const COLLECTIONS_FILE: &str = "collections.json";
/// File name for tags
const TAGS_FILE: &str = "tags.json";
/// File name for the settings key/value map
const SETTINGS_FILE: &str = "settings.json";
/// Legacy single-file library, migrated into `items.json` on first open
const LEGACY_LIBRARY_FILE: &str = "library-v3.json";

/// Storage seam between the vault and its data at rest
pub trait LibraryStore {
    /// Load all library items
    fn load_items(&self) -> Result<Vec<LibraryItem>>;

    /// Insert or update a single item, matched by id
    fn save_item(&mut self, item: &LibraryItem) -> Result<()>;

    /// Remove a single item by id. Removing an absent id is not an error.
    fn delete_item(&mut self, id: &str) -> Result<()>;

    /// Replace the entire item set at once (bulk rewrites after chain
    /// repair or a merge import)
    fn replace_items(&mut self, items: &[LibraryItem]) -> Result<()>;

    /// Load all collections
    fn load_collections(&self) -> Result<Vec<Collection>>;

    /// Replace the entire collection set
    fn save_collections(&mut self, collections: &[Collection]) -> Result<()>;

    /// Load all tags
    fn load_tags(&self) -> Result<Vec<Tag>>;

    /// Replace the entire tag set
    fn save_tags(&mut self, tags: &[Tag]) -> Result<()>;

    /// Read a settings value
    fn get_setting(&self, key: &str) -> Result<Option<String>>;

    /// Write a settings value
    fn set_setting(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove a settings value. Removing an absent key is not an error.
    fn delete_setting(&mut self, key: &str) -> Result<()>;
}

/// In-memory store for tests and throwaway sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Vec<LibraryItem>,
    collections: Vec<Collection>,
    tags: Vec<Tag>,
    settings: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with items
    pub fn with_items(items: Vec<LibraryItem>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }
}

impl LibraryStore for MemoryStore {
    fn load_items(&self) -> Result<Vec<LibraryItem>> {
        Ok(self.items.clone())
    }

    fn save_item(&mut self, item: &LibraryItem) -> Result<()> {
        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item.clone(),
            None => self.items.push(item.clone()),
        }
        Ok(())
    }

    fn delete_item(&mut self, id: &str) -> Result<()> {
        self.items.retain(|item| item.id != id);
        Ok(())
    }

    fn replace_items(&mut self, items: &[LibraryItem]) -> Result<()> {
        self.items = items.to_vec();
        Ok(())
    }

    fn load_collections(&self) -> Result<Vec<Collection>> {
        Ok(self.collections.clone())
    }

    fn save_collections(&mut self, collections: &[Collection]) -> Result<()> {
        self.collections = collections.to_vec();
        Ok(())
    }

    fn load_tags(&self) -> Result<Vec<Tag>> {
        Ok(self.tags.clone())
    }

    fn save_tags(&mut self, tags: &[Tag]) -> Result<()> {
        self.tags = tags.to_vec();
        Ok(())
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        Ok(self.settings.get(key).cloned())
    }

    fn set_setting(&mut self, key: &str, value: &str) -> Result<()> {
        self.settings.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete_setting(&mut self, key: &str) -> Result<()> {
        self.settings.remove(key);
        Ok(())
    }
}

/// File-backed store: one JSON file per record family under a root directory
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Open (and create if needed) a store rooted at `root`, running the
    /// legacy-library migration if applicable
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let store = Self { root };
        store.migrate_legacy_library()?;
        Ok(store)
    }

    /// Root directory this store writes under
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    /// Read a JSON file, treating a missing file as the default value
    fn read_json<T>(&self, file: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        let path = self.path(file);
        if !path.exists() {
            return Ok(T::default());
        }
        let text = fs::read_to_string(&path)?;
        serde_json::from_str(&text)
            .map_err(|e| VaultError::storage(format!("{}: {e}", path.display())))
    }

    /// Write a JSON file atomically via a temp file and rename
    fn write_json<T: serde::Serialize>(&self, file: &str, value: &T) -> Result<()> {
        let path = self.path(file);
        let tmp = path.with_extension("json.tmp");
        let text = serde_json::to_string_pretty(value)?;
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), "wrote store file");
        Ok(())
    }

    /// Promote a legacy bare-array library file into `items.json`, once
    fn migrate_legacy_library(&self) -> Result<()> {
        let items_path = self.path(ITEMS_FILE);
        let legacy_path = self.path(LEGACY_LIBRARY_FILE);
        if items_path.exists() || !legacy_path.exists() {
            return Ok(());
        }

        let text = fs::read_to_string(&legacy_path)?;
        let items: Vec<LibraryItem> = serde_json::from_str(&text)
            .map_err(|e| VaultError::storage(format!("legacy library unreadable: {e}")))?;
        self.write_json(ITEMS_FILE, &items)?;
        info!(items = items.len(), "migrated legacy library file");
        Ok(())
    }
}

impl LibraryStore for JsonFileStore {
    fn load_items(&self) -> Result<Vec<LibraryItem>> {
        self.read_json(ITEMS_FILE)
    }

    fn save_item(&mut self, item: &LibraryItem) -> Result<()> {
        let mut items = self.load_items()?;
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item.clone(),
            None => items.push(item.clone()),
        }
        self.write_json(ITEMS_FILE, &items)
    }

    fn delete_item(&mut self, id: &str) -> Result<()> {
        let mut items = self.load_items()?;
        items.retain(|item| item.id != id);
        self.write_json(ITEMS_FILE, &items)
    }

    fn replace_items(&mut self, items: &[LibraryItem]) -> Result<()> {
        self.write_json(ITEMS_FILE, &items)
    }

    fn load_collections(&self) -> Result<Vec<Collection>> {
        self.read_json(COLLECTIONS_FILE)
    }

    fn save_collections(&mut self, collections: &[Collection]) -> Result<()> {
        self.write_json(COLLECTIONS_FILE, &collections)
    }

    fn load_tags(&self) -> Result<Vec<Tag>> {
        self.read_json(TAGS_FILE)
    }

    fn save_tags(&mut self, tags: &[Tag]) -> Result<()> {
        self.write_json(TAGS_FILE, &tags)
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let settings: HashMap<String, String> = self.read_json(SETTINGS_FILE)?;
        Ok(settings.get(key).cloned())
    }

    fn set_setting(&mut self, key: &str, value: &str) -> Result<()> {
        let mut settings: HashMap<String, String> = self.read_json(SETTINGS_FILE)?;
        settings.insert(key.to_string(), value.to_string());
        self.write_json(SETTINGS_FILE, &settings)
    }

    fn delete_setting(&mut self, key: &str) -> Result<()> {
        let mut settings: HashMap<String, String> = self.read_json(SETTINGS_FILE)?;
        if settings.remove(key).is_some() {
            self.write_json(SETTINGS_FILE, &settings)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_item_crud() {
        let mut store = MemoryStore::new();
        let item = LibraryItem::new("a", "o", "r");
        store.save_item(&item).unwrap();
        assert_eq!(store.load_items().unwrap().len(), 1);

        let mut updated = item.clone();
        updated.title = "b".to_string();
        store.save_item(&updated).unwrap();
        let items = store.load_items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "b");

        store.delete_item(&item.id).unwrap();
        assert!(store.load_items().unwrap().is_empty());
        // Deleting again is a no-op
        store.delete_item(&item.id).unwrap();
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonFileStore::open(dir.path()).unwrap();

        let item = LibraryItem::new("persisted", "o", "r");
        store.save_item(&item).unwrap();
        store
            .save_tags(&[Tag {
                id: "t1".to_string(),
                name: "draft".to_string(),
                color: "#10b981".to_string(),
            }])
            .unwrap();
        store.set_setting("theme", "dark").unwrap();

        // Reopen from disk
        let reopened = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.load_items().unwrap(), vec![item]);
        assert_eq!(reopened.load_tags().unwrap().len(), 1);
        assert_eq!(
            reopened.get_setting("theme").unwrap().as_deref(),
            Some("dark")
        );
        assert_eq!(reopened.get_setting("missing").unwrap(), None);
    }

    #[test]
    fn test_file_store_missing_files_are_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        assert!(store.load_items().unwrap().is_empty());
        assert!(store.load_collections().unwrap().is_empty());
        assert!(store.load_tags().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_setting_delete() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonFileStore::open(dir.path()).unwrap();
        store.set_setting("k", "v").unwrap();
        store.delete_setting("k").unwrap();
        assert_eq!(store.get_setting("k").unwrap(), None);
        store.delete_setting("never-existed").unwrap();
    }

    #[test]
    fn test_legacy_library_migration() {
        let dir = TempDir::new().unwrap();
        let legacy = vec![LibraryItem::new("old", "o", "r")];
        fs::write(
            dir.path().join(LEGACY_LIBRARY_FILE),
            serde_json::to_string(&legacy).unwrap(),
        )
        .unwrap();

        let store = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(store.load_items().unwrap(), legacy);
        // Legacy file stays put
        assert!(dir.path().join(LEGACY_LIBRARY_FILE).exists());
    }

    #[test]
    fn test_migration_does_not_clobber_existing_items() {
        let dir = TempDir::new().unwrap();
        let current = vec![LibraryItem::new("current", "o", "r")];
        fs::write(
            dir.path().join(ITEMS_FILE),
            serde_json::to_string(&current).unwrap(),
        )
        .unwrap();
        fs::write(
            dir.path().join(LEGACY_LIBRARY_FILE),
            serde_json::to_string(&vec![LibraryItem::new("stale", "o", "r")]).unwrap(),
        )
        .unwrap();

        let store = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(store.load_items().unwrap(), current);
    }

    #[test]
    fn test_corrupt_items_file_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(ITEMS_FILE), "{{{{").unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.load_items(),
            Err(VaultError::Storage(_))
        ));
    }
}
