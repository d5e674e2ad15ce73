//! Version-chain management for library items
//!
//! A version chain is the set of items derived from one another through
//! successive edits. Membership is keyed on `root_id`: every member points at
//! the chain's root item (the root itself has no `root_id`), while
//! `parent_id` records the specific item each version was derived from.
//!
//! The functions here are pure: they take the library as a slice and return
//! new values, never mutating their inputs. Callers persist the results and
//! are responsible for serializing concurrent mutations against the same
//! library.
//!
//! Chain operations never fail. Malformed version strings fall back to
//! `"1.1"`, unknown ids produce empty chains, and deletion repair always
//! yields a structurally valid library.
//!
//! ## Repair on deletion
//!
//! Deleting an item can orphan its descendants. [`repair_chain_after_deletion`]
//! re-parents the deleted item's direct children to its own parent, and when
//! the deleted item was the chain's root, elects the chronologically earliest
//! child as the new root and repoints every remaining member at it. A root
//! deleted with no children leaves any stragglers still referencing it as
//! independent self-rooted items.
//!
//! Repair operates on `root_id` bookkeeping rather than a full tree
//! traversal from parent pointers; a chain whose `root_id` fields have
//! drifted out of sync repairs along the recorded membership instead of the
//! actual derivation tree.

use crate::types::LibraryItem;
use tracing::debug;

/// Compute the next minor version from a parent's `"major.minor"` string
///
/// Any malformed input - empty, wrong segment count, non-numeric parts -
/// falls back to `"1.1"`.
///
/// # Examples
///
/// ```rust
/// use promptvault::chain::next_version_number;
///
/// assert_eq!(next_version_number("1.0"), "1.1");
/// assert_eq!(next_version_number("2.3"), "2.4");
/// assert_eq!(next_version_number(""), "1.1");
/// assert_eq!(next_version_number("abc"), "1.1");
/// ```
pub fn next_version_number(parent_version: &str) -> String {
    let parts: Vec<&str> = parent_version.split('.').collect();
    if parts.len() != 2 {
        return "1.1".to_string();
    }

    match (parts[0].parse::<u64>(), parts[1].parse::<u64>()) {
        (Ok(major), Ok(minor)) => format!("{}.{}", major, minor + 1),
        _ => "1.1".to_string(),
    }
}

/// Collect every item in the same version chain as `item_id`
///
/// The chain is returned as a flat view sorted ascending by `created_at`
/// (oldest first); parent/child edges are not reconstructed here - callers
/// that need tree shape infer it from each item's `parent_id`. Unknown ids
/// return an empty vector.
pub fn version_chain(item_id: &str, library: &[LibraryItem]) -> Vec<LibraryItem> {
    let Some(target) = library.iter().find(|item| item.id == item_id) else {
        return Vec::new();
    };

    let chain_root_id = target.chain_root_id();

    let mut chain: Vec<LibraryItem> = library
        .iter()
        .filter(|item| item.id == chain_root_id || item.root_id.as_deref() == Some(chain_root_id))
        .cloned()
        .collect();

    chain.sort_by_key(|item| item.created_at);
    chain
}

/// Repair a version chain after one of its members is deleted
///
/// Returns a new library with the deleted item removed and the chain
/// relinked; the input slice is never mutated. Re-parenting touches only the
/// deleted item's *direct* children - descendants further down keep their
/// `parent_id` and are reached through `root_id` membership.
pub fn repair_chain_after_deletion(
    deleted: &LibraryItem,
    library: &[LibraryItem],
) -> Vec<LibraryItem> {
    let deleted_id = deleted.id.as_str();
    let chain_root_id = deleted.chain_root_id().to_string();
    let is_root = deleted.is_chain_root();

    let mut result: Vec<LibraryItem> = library
        .iter()
        .filter(|item| item.id != deleted_id)
        .cloned()
        .collect();

    // Re-parent direct children to the deleted item's own parent, which may
    // be absent (promoting them toward the root)
    let mut child_ids: Vec<String> = Vec::new();
    for item in result.iter_mut() {
        if item.parent_id.as_deref() == Some(deleted_id) {
            item.parent_id = deleted.parent_id.clone();
            child_ids.push(item.id.clone());
        }
    }
    if !child_ids.is_empty() {
        debug!(
            deleted = deleted_id,
            children = child_ids.len(),
            "re-parented children of deleted item"
        );
    }

    if is_root && !child_ids.is_empty() {
        // Elect the chronologically earliest child as the new chain root;
        // stable sort keeps library order on created_at ties
        let mut children: Vec<&LibraryItem> = result
            .iter()
            .filter(|item| child_ids.contains(&item.id))
            .collect();
        children.sort_by_key(|item| item.created_at);
        let new_root_id = children.first().map(|item| item.id.clone());

        if let Some(new_root_id) = new_root_id {
            debug!(old_root = deleted_id, new_root = %new_root_id, "elected new chain root");
            for item in result.iter_mut() {
                if item.id == new_root_id {
                    // The new root heads its own chain
                    item.parent_id = None;
                    item.root_id = None;
                } else if item.root_id.as_deref() == Some(chain_root_id.as_str()) {
                    item.root_id = Some(new_root_id.clone());
                }
            }
        }
    } else if is_root {
        // Root deleted with no surviving children: anything still pointing
        // at the old root has no path back to a live one - each becomes an
        // independent self-rooted item
        for item in result.iter_mut() {
            if item.root_id.as_deref() == Some(chain_root_id.as_str()) {
                item.root_id = None;
                item.parent_id = None;
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn item(id: &str, parent_id: Option<&str>, root_id: Option<&str>, age_minutes: i64) -> LibraryItem {
        let mut item = LibraryItem::new(id, "orig", "refactored");
        item.id = id.to_string();
        item.parent_id = parent_id.map(String::from);
        item.root_id = root_id.map(String::from);
        item.created_at = Utc::now() - Duration::minutes(age_minutes);
        item
    }

    #[test]
    fn test_next_version_number() {
        assert_eq!(next_version_number("1.0"), "1.1");
        assert_eq!(next_version_number("2.3"), "2.4");
        assert_eq!(next_version_number("0.0"), "0.1");
        assert_eq!(next_version_number("10.99"), "10.100");
    }

    #[test]
    fn test_next_version_number_fallbacks() {
        assert_eq!(next_version_number(""), "1.1");
        assert_eq!(next_version_number("abc"), "1.1");
        assert_eq!(next_version_number("1"), "1.1");
        assert_eq!(next_version_number("1.2.3"), "1.1");
        assert_eq!(next_version_number("1.x"), "1.1");
        assert_eq!(next_version_number("-1.2"), "1.1");
    }

    #[test]
    fn test_version_chain_membership_and_order() {
        let library = vec![
            item("a", None, None, 30),
            item("b", Some("a"), Some("a"), 20),
            item("c", Some("b"), Some("a"), 10),
            item("unrelated", None, None, 25),
        ];

        // Chain looks identical from any member
        for id in ["a", "b", "c"] {
            let chain = version_chain(id, &library);
            let ids: Vec<&str> = chain.iter().map(|i| i.id.as_str()).collect();
            assert_eq!(ids, ["a", "b", "c"], "from {}", id);
        }
    }

    #[test]
    fn test_version_chain_unknown_id() {
        let library = vec![item("a", None, None, 10)];
        assert!(version_chain("missing", &library).is_empty());
    }

    #[test]
    fn test_version_chain_singleton() {
        let library = vec![item("solo", None, None, 5)];
        let chain = version_chain("solo", &library);
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].id, "solo");
    }

    #[test]
    fn test_repair_deleting_middle_reparents_child() {
        // A(root) -> B -> C; deleting B re-parents C to A
        let library = vec![
            item("a", None, None, 30),
            item("b", Some("a"), Some("a"), 20),
            item("c", Some("b"), Some("a"), 10),
        ];
        let deleted = library[1].clone();

        let repaired = repair_chain_after_deletion(&deleted, &library);
        assert_eq!(repaired.len(), 2);

        let c = repaired.iter().find(|i| i.id == "c").unwrap();
        assert_eq!(c.parent_id.as_deref(), Some("a"));
        assert_eq!(c.root_id.as_deref(), Some("a"));

        let a = repaired.iter().find(|i| i.id == "a").unwrap();
        assert!(a.parent_id.is_none());
        assert!(a.root_id.is_none());
    }

    #[test]
    fn test_repair_deleting_root_elects_earliest_child() {
        // A(root) -> B -> C; deleting A promotes B and repoints C
        let library = vec![
            item("a", None, None, 30),
            item("b", Some("a"), Some("a"), 20),
            item("c", Some("b"), Some("a"), 10),
        ];
        let deleted = library[0].clone();

        let repaired = repair_chain_after_deletion(&deleted, &library);

        let b = repaired.iter().find(|i| i.id == "b").unwrap();
        assert!(b.parent_id.is_none());
        assert!(b.root_id.is_none());

        let c = repaired.iter().find(|i| i.id == "c").unwrap();
        assert_eq!(c.root_id.as_deref(), Some("b"));
        assert_eq!(c.parent_id.as_deref(), Some("b"));
    }

    #[test]
    fn test_repair_root_with_two_children_picks_oldest() {
        let library = vec![
            item("a", None, None, 30),
            item("young", Some("a"), Some("a"), 5),
            item("old", Some("a"), Some("a"), 25),
        ];
        let deleted = library[0].clone();

        let repaired = repair_chain_after_deletion(&deleted, &library);

        let old = repaired.iter().find(|i| i.id == "old").unwrap();
        assert!(old.parent_id.is_none());
        assert!(old.root_id.is_none());

        let young = repaired.iter().find(|i| i.id == "young").unwrap();
        assert_eq!(young.root_id.as_deref(), Some("old"));
    }

    #[test]
    fn test_repair_root_without_children_frees_orphans() {
        // B references A as root but was never A's direct child (drifted
        // bookkeeping); deleting A leaves B self-rooted
        let library = vec![
            item("a", None, None, 30),
            item("b", Some("gone"), Some("a"), 20),
        ];
        let deleted = library[0].clone();

        let repaired = repair_chain_after_deletion(&deleted, &library);
        let b = repaired.iter().find(|i| i.id == "b").unwrap();
        assert!(b.parent_id.is_none());
        assert!(b.root_id.is_none());
    }

    #[test]
    fn test_repair_does_not_mutate_input() {
        let library = vec![
            item("a", None, None, 30),
            item("b", Some("a"), Some("a"), 20),
        ];
        let snapshot = library.clone();
        let _ = repair_chain_after_deletion(&library[0].clone(), &library);
        assert_eq!(library, snapshot);
    }

    #[test]
    fn test_repair_leaves_other_chains_alone() {
        let library = vec![
            item("a", None, None, 30),
            item("b", Some("a"), Some("a"), 20),
            item("x", None, None, 40),
            item("y", Some("x"), Some("x"), 35),
        ];
        let deleted = library[0].clone();

        let repaired = repair_chain_after_deletion(&deleted, &library);
        let y = repaired.iter().find(|i| i.id == "y").unwrap();
        assert_eq!(y.parent_id.as_deref(), Some("x"));
        assert_eq!(y.root_id.as_deref(), Some("x"));
    }
}
