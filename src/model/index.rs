//! Index structures for efficient snapshot lookups.
//!
//! [`CatalogIndex`] is built once per attribution run. Building it resolves
//! every item reference in the snapshot up front, so the walker can follow
//! subcomponent edges without repeated O(edges) scans.
//!
//! # Example
//!
//! ```ignore
//! let index = CatalogIndex::build(&snapshot)?;
//!
//! // O(1) lookup of the edges leaving an item, in declared order
//! for edge in index.children_of(&item.id) {
//!     let child = index.item(&edge.child);
//! }
//! ```

use super::{ChildEdge, Item, ItemId, License, LicenseChoice, ProductSnapshot, Relationship};
use crate::error::{AttributionError, Result};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Precomputed lookups over a [`ProductSnapshot`].
#[derive(Debug, Clone)]
#[must_use]
pub struct CatalogIndex<'a> {
    snapshot: &'a ProductSnapshot,
    /// Items by id
    items: HashMap<&'a ItemId, &'a Item>,
    /// Child edges by parent id, preserving declared order
    edges_by_parent: HashMap<&'a ItemId, Vec<&'a ChildEdge>>,
    /// Licenses by key, in snapshot order
    licenses: IndexMap<&'a str, &'a License>,
}

impl<'a> CatalogIndex<'a> {
    /// Build an index from a snapshot.
    ///
    /// Fails when a relationship or child edge references an item that the
    /// snapshot does not contain. Duplicate item ids or license keys keep the
    /// last definition.
    pub fn build(snapshot: &'a ProductSnapshot) -> Result<Self> {
        let mut items: HashMap<&ItemId, &Item> = HashMap::with_capacity(snapshot.items.len());
        let mut duplicates = 0usize;
        for item in &snapshot.items {
            if items.insert(&item.id, item).is_some() {
                duplicates += 1;
            }
        }
        if duplicates > 0 {
            tracing::warn!(
                duplicates,
                "Snapshot defines {} item id(s) more than once; the last definition wins",
                duplicates
            );
        }

        for relationship in &snapshot.relationships {
            if let Some(id) = relationship.item_id() {
                if !items.contains_key(id) {
                    return Err(AttributionError::dangling_item(
                        id.value(),
                        "a product relationship",
                    ));
                }
            }
        }

        let mut edges_by_parent: HashMap<&ItemId, Vec<&ChildEdge>> = HashMap::new();
        for edge in &snapshot.child_edges {
            for id in [&edge.parent, &edge.child] {
                if !items.contains_key(id) {
                    return Err(AttributionError::dangling_item(
                        id.value(),
                        format!("child edge {} -> {}", edge.parent, edge.child),
                    ));
                }
            }
            edges_by_parent.entry(&edge.parent).or_default().push(edge);
        }

        let licenses = snapshot
            .licenses
            .iter()
            .map(|license| (license.key.as_str(), license))
            .collect();

        Ok(Self {
            snapshot,
            items,
            edges_by_parent,
            licenses,
        })
    }

    /// The indexed snapshot
    #[must_use]
    pub const fn snapshot(&self) -> &'a ProductSnapshot {
        self.snapshot
    }

    /// Look up an item by id
    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&'a Item> {
        self.items.get(id).copied()
    }

    /// Item backing a relationship, `None` for custom relationships
    #[must_use]
    pub fn item_for(&self, relationship: &Relationship) -> Option<&'a Item> {
        relationship.item_id().and_then(|id| self.item(id))
    }

    /// Edges whose parent is `id`, in declared order
    #[must_use]
    pub fn children_of(&self, id: &ItemId) -> &[&'a ChildEdge] {
        self.edges_by_parent.get(id).map_or(&[], Vec::as_slice)
    }

    /// Look up a license by key
    #[must_use]
    pub fn license(&self, key: &str) -> Option<&'a License> {
        self.licenses.get(key).copied()
    }

    /// All license keys, sorted
    #[must_use]
    pub fn license_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.licenses.keys().map(|k| (*k).to_string()).collect();
        keys.sort();
        keys
    }

    /// Approved license choices
    #[must_use]
    pub fn license_choices(&self) -> &'a [LicenseChoice] {
        &self.snapshot.license_choices
    }

    /// Total item count
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}
