//! Node de-duplication and anchor assignment.
//!
//! The same catalog item can show up many times in a forest (under several
//! parents, or attached twice with different extra text). [`NodeIndex`]
//! keeps one slot per distinct [`AttributionNode`] value, in first-appearance
//! order, and gives each slot an anchor derived from the node's structural
//! fingerprint.

use crate::model::{AttributionNode, FeatureGroup};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use xxhash_rust::xxh3::xxh3_64_with_seed;

/// A unique node and its anchor id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedNode {
    pub anchor: String,
    pub node: AttributionNode,
}

/// Flat, order-preserving index of unique nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NodeIndex {
    nodes: Vec<IndexedNode>,
    #[serde(skip)]
    positions: HashMap<AttributionNode, usize>,
    #[serde(skip)]
    used_hashes: HashSet<u64>,
}

impl NodeIndex {
    /// Index every node of the forest in depth-first pre-order.
    #[must_use]
    pub fn build(groups: &[FeatureGroup]) -> Self {
        let mut index = Self::default();
        for entry in groups.iter().flat_map(|g| g.entries.iter()) {
            entry.visit(1, &mut |e, _| {
                index.insert(&e.node);
            });
        }
        index
    }

    /// Add a node if no equal node is indexed yet; returns its anchor.
    pub fn insert(&mut self, node: &AttributionNode) -> &str {
        let position = match self.positions.get(node) {
            Some(&position) => position,
            None => {
                let anchor = self.unique_anchor(node.fingerprint());
                self.nodes.push(IndexedNode {
                    anchor,
                    node: node.clone(),
                });
                let position = self.nodes.len() - 1;
                self.positions.insert(node.clone(), position);
                position
            }
        };
        &self.nodes[position].anchor
    }

    /// Fingerprints of distinct nodes can still collide; rehash with an
    /// increasing seed until the hash is free.
    fn unique_anchor(&mut self, fingerprint: u64) -> String {
        let mut hash = fingerprint;
        let mut seed = 0u64;
        while !self.used_hashes.insert(hash) {
            seed += 1;
            hash = xxh3_64_with_seed(&fingerprint.to_le_bytes(), seed);
        }
        format!("node-{hash:016x}")
    }

    /// Anchor of an indexed node
    #[must_use]
    pub fn anchor_for(&self, node: &AttributionNode) -> Option<&str> {
        self.positions
            .get(node)
            .map(|&position| self.nodes[position].anchor.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexedNode> {
        self.nodes.iter()
    }
}
