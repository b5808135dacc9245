//! Attribution document model.
//!
//! The document is a pure value computed fresh on every run: feature
//! groups of top-level entries, each entry carrying its nested
//! subcomponent hierarchy, plus the de-duplicated node index and the
//! license appendix.

use super::AttributionNode;
use crate::attribution::NodeIndex;
use crate::config::TocMode;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Label of the single group used below the top level.
pub const DEFAULT_GROUP: &str = "";

/// Nested entries keyed by sub-group label. Empty when the hierarchy was
/// not requested or the item has no subcomponents.
pub type Children = IndexMap<String, Vec<HierarchyEntry>>;

/// One node occurrence together with its nested children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyEntry {
    pub node: AttributionNode,
    pub children: Children,
    /// Set when descent stopped early because of a cycle or the depth limit
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

impl HierarchyEntry {
    pub fn new(node: AttributionNode) -> Self {
        Self {
            node,
            children: Children::new(),
            truncated: false,
        }
    }

    /// Depth-first pre-order visit of this entry and its descendants.
    ///
    /// The callback receives the entry and its depth, starting at `depth`.
    pub fn visit<'a, F>(&'a self, depth: usize, f: &mut F)
    where
        F: FnMut(&'a HierarchyEntry, usize),
    {
        f(self, depth);
        for entries in self.children.values() {
            for entry in entries {
                entry.visit(depth + 1, f);
            }
        }
    }

    /// Child entries across all sub-groups
    pub fn child_entries(&self) -> impl Iterator<Item = &HierarchyEntry> {
        self.children.values().flatten()
    }
}

/// Top-level entries sharing one feature tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureGroup {
    /// Feature tag; empty for untagged relationships
    pub label: String,
    pub entries: Vec<HierarchyEntry>,
}

/// Product-level header lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentHeader {
    pub product_name: String,
    pub product_version: String,
    /// "<product> is licensed under <expression>", only when the product has one
    pub credit_sentence: Option<String>,
    pub owner: Option<String>,
}

/// A license included in the appendix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseText {
    pub key: String,
    pub short_name: String,
    pub name: String,
    pub full_text: String,
    pub anchor: String,
}

/// Why a branch was cut short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationKind {
    /// The (parent, child) edge already appears on the current descent path
    Cycle,
    /// The configured maximum depth was reached
    DepthLimit,
}

/// Non-fatal structural anomaly met during traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraversalWarning {
    pub kind: TruncationKind,
    /// Display names from the top-level entry down to the truncated entry
    pub path: Vec<String>,
}

impl fmt::Display for TraversalWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.kind {
            TruncationKind::Cycle => "cycle detected",
            TruncationKind::DepthLimit => "maximum depth reached",
        };
        write!(f, "{reason} at {}", self.path.join(" > "))
    }
}

/// How the document asks to be laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayOptions {
    pub toc: TocMode,
    /// Surface feature labels as headers (nested table of contents only)
    pub group_by_feature: bool,
}

/// The assembled attribution document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributionDocument {
    pub header: DocumentHeader,
    /// Feature groups, empty label first, then sorted by label
    pub groups: Vec<FeatureGroup>,
    /// Unique nodes in first-appearance order, with anchors
    pub index: NodeIndex,
    /// License appendix, sorted by short name
    pub licenses: Vec<LicenseText>,
    pub warnings: Vec<TraversalWarning>,
    pub display: DisplayOptions,
}

impl AttributionDocument {
    /// Top-level entries across all groups, in document order
    pub fn top_entries(&self) -> impl Iterator<Item = &HierarchyEntry> {
        self.groups.iter().flat_map(|g| g.entries.iter())
    }

    /// Anchor of a node, if it occurs in the document
    #[must_use]
    pub fn anchor_for(&self, node: &AttributionNode) -> Option<&str> {
        self.index.anchor_for(node)
    }

    /// Whether any branch was truncated
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Number of node occurrences, counting duplicates
    #[must_use]
    pub fn occurrence_count(&self) -> usize {
        let mut count = 0;
        for entry in self.top_entries() {
            entry.visit(1, &mut |_, _| count += 1);
        }
        count
    }
}
