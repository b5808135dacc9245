//! Catalog snapshot data structures.
//!
//! These are the read-only inputs of attribution generation: the product,
//! its relationships, the items they reference, the subcomponent edges
//! between items and the license table. A [`ProductSnapshot`] is assumed to
//! be already scoped and permission-filtered by its producer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a catalog item within a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create a new item identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw identifier
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Kind of entry that can appear in an attribution document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Component,
    Package,
    /// Placeholder attached to a product without a backing catalog item
    Custom,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component => write!(f, "component"),
            Self::Package => write!(f, "package"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// A catalog Component or Package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    pub name: String,
    pub version: String,
    pub owner: String,
    pub copyright: String,
    pub homepage_url: String,
    /// Declared license expression
    pub license_expression: String,
    pub notice_text: String,
    /// Inactive items keep their slot in the document but render no body
    pub is_active: bool,
}

impl Default for Item {
    fn default() -> Self {
        Self {
            id: ItemId::default(),
            kind: ItemKind::Component,
            name: String::new(),
            version: String::new(),
            owner: String::new(),
            copyright: String::new(),
            homepage_url: String::new(),
            license_expression: String::new(),
            notice_text: String::new(),
            is_active: true,
        }
    }
}

impl Item {
    /// Create an active component with the given id and name
    pub fn component(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(id),
            kind: ItemKind::Component,
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create an active package with the given id and name
    pub fn package(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Package,
            ..Self::component(id, name)
        }
    }

    /// Set the declared license expression
    #[must_use]
    pub fn with_license(mut self, expression: impl Into<String>) -> Self {
        self.license_expression = expression.into();
        self
    }

    /// Set the version
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Name shown in the document: "name version", or just the name.
    #[must_use]
    pub fn display_name(&self) -> String {
        display_name(&self.name, &self.version)
    }
}

fn display_name(name: &str, version: &str) -> String {
    let version = version.trim();
    if version.is_empty() {
        name.trim().to_string()
    } else {
        format!("{} {}", name.trim(), version)
    }
}

/// Inline placeholder for a relationship without a backing item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomItem {
    pub name: String,
    pub version: String,
    pub owner: String,
    pub copyright: String,
}

impl CustomItem {
    #[must_use]
    pub fn display_name(&self) -> String {
        display_name(&self.name, &self.version)
    }
}

/// What a relationship attaches to its product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelationshipTarget {
    Item { item: ItemId },
    Custom(CustomItem),
}

/// Join record attaching an item (or a custom placeholder) to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub target: RelationshipTarget,
    /// Concluded license expression; empty when not concluded
    #[serde(default)]
    pub license_expression: String,
    #[serde(default)]
    pub extra_attribution_text: String,
    /// Free-text grouping key; empty when untagged
    #[serde(default)]
    pub feature: String,
}

impl Relationship {
    /// Attach a catalog item
    pub fn item(id: impl Into<String>) -> Self {
        Self {
            target: RelationshipTarget::Item {
                item: ItemId::new(id),
            },
            license_expression: String::new(),
            extra_attribution_text: String::new(),
            feature: String::new(),
        }
    }

    /// Attach a custom placeholder
    pub fn custom(custom: CustomItem) -> Self {
        Self {
            target: RelationshipTarget::Custom(custom),
            ..Self::item("")
        }
    }

    /// Set the concluded license expression
    #[must_use]
    pub fn with_license(mut self, expression: impl Into<String>) -> Self {
        self.license_expression = expression.into();
        self
    }

    /// Set the extra attribution text
    #[must_use]
    pub fn with_extra_text(mut self, text: impl Into<String>) -> Self {
        self.extra_attribution_text = text.into();
        self
    }

    /// Set the feature tag
    #[must_use]
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.feature = feature.into();
        self
    }

    #[must_use]
    pub const fn is_custom(&self) -> bool {
        matches!(self.target, RelationshipTarget::Custom(_))
    }

    /// Backing item id, `None` for custom relationships
    #[must_use]
    pub fn item_id(&self) -> Option<&ItemId> {
        match &self.target {
            RelationshipTarget::Item { item } => Some(item),
            RelationshipTarget::Custom(_) => None,
        }
    }
}

/// Subcomponent link between a parent item and a child item.
///
/// Edges are not guaranteed to be acyclic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildEdge {
    pub parent: ItemId,
    pub child: ItemId,
    /// Concluded license expression override; empty when not concluded
    #[serde(default)]
    pub license_expression: String,
    #[serde(default)]
    pub extra_attribution_text: String,
}

impl ChildEdge {
    pub fn new(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            parent: ItemId::new(parent),
            child: ItemId::new(child),
            license_expression: String::new(),
            extra_attribution_text: String::new(),
        }
    }

    #[must_use]
    pub fn with_license(mut self, expression: impl Into<String>) -> Self {
        self.license_expression = expression.into();
        self
    }

    #[must_use]
    pub fn with_extra_text(mut self, text: impl Into<String>) -> Self {
        self.extra_attribution_text = text.into();
        self
    }
}

/// A license known to the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct License {
    pub key: String,
    pub short_name: String,
    pub name: String,
    pub full_text: String,
    /// Canonical boilerplate notice, possibly empty
    pub standard_notice: String,
}

impl License {
    pub fn new(key: impl Into<String>, short_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            short_name: short_name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.full_text = text.into();
        self
    }

    #[must_use]
    pub fn with_standard_notice(mut self, notice: impl Into<String>) -> Self {
        self.standard_notice = notice.into();
        self
    }

    /// Label used in links: the short name, falling back to the key
    #[must_use]
    pub fn label(&self) -> &str {
        if self.short_name.trim().is_empty() {
            &self.key
        } else {
            &self.short_name
        }
    }
}

/// Approved substitution of one license expression by another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseChoice {
    pub from_expression: String,
    pub to_expression: String,
}

impl LicenseChoice {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from_expression: from.into(),
            to_expression: to.into(),
        }
    }
}

/// The product an attribution document is generated for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub name: String,
    pub version: String,
    pub owner: String,
    pub license_expression: String,
}

impl Product {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        display_name(&self.name, &self.version)
    }
}

/// Point-in-time view of everything attribution generation reads for one product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductSnapshot {
    pub product: Product,
    /// Relationships in declared order
    pub relationships: Vec<Relationship>,
    pub items: Vec<Item>,
    /// Subcomponent edges in declared order
    pub child_edges: Vec<ChildEdge>,
    pub licenses: Vec<License>,
    pub license_choices: Vec<LicenseChoice>,
}

impl ProductSnapshot {
    pub fn new(product: Product) -> Self {
        Self {
            product,
            ..Default::default()
        }
    }

    pub fn add_item(&mut self, item: Item) -> &mut Self {
        self.items.push(item);
        self
    }

    pub fn add_relationship(&mut self, relationship: Relationship) -> &mut Self {
        self.relationships.push(relationship);
        self
    }

    pub fn add_child_edge(&mut self, edge: ChildEdge) -> &mut Self {
        self.child_edges.push(edge);
        self
    }

    pub fn add_license(&mut self, license: License) -> &mut Self {
        self.licenses.push(license);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_omits_empty_version() {
        assert_eq!(Item::component("a", "zlib").display_name(), "zlib");
        assert_eq!(
            Item::component("a", "zlib").with_version("1.3").display_name(),
            "zlib 1.3"
        );
    }

    #[test]
    fn test_relationship_target_serde() {
        let rel = Relationship::item("c1").with_feature("ui");
        let json = serde_json::to_string(&rel).expect("serialize");
        assert!(json.contains(r#""type":"item""#), "{json}");

        let custom: Relationship = serde_json::from_str(
            r#"{"target": {"type": "custom", "name": "blob", "version": "2"}}"#,
        )
        .expect("deserialize custom");
        assert!(custom.is_custom());
        assert!(custom.item_id().is_none());
    }

    #[test]
    fn test_item_defaults_to_active() {
        let item: Item = serde_json::from_str(r#"{"id": "x", "name": "x"}"#).expect("item");
        assert!(item.is_active);
        assert_eq!(item.kind, ItemKind::Component);
    }

    #[test]
    fn test_license_label_fallback() {
        assert_eq!(License::new("mit", "").label(), "mit");
        assert_eq!(License::new("mit", "MIT License").label(), "MIT License");
    }
}
