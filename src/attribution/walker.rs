//! Hierarchy walker.
//!
//! Turns one top-level relationship into a [`HierarchyEntry`], optionally
//! following subcomponent edges. Child edges are not guaranteed acyclic, so
//! descent tracks the (parent, child) pairs on the current path and cuts a
//! branch short when a pair repeats or the depth cap is reached.

use crate::config::AttributionConfig;
use crate::error::{AttributionError, Result};
use crate::license::{resolve_license, standard_notice, LicenseAlgebra};
use crate::model::{
    AttributionNode, CatalogIndex, CustomItem, HierarchyEntry, Item, ItemId, ItemKind,
    Relationship, RelationshipTarget, TraversalWarning, TruncationKind, DEFAULT_GROUP,
};
use indexmap::IndexSet;

/// Builds entries for top-level relationships.
pub struct HierarchyWalker<'a> {
    index: &'a CatalogIndex<'a>,
    algebra: &'a dyn LicenseAlgebra,
    config: &'a AttributionConfig,
    warnings: Vec<TraversalWarning>,
}

/// Edges on the current descent path
type Path<'a> = IndexSet<(&'a ItemId, &'a ItemId)>;

impl<'a> HierarchyWalker<'a> {
    pub fn new(
        index: &'a CatalogIndex<'a>,
        algebra: &'a dyn LicenseAlgebra,
        config: &'a AttributionConfig,
    ) -> Self {
        Self {
            index,
            algebra,
            config,
            warnings: Vec::new(),
        }
    }

    /// Build the entry of one relationship, with its subcomponents when
    /// expansion is enabled.
    pub fn walk(&mut self, relationship: &Relationship) -> Result<HierarchyEntry> {
        let Some(id) = relationship.item_id() else {
            return self.custom_entry(relationship);
        };
        let index = self.index;
        let item = index
            .item(id)
            .ok_or_else(|| AttributionError::dangling_item(id.value(), "a product relationship"))?;

        tracing::debug!(item = %item.id, "Visiting relationship");
        let node = self.item_node(
            item,
            &relationship.license_expression,
            &relationship.extra_attribution_text,
        )?;
        let mut entry = HierarchyEntry::new(node);

        if self.config.expand_subcomponents {
            let mut path = Path::new();
            let mut names = vec![entry.node.display_name.clone()];
            self.descend(item, &mut entry, &mut path, &mut names, 0)?;
        }
        Ok(entry)
    }

    /// Truncation warnings collected so far
    #[must_use]
    pub fn warnings(&self) -> &[TraversalWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<TraversalWarning> {
        self.warnings
    }

    fn custom_entry(&self, relationship: &Relationship) -> Result<HierarchyEntry> {
        let default = CustomItem::default();
        let custom = match &relationship.target {
            RelationshipTarget::Custom(custom) => custom,
            RelationshipTarget::Item { .. } => &default,
        };
        let name = custom.display_name();
        tracing::debug!(custom = %name, "Visiting custom relationship");

        let resolved = resolve_license(
            self.algebra,
            &relationship.license_expression,
            "",
            self.index,
        )?;
        let notice = if self.config.include_standard_notice {
            standard_notice(self.algebra, &relationship.license_expression, self.index)?
        } else {
            None
        };

        Ok(HierarchyEntry::new(AttributionNode {
            kind: ItemKind::Custom,
            display_name: name,
            owner: custom.owner.clone(),
            copyright: custom.copyright.clone(),
            extra_attribution_text: relationship.extra_attribution_text.clone(),
            relationship_expression: resolved.relationship,
            item_expression: resolved.item,
            notice_text: String::new(),
            is_displayed: true,
            homepage_url: None,
            standard_notice: notice,
        }))
    }

    fn item_node(&self, item: &Item, concluded: &str, extra_text: &str) -> Result<AttributionNode> {
        let resolved = resolve_license(self.algebra, concluded, &item.license_expression, self.index)?;

        let homepage_url = (self.config.include_homepage_url && !item.homepage_url.is_empty())
            .then(|| item.homepage_url.clone());
        let standard_notice = if self.config.include_standard_notice {
            standard_notice(self.algebra, &item.license_expression, self.index)?
        } else {
            None
        };

        Ok(AttributionNode {
            kind: item.kind,
            display_name: item.display_name(),
            owner: item.owner.clone(),
            copyright: item.copyright.clone(),
            extra_attribution_text: extra_text.to_string(),
            relationship_expression: resolved.relationship,
            item_expression: resolved.item,
            notice_text: item.notice_text.clone(),
            is_displayed: item.is_active,
            homepage_url,
            standard_notice,
        })
    }

    /// Attach the children of `parent` to `entry`, recursively.
    ///
    /// `level` counts edges between the top-level entry and `entry`.
    fn descend(
        &mut self,
        parent: &'a Item,
        entry: &mut HierarchyEntry,
        path: &mut Path<'a>,
        names: &mut Vec<String>,
        level: u32,
    ) -> Result<()> {
        let index = self.index;
        let edges = index.children_of(&parent.id);
        if edges.is_empty() {
            return Ok(());
        }
        if level >= self.config.max_depth {
            entry.truncated = true;
            self.warn(TruncationKind::DepthLimit, names);
            return Ok(());
        }

        let mut children = Vec::with_capacity(edges.len());
        for &edge in edges {
            let child = index.item(&edge.child).ok_or_else(|| {
                AttributionError::dangling_item(
                    edge.child.value(),
                    format!("child edge {} -> {}", edge.parent, edge.child),
                )
            })?;
            tracing::debug!(
                parent = %edge.parent,
                child = %edge.child,
                depth = level + 2,
                "Visiting subcomponent"
            );

            let node = self.item_node(child, &edge.license_expression, &edge.extra_attribution_text)?;
            let mut child_entry = HierarchyEntry::new(node);
            names.push(child_entry.node.display_name.clone());

            let pair = (&edge.parent, &edge.child);
            if path.contains(&pair) {
                child_entry.truncated = true;
                self.warn(TruncationKind::Cycle, names);
            } else {
                path.insert(pair);
                self.descend(child, &mut child_entry, path, names, level + 1)?;
                path.pop();
            }

            names.pop();
            children.push(child_entry);
        }

        entry.children.insert(DEFAULT_GROUP.to_string(), children);
        Ok(())
    }

    fn warn(&mut self, kind: TruncationKind, names: &[String]) {
        let warning = TraversalWarning {
            kind,
            path: names.to_vec(),
        };
        tracing::warn!("Subcomponent hierarchy truncated: {}", warning);
        self.warnings.push(warning);
    }
}
