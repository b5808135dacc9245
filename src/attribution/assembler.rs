//! Document assembly.
//!
//! [`AttributionEngine`] orchestrates one run:
//!
//! 1. validate the configuration (nothing is traversed on failure)
//! 2. index the snapshot
//! 3. select relationships (custom, packages, ad-hoc queries)
//! 4. group them by feature tag
//! 5. walk every relationship
//! 6. de-duplicate nodes into the [`NodeIndex`]
//! 7. collect the license appendix
//! 8. build the product header

use super::{HierarchyWalker, ItemQuery, NodeIndex};
use crate::config::{AttributionConfig, Validatable};
use crate::error::{AttributionError, Result};
use crate::license::{KeyAlgebra, LicenseAlgebra};
use crate::model::{
    license_anchor, AttributionDocument, CatalogIndex, DisplayOptions, DocumentHeader,
    FeatureGroup, Item, ItemId, ItemKind, LicenseText, ProductSnapshot, Relationship,
};
use indexmap::IndexSet;
use std::collections::{BTreeMap, HashSet};

/// Builds attribution documents from product snapshots.
pub struct AttributionEngine {
    config: AttributionConfig,
    algebra: Box<dyn LicenseAlgebra>,
}

impl AttributionEngine {
    /// Create an engine using the catalog-key expression algebra.
    #[must_use]
    pub fn new(config: AttributionConfig) -> Self {
        Self {
            config,
            algebra: Box::new(KeyAlgebra::new()),
        }
    }

    /// Replace the expression algebra.
    #[must_use]
    pub fn with_algebra(mut self, algebra: Box<dyn LicenseAlgebra>) -> Self {
        self.algebra = algebra;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &AttributionConfig {
        &self.config
    }

    /// Assemble the attribution document of a snapshot.
    pub fn assemble(&self, snapshot: &ProductSnapshot) -> Result<AttributionDocument> {
        let errors = self.config.validate();
        if !errors.is_empty() {
            let message = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(AttributionError::config(message));
        }

        let index = CatalogIndex::build(snapshot)?;
        tracing::debug!(
            algebra = self.algebra.name(),
            items = index.item_count(),
            relationships = snapshot.relationships.len(),
            "Assembling attribution document"
        );

        let selected = self.select_relationships(snapshot, &index);

        // Untagged relationships sort first
        let mut by_feature: BTreeMap<&str, Vec<&Relationship>> = BTreeMap::new();
        for relationship in selected {
            by_feature
                .entry(relationship.feature.trim())
                .or_default()
                .push(relationship);
        }

        let mut walker = HierarchyWalker::new(&index, self.algebra.as_ref(), &self.config);
        let mut groups = Vec::with_capacity(by_feature.len());
        for (label, relationships) in by_feature {
            let entries = relationships
                .into_iter()
                .map(|relationship| walker.walk(relationship))
                .collect::<Result<Vec<_>>>()?;
            groups.push(FeatureGroup {
                label: label.to_string(),
                entries,
            });
        }
        let warnings = walker.into_warnings();

        let node_index = NodeIndex::build(&groups);
        let licenses = self.license_appendix(&groups, &index)?;
        let header = self.header(snapshot)?;

        tracing::info!(
            groups = groups.len(),
            nodes = node_index.len(),
            licenses = licenses.len(),
            truncated = warnings.len(),
            "Assembled attribution document for {}",
            header.product_name
        );

        Ok(AttributionDocument {
            header,
            groups,
            index: node_index,
            licenses,
            warnings,
            display: DisplayOptions {
                toc: self.config.toc,
                group_by_feature: self.config.group_by_feature,
            },
        })
    }

    fn select_relationships<'s>(
        &self,
        snapshot: &'s ProductSnapshot,
        index: &CatalogIndex<'s>,
    ) -> Vec<&'s Relationship> {
        let components = self.query_matches(snapshot, ItemKind::Component);
        let packages = self.query_matches(snapshot, ItemKind::Package);
        let allowed = |matches: &Option<HashSet<&ItemId>>, item: &Item| {
            matches.as_ref().map_or(true, |ids| ids.contains(&item.id))
        };

        snapshot
            .relationships
            .iter()
            .filter(|relationship| match index.item_for(relationship) {
                None => self.config.include_custom,
                Some(item) => match item.kind {
                    ItemKind::Component => allowed(&components, item),
                    ItemKind::Package => self.config.include_packages && allowed(&packages, item),
                    ItemKind::Custom => self.config.include_custom,
                },
            })
            .collect()
    }

    /// Ids kept by the active query of `kind`, `None` when unrestricted.
    fn query_matches<'s>(
        &self,
        snapshot: &'s ProductSnapshot,
        kind: ItemKind,
    ) -> Option<HashSet<&'s ItemId>> {
        let query = match kind {
            ItemKind::Component => self.config.component_query.as_ref(),
            ItemKind::Package => self.config.package_query.as_ref(),
            ItemKind::Custom => None,
        }?;
        if !query.is_active() {
            return None;
        }

        let items: Vec<&Item> = snapshot.items.iter().filter(|i| i.kind == kind).collect();
        let kept = query.filter(&items);
        tracing::debug!(
            %kind,
            query = %query.description(),
            kept = kept.len(),
            of = items.len(),
            "Applied ad-hoc query"
        );
        Some(kept.into_iter().map(|item| &item.id).collect())
    }

    /// Licenses of top-level nodes, plus those of every level when asked.
    fn license_appendix(
        &self,
        groups: &[FeatureGroup],
        index: &CatalogIndex<'_>,
    ) -> Result<Vec<LicenseText>> {
        let mut keys: IndexSet<&str> = IndexSet::new();
        for entry in groups.iter().flat_map(|g| g.entries.iter()) {
            if self.config.all_license_texts {
                entry.visit(1, &mut |e, _| keys.extend(e.node.license_keys()));
            } else {
                keys.extend(entry.node.license_keys());
            }
        }

        let mut licenses = keys
            .into_iter()
            .map(|key| {
                let license = index.license(key).ok_or_else(|| {
                    AttributionError::unknown_keys(
                        "license appendix",
                        vec![key.to_string()],
                        index.license_keys(),
                    )
                })?;
                Ok(LicenseText {
                    key: license.key.clone(),
                    short_name: license.label().to_string(),
                    name: license.name.clone(),
                    full_text: license.full_text.clone(),
                    anchor: license_anchor(&license.key),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        licenses.sort_by(|a, b| {
            a.short_name
                .to_lowercase()
                .cmp(&b.short_name.to_lowercase())
                .then_with(|| a.key.cmp(&b.key))
        });
        Ok(licenses)
    }

    fn header(&self, snapshot: &ProductSnapshot) -> Result<DocumentHeader> {
        let product = &snapshot.product;
        let expression = product.license_expression.trim();
        let credit_sentence = if expression.is_empty() {
            None
        } else {
            let tree = self.algebra.parse(expression)?;
            Some(format!(
                "{} is licensed under {tree}",
                product.display_name()
            ))
        };
        let owner = product.owner.trim();

        Ok(DocumentHeader {
            product_name: product.name.clone(),
            product_version: product.version.clone(),
            credit_sentence,
            owner: (!owner.is_empty()).then(|| owner.to_string()),
        })
    }
}
