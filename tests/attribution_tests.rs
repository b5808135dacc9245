//! End-to-end tests for attribution document assembly.
//!
//! These exercise the engine through its public API only: snapshot in,
//! document out.

use attribution_tools::{
    error::LicenseErrorKind,
    model::{HierarchyEntry, TruncationKind, ORIGINAL_LICENSE_PHRASE},
    create_reporter, AttributionConfig, AttributionDocument, AttributionEngine, AttributionError,
    ChildEdge, Item, ItemFilter, KeyAlgebra, License, LicenseAlgebra, Product, ProductSnapshot,
    Relationship, ReportFormat, TocMode,
};
use attribution_tools::license::LicenseTree;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ============================================================================
// Helpers
// ============================================================================

fn base_snapshot() -> ProductSnapshot {
    let mut snapshot = ProductSnapshot::new(Product::new("Gadget", "2.0"));
    snapshot
        .add_license(License::new("l1", "License One").with_text("text one"))
        .add_license(License::new("l2", "License Two").with_text("text two"))
        .add_license(License::new("l3", "License Three").with_text("text three"));
    snapshot
}

/// B -> C -> D, each under its own license.
fn chain_snapshot() -> ProductSnapshot {
    let mut snapshot = base_snapshot();
    snapshot
        .add_item(Item::component("b", "B").with_license("l1"))
        .add_item(Item::component("c", "C").with_license("l2"))
        .add_item(Item::component("d", "D").with_license("l3"))
        .add_relationship(Relationship::item("b"))
        .add_child_edge(ChildEdge::new("b", "c"))
        .add_child_edge(ChildEdge::new("c", "d"));
    snapshot
}

fn assemble(snapshot: &ProductSnapshot, config: AttributionConfig) -> AttributionDocument {
    AttributionEngine::new(config)
        .assemble(snapshot)
        .expect("assemble")
}

fn names_preorder(document: &AttributionDocument) -> Vec<(String, usize)> {
    let mut seen = Vec::new();
    for entry in document.top_entries() {
        entry.visit(1, &mut |e: &HierarchyEntry, depth| {
            seen.push((e.node.display_name.clone(), depth));
        });
    }
    seen
}

/// Key algebra that counts every parse.
struct CountingAlgebra {
    parses: Arc<AtomicUsize>,
}

impl LicenseAlgebra for CountingAlgebra {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn parse(&self, expression: &str) -> attribution_tools::Result<LicenseTree> {
        self.parses.fetch_add(1, Ordering::SeqCst);
        KeyAlgebra::new().parse(expression)
    }
}

// ============================================================================
// License credit lines
// ============================================================================

mod credit_tests {
    use super::*;

    #[test]
    fn test_concluded_differs_from_declared() {
        let mut snapshot = base_snapshot();
        snapshot
            .add_item(Item::component("a", "A").with_license("l1 AND l2"))
            .add_relationship(Relationship::item("a").with_license("l1"));

        let document = assemble(&snapshot, AttributionConfig::default());
        let node = &document.top_entries().next().expect("entry").node;
        assert_eq!(
            node.credit_lines(),
            vec![
                "l1".to_string(),
                format!("{ORIGINAL_LICENSE_PHRASE} l1 AND l2")
            ]
        );

        let keys: Vec<&str> = document.licenses.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, vec!["l1", "l2"]);
    }

    #[test]
    fn test_equivalent_expressions_render_one_line() {
        let mut snapshot = base_snapshot();
        snapshot
            .add_item(Item::component("a", "A").with_license("l1 AND l2"))
            .add_relationship(Relationship::item("a").with_license("(l2 AND l1)"));

        let document = assemble(&snapshot, AttributionConfig::default());
        let node = &document.top_entries().next().expect("entry").node;
        assert_eq!(node.credit_lines().len(), 1);
        assert!(node.item_expression.is_none());
    }

    #[test]
    fn test_unknown_key_is_fatal() {
        let mut snapshot = base_snapshot();
        snapshot
            .add_item(Item::component("a", "A").with_license("l1"))
            .add_relationship(Relationship::item("a").with_license("nope"));

        let err = AttributionEngine::new(AttributionConfig::default())
            .assemble(&snapshot)
            .unwrap_err();
        match err.license_kind() {
            Some(LicenseErrorKind::UnknownKeys { keys, available }) => {
                assert_eq!(keys, &vec!["nope".to_string()]);
                assert_eq!(available.len(), 3);
            }
            other => panic!("expected unknown keys, got {other:?}"),
        }
    }
}

// ============================================================================
// Hierarchy
// ============================================================================

mod hierarchy_tests {
    use super::*;

    #[test]
    fn test_chain_without_expansion() {
        let document = assemble(&chain_snapshot(), AttributionConfig::default());
        let entries: Vec<_> = document.top_entries().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].node.display_name, "B");
        assert!(entries[0].children.is_empty());
        assert!(document.index.iter().all(|n| n.node.display_name != "D"));
    }

    #[test]
    fn test_chain_with_expansion() {
        let config = AttributionConfig::builder()
            .expand_subcomponents(true)
            .toc(TocMode::Nested)
            .build();
        let document = assemble(&chain_snapshot(), config);

        assert_eq!(
            names_preorder(&document),
            vec![
                ("B".to_string(), 1),
                ("C".to_string(), 2),
                ("D".to_string(), 3)
            ]
        );
        assert_eq!(document.index.len(), 3);
        assert!(!document.is_truncated());
    }

    #[test]
    fn test_appendix_depth_follows_option() {
        let expanded = AttributionConfig::builder()
            .expand_subcomponents(true)
            .build();
        let document = assemble(&chain_snapshot(), expanded.clone());
        assert_eq!(document.licenses.len(), 1);

        let all = AttributionConfig {
            all_license_texts: true,
            ..expanded
        };
        let document = assemble(&chain_snapshot(), all);
        let keys: Vec<&str> = document.licenses.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, vec!["l1", "l3", "l2"]);
    }

    #[test]
    fn test_cycle_is_truncated() {
        let mut snapshot = chain_snapshot();
        snapshot.add_child_edge(ChildEdge::new("d", "b"));
        let config = AttributionConfig::builder()
            .expand_subcomponents(true)
            .build();
        let document = assemble(&snapshot, config);

        let names: Vec<String> = names_preorder(&document)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["B", "C", "D", "B", "C"]);
        assert_eq!(document.warnings.len(), 1);
        assert_eq!(document.warnings[0].kind, TruncationKind::Cycle);
        // Repeated occurrences collapse in the index
        assert_eq!(document.index.len(), 3);
    }

    #[test]
    fn test_depth_cap() {
        let config = AttributionConfig::builder()
            .expand_subcomponents(true)
            .max_depth(1)
            .build();
        let document = assemble(&chain_snapshot(), config);
        assert_eq!(
            names_preorder(&document),
            vec![("B".to_string(), 1), ("C".to_string(), 2)]
        );
        assert_eq!(document.warnings.len(), 1);
        assert_eq!(document.warnings[0].kind, TruncationKind::DepthLimit);
    }
}

// ============================================================================
// Deduplication
// ============================================================================

mod dedup_tests {
    use super::*;

    fn twice_x(extra: Option<&str>) -> ProductSnapshot {
        let mut snapshot = base_snapshot();
        snapshot
            .add_item(Item::component("x", "X").with_license("l1"))
            .add_relationship(Relationship::item("x").with_feature("one"));
        let second = Relationship::item("x").with_feature("two");
        snapshot.add_relationship(match extra {
            Some(text) => second.with_extra_text(text),
            None => second,
        });
        snapshot
    }

    #[test]
    fn test_identical_occurrences_collapse() {
        let document = assemble(&twice_x(None), AttributionConfig::default());
        assert_eq!(document.occurrence_count(), 2);
        assert_eq!(document.index.len(), 1);
    }

    #[test]
    fn test_extra_text_keeps_occurrences_apart() {
        let document = assemble(&twice_x(Some("Used by the updater")), AttributionConfig::default());
        assert_eq!(document.index.len(), 2);

        let anchors: Vec<&str> = document.index.iter().map(|n| n.anchor.as_str()).collect();
        assert_ne!(anchors[0], anchors[1]);
    }
}

// ============================================================================
// Configuration and determinism
// ============================================================================

mod config_tests {
    use super::*;

    #[test]
    fn test_feature_groups_require_nested_toc() {
        let parses = Arc::new(AtomicUsize::new(0));
        let config = AttributionConfig::builder()
            .toc(TocMode::Flat)
            .group_by_feature(true)
            .build();
        let engine = AttributionEngine::new(config).with_algebra(Box::new(CountingAlgebra {
            parses: Arc::clone(&parses),
        }));

        let err = engine.assemble(&chain_snapshot()).unwrap_err();
        assert!(matches!(err, AttributionError::Config(_)));
        assert_eq!(parses.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_two_active_queries_rejected() {
        let query = ItemFilter {
            pattern: Some("b".to_string()),
            ..ItemFilter::default()
        };
        let config = AttributionConfig::builder()
            .component_query(query.clone())
            .package_query(query)
            .build();
        let err = AttributionEngine::new(config)
            .assemble(&chain_snapshot())
            .unwrap_err();
        assert!(err.to_string().contains("got 2"), "{err}");
    }

    #[test]
    fn test_assembly_is_idempotent() {
        let mut snapshot = chain_snapshot();
        snapshot
            .add_item(Item::component("x", "X").with_license("l2 OR l3"))
            .add_relationship(Relationship::item("x").with_feature("zeta"))
            .add_relationship(Relationship::item("c").with_feature("alpha"));
        let config = AttributionConfig::builder()
            .expand_subcomponents(true)
            .toc(TocMode::Nested)
            .group_by_feature(true)
            .all_license_texts(true)
            .build();

        let first = assemble(&snapshot, config.clone());
        let second = assemble(&snapshot, config);
        assert_eq!(
            serde_json::to_string(&first).expect("json"),
            serde_json::to_string(&second).expect("json")
        );

        let html = create_reporter(ReportFormat::Html);
        assert_eq!(
            html.generate(&first).expect("render"),
            html.generate(&second).expect("render")
        );
    }
}
