//! License expression resolution for relationships and child edges.

use super::{LicenseAlgebra, LicenseTree};
use crate::error::{AttributionError, ErrorContext, Result};
use crate::model::{CatalogIndex, ExpressionMarkup, LicenseChoice, MarkupToken};

/// The credit lines resolved for one relationship or child edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedLicense {
    /// Relationship-level line
    pub relationship: Option<ExpressionMarkup>,
    /// Item-level line, only when it differs from the relationship line
    pub item: Option<ExpressionMarkup>,
}

/// Resolve the concluded and declared expressions of one attachment.
///
/// - no concluded expression: the declared expression is the only line
/// - concluded equivalent to declared: only the concluded line
/// - otherwise: both lines
pub fn resolve_license(
    algebra: &dyn LicenseAlgebra,
    concluded: &str,
    declared: &str,
    index: &CatalogIndex<'_>,
) -> Result<ResolvedLicense> {
    let concluded = concluded.trim();
    let declared = declared.trim();

    if concluded.is_empty() {
        let relationship = if declared.is_empty() {
            None
        } else {
            let tree = algebra.parse(declared).context("declared expression")?;
            Some(markup(&tree, index)?)
        };
        return Ok(ResolvedLicense {
            relationship,
            item: None,
        });
    }

    let concluded_tree = algebra.parse(concluded).context("concluded expression")?;
    let relationship = Some(markup(&concluded_tree, index)?);

    if declared.is_empty() || algebra.equivalent(concluded, declared)? {
        return Ok(ResolvedLicense {
            relationship,
            item: None,
        });
    }

    let declared_tree = algebra.parse(declared).context("declared expression")?;
    Ok(ResolvedLicense {
        relationship,
        item: Some(markup(&declared_tree, index)?),
    })
}

/// Render a tree into markup linked to the snapshot's licenses.
///
/// Every key, exceptions included, must exist in the license table.
pub fn markup(tree: &LicenseTree, index: &CatalogIndex<'_>) -> Result<ExpressionMarkup> {
    let missing: Vec<String> = tree
        .all_keys()
        .into_iter()
        .filter(|key| index.license(key).is_none())
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(AttributionError::unknown_keys(
            format!("expression '{tree}'"),
            missing,
            index.license_keys(),
        ));
    }

    let mut tokens = Vec::new();
    push_tokens(tree, index, &mut tokens);
    Ok(ExpressionMarkup::new(tokens))
}

fn push_tokens(tree: &LicenseTree, index: &CatalogIndex<'_>, out: &mut Vec<MarkupToken>) {
    let license = |key: &str| MarkupToken::License {
        key: key.to_string(),
        label: index
            .license(key)
            .map_or_else(|| key.to_string(), |l| l.label().to_string()),
    };
    let text = |text: &str| MarkupToken::Text {
        text: text.to_string(),
    };

    let (operands, operator) = match tree {
        LicenseTree::Symbol(symbol) => {
            out.push(license(&symbol.key));
            if let Some(exception) = &symbol.exception {
                out.push(text(" WITH "));
                out.push(license(exception));
            }
            return;
        }
        LicenseTree::And(operands) => (operands, " AND "),
        LicenseTree::Or(operands) => (operands, " OR "),
    };
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            out.push(text(operator));
        }
        if operand.is_compound() {
            out.push(text("("));
            push_tokens(operand, index, out);
            out.push(text(")"));
        } else {
            push_tokens(operand, index, out);
        }
    }
}

/// Standard notice of an expression.
///
/// Joins the non-empty standard notices of every license key (exceptions
/// ignored) in first-appearance order, without duplicates, separated by a
/// blank line. Returns `None` when nothing remains.
pub fn standard_notice(
    algebra: &dyn LicenseAlgebra,
    expression: &str,
    index: &CatalogIndex<'_>,
) -> Result<Option<String>> {
    let expression = expression.trim();
    if expression.is_empty() {
        return Ok(None);
    }
    let tree = algebra.parse(expression)?;

    let mut notices: Vec<&str> = Vec::new();
    for key in tree.license_keys() {
        let Some(license) = index.license(key) else {
            return Err(AttributionError::unknown_keys(
                "standard notice",
                vec![key.to_string()],
                index.license_keys(),
            ));
        };
        let notice = license.standard_notice.trim();
        if !notice.is_empty() && !notices.contains(&notice) {
            notices.push(notice);
        }
    }

    if notices.is_empty() {
        Ok(None)
    } else {
        Ok(Some(notices.join("\n\n")))
    }
}

/// Validate an expression against a restricted set of available keys.
///
/// Unknown keys are re-checked after applying every matching license
/// choice; only keys still unknown after substitution are reported,
/// together with the available keys. Returns the tree that passed, which
/// is the substituted one when a choice was needed.
pub fn validate_expression(
    algebra: &dyn LicenseAlgebra,
    expression: &str,
    available: &[String],
    choices: &[LicenseChoice],
) -> Result<LicenseTree> {
    let unknown = |tree: &LicenseTree| -> Vec<String> {
        tree.all_keys()
            .into_iter()
            .filter(|key| !available.iter().any(|a| a == key))
            .map(str::to_string)
            .collect()
    };

    let tree = algebra.parse(expression)?;
    if unknown(&tree).is_empty() {
        return Ok(tree);
    }

    let substituted = algebra.substitute(expression, choices)?;
    let remaining = unknown(&substituted);
    if remaining.is_empty() {
        tracing::debug!(
            expression,
            resolved = %substituted,
            "Expression accepted after license choice substitution"
        );
        return Ok(substituted);
    }

    let mut available = available.to_vec();
    available.sort();
    Err(AttributionError::unknown_keys(
        format!("validating '{expression}'"),
        remaining,
        available,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LicenseErrorKind;
    use crate::license::KeyAlgebra;
    use crate::model::{License, Product, ProductSnapshot};

    fn snapshot() -> ProductSnapshot {
        let mut snapshot = ProductSnapshot::new(Product::new("app", "1"));
        snapshot
            .add_license(License::new("l1", "License One").with_standard_notice("Notice one"))
            .add_license(License::new("l2", "License Two").with_standard_notice("Notice two"))
            .add_license(License::new("l3", "License Three").with_standard_notice("Notice one"))
            .add_license(License::new("l4", "License Four"));
        snapshot
    }

    #[test]
    fn test_no_concluded_shows_declared_only() {
        let snapshot = snapshot();
        let index = CatalogIndex::build(&snapshot).expect("index");
        let resolved = resolve_license(&KeyAlgebra, "", "l1 AND l2", &index).expect("resolve");
        assert_eq!(
            resolved.relationship.map(|m| m.to_string()),
            Some("l1 AND l2".to_string())
        );
        assert!(resolved.item.is_none());
    }

    #[test]
    fn test_equivalent_concluded_suppresses_item_line() {
        let snapshot = snapshot();
        let index = CatalogIndex::build(&snapshot).expect("index");
        let resolved =
            resolve_license(&KeyAlgebra, "l2 AND l1", "l1 AND l2", &index).expect("resolve");
        assert_eq!(
            resolved.relationship.map(|m| m.to_string()),
            Some("l2 AND l1".to_string())
        );
        assert!(resolved.item.is_none());
    }

    #[test]
    fn test_narrowed_concluded_keeps_both_lines() {
        let snapshot = snapshot();
        let index = CatalogIndex::build(&snapshot).expect("index");
        let resolved = resolve_license(&KeyAlgebra, "l1", "l1 AND l2", &index).expect("resolve");
        assert_eq!(resolved.relationship.map(|m| m.to_string()), Some("l1".to_string()));
        assert_eq!(resolved.item.map(|m| m.to_string()), Some("l1 AND l2".to_string()));
    }

    #[test]
    fn test_nothing_to_show() {
        let snapshot = snapshot();
        let index = CatalogIndex::build(&snapshot).expect("index");
        let resolved = resolve_license(&KeyAlgebra, " ", "", &index).expect("resolve");
        assert_eq!(resolved, ResolvedLicense::default());
    }

    #[test]
    fn test_unknown_key_is_fatal() {
        let snapshot = snapshot();
        let index = CatalogIndex::build(&snapshot).expect("index");
        let err = resolve_license(&KeyAlgebra, "", "l1 OR nope", &index).expect_err("unknown");
        match err.license_kind() {
            Some(LicenseErrorKind::UnknownKeys { keys, available }) => {
                assert_eq!(keys, &vec!["nope".to_string()]);
                assert_eq!(available.len(), 4);
            }
            other => panic!("expected UnknownKeys, got {other:?}"),
        }
    }

    #[test]
    fn test_markup_links_labels_and_parentheses() {
        let snapshot = snapshot();
        let index = CatalogIndex::build(&snapshot).expect("index");
        let tree = KeyAlgebra.parse("l1 AND (l2 OR l3)").expect("parse");
        let markup = markup(&tree, &index).expect("markup");
        assert_eq!(markup.to_string(), "l1 AND (l2 OR l3)");
        assert_eq!(markup.license_keys(), vec!["l1", "l2", "l3"]);
        assert!(markup.tokens().contains(&MarkupToken::License {
            key: "l2".to_string(),
            label: "License Two".to_string()
        }));
    }

    #[test]
    fn test_standard_notice_dedupes_and_skips_empty() {
        let snapshot = snapshot();
        let index = CatalogIndex::build(&snapshot).expect("index");
        let notice = standard_notice(&KeyAlgebra, "l1 AND l4 AND (l2 OR l3) AND l1", &index)
            .expect("notice");
        assert_eq!(notice.as_deref(), Some("Notice one\n\nNotice two"));
        assert_eq!(
            standard_notice(&KeyAlgebra, "l4", &index).expect("notice"),
            None
        );
    }

    #[test]
    fn test_validation_accepts_via_choice() {
        let available = vec!["mit".to_string(), "apache-2.0".to_string()];
        let choices = vec![LicenseChoice::new("mit OR gpl-2.0", "mit")];
        let tree = validate_expression(&KeyAlgebra, "gpl-2.0 OR mit", &available, &choices)
            .expect("choice resolves the unknown key");
        assert_eq!(tree.to_string(), "mit");
    }

    #[test]
    fn test_validation_chains_choices_in_table_order() {
        let available = vec!["z".to_string()];
        let narrowed = vec![
            LicenseChoice::new("a OR b", "a"),
            LicenseChoice::new("a", "z"),
        ];
        let tree = validate_expression(&KeyAlgebra, "a OR b", &available, &narrowed)
            .expect("second choice applies to the first one's output");
        assert_eq!(tree.to_string(), "z");

        let renamed = vec![
            LicenseChoice::new("x", "y"),
            LicenseChoice::new("y OR z", "z"),
        ];
        let tree = validate_expression(&KeyAlgebra, "x OR z", &available, &renamed)
            .expect("renamed key completes the second choice");
        assert_eq!(tree.to_string(), "z");
    }

    #[test]
    fn test_validation_reports_remaining_keys_with_available() {
        let available = vec!["mit".to_string(), "apache-2.0".to_string()];
        let choices = vec![LicenseChoice::new("mit OR gpl-2.0", "mit")];
        let err = validate_expression(&KeyAlgebra, "bsd AND (gpl-2.0 OR mit)", &available, &choices)
            .expect_err("bsd stays unknown");
        let kind = err.license_kind().expect("license error");
        assert_eq!(
            kind.to_string(),
            "Unknown license key(s): bsd. Available licenses: apache-2.0, mit"
        );
    }
}
