//! Expression algebra backed by the `spdx` crate.
//!
//! Uses lax parsing so common non-standard spellings ("Apache2", "/" as
//! OR, lowercase operators) resolve to canonical SPDX identifiers. Keys in
//! the resulting tree are canonical SPDX ids, so the snapshot's license
//! table must be keyed the same way.

use super::{LicenseAlgebra, LicenseSymbol, LicenseTree};
use crate::error::{AttributionError, LicenseErrorKind, Result};
use ::spdx::expression::{ExprNode, Operator};

/// Algebra for catalogs keyed by SPDX license identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpdxAlgebra;

impl SpdxAlgebra {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LicenseAlgebra for SpdxAlgebra {
    fn name(&self) -> &'static str {
        "spdx"
    }

    fn parse(&self, expression: &str) -> Result<LicenseTree> {
        let invalid = |reason: String| {
            AttributionError::license(
                "parsing SPDX expression",
                LicenseErrorKind::InvalidExpression {
                    expression: expression.to_string(),
                    reason,
                },
            )
        };

        let parsed = ::spdx::Expression::parse_mode(expression, ::spdx::ParseMode::LAX)
            .map_err(|e| invalid(e.to_string()))?;

        // The crate exposes the expression in postfix order.
        let mut stack: Vec<LicenseTree> = Vec::new();
        for node in parsed.iter() {
            match node {
                ExprNode::Req(req) => {
                    let key = match &req.req.license {
                        ::spdx::LicenseItem::Spdx { id, or_later } => {
                            if *or_later {
                                format!("{}+", id.name)
                            } else {
                                id.name.to_string()
                            }
                        }
                        ::spdx::LicenseItem::Other { lic_ref, .. } => format!("LicenseRef-{lic_ref}"),
                    };
                    let mut symbol = LicenseSymbol::new(key);
                    if let Some(exception) = &req.req.exception {
                        symbol = symbol.with_exception(exception.name);
                    }
                    stack.push(LicenseTree::Symbol(symbol));
                }
                ExprNode::Op(op) => {
                    let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                        return Err(invalid("operator without operands".to_string()));
                    };
                    stack.push(match op {
                        Operator::And => LicenseTree::and(left, right),
                        Operator::Or => LicenseTree::or(left, right),
                    });
                }
            }
        }

        match (stack.pop(), stack.is_empty()) {
            (Some(tree), true) => Ok(tree),
            _ => Err(invalid("dangling operands".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonicalizes_ids() {
        let tree = SpdxAlgebra.parse("mit AND apache-2.0").expect("lax parse");
        assert_eq!(tree.license_keys(), vec!["MIT", "Apache-2.0"]);
    }

    #[test]
    fn test_exception_is_kept() {
        let tree = SpdxAlgebra
            .parse("GPL-2.0-only WITH Classpath-exception-2.0")
            .expect("parse");
        assert_eq!(
            tree.all_keys(),
            vec!["GPL-2.0-only", "Classpath-exception-2.0"]
        );
    }

    #[test]
    fn test_equivalence_ignores_operand_order() {
        assert!(SpdxAlgebra
            .equivalent("MIT OR Apache-2.0", "Apache-2.0 OR MIT")
            .expect("parse"));
        assert!(!SpdxAlgebra
            .equivalent("MIT OR Apache-2.0", "MIT AND Apache-2.0")
            .expect("parse"));
    }

    #[test]
    fn test_invalid_expression_is_reported() {
        let err = SpdxAlgebra.parse("MIT AND").expect_err("dangling operator");
        assert!(matches!(
            err.license_kind(),
            Some(LicenseErrorKind::InvalidExpression { .. })
        ));
    }
}
