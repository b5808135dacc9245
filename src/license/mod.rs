//! License expression handling.
//!
//! Expression grammar and equivalence live behind the [`LicenseAlgebra`]
//! trait so the attribution engine never depends on a particular syntax:
//!
//! - [`KeyAlgebra`] parses expressions written with catalog license keys.
//! - [`SpdxAlgebra`] parses SPDX expressions through the `spdx` crate.
//!
//! On top of the algebra, [`resolve_license`] decides which credit lines a
//! node shows, [`standard_notice`] concatenates per-license boilerplate and
//! [`validate_expression`] checks a user-supplied expression against a
//! restricted key set, honoring approved [`LicenseChoice`]s.
//!
//! [`LicenseChoice`]: crate::model::LicenseChoice

mod keys;
mod resolver;
mod spdx_algebra;
mod tree;

pub use keys::KeyAlgebra;
pub use resolver::{markup, resolve_license, standard_notice, validate_expression, ResolvedLicense};
pub use spdx_algebra::SpdxAlgebra;
pub use tree::{Dnf, LicenseSymbol, LicenseTree, MAX_DNF_TERMS, MAX_SUBSTITUTION_PASSES};

use crate::config::ExpressionSyntax;
use crate::error::Result;
use crate::model::LicenseChoice;

/// Boolean algebra over license expressions.
///
/// Implementors only need [`parse`](Self::parse); equivalence and choice
/// substitution have default implementations over [`LicenseTree`].
pub trait LicenseAlgebra: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Parse an expression into a tree.
    fn parse(&self, expression: &str) -> Result<LicenseTree>;

    /// Whether two expressions grant the same license combinations.
    fn equivalent(&self, left: &str, right: &str) -> Result<bool> {
        Ok(self.parse(left)?.equivalent(&self.parse(right)?))
    }

    /// Parse `expression` and apply every matching license choice.
    fn substitute(&self, expression: &str, choices: &[LicenseChoice]) -> Result<LicenseTree> {
        let rules = choices
            .iter()
            .map(|choice| {
                Ok((
                    self.parse(&choice.from_expression)?,
                    self.parse(&choice.to_expression)?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.parse(expression)?.substitute(&rules))
    }
}

/// Create the algebra for a configured expression syntax.
#[must_use]
pub fn algebra_for(syntax: ExpressionSyntax) -> Box<dyn LicenseAlgebra> {
    match syntax {
        ExpressionSyntax::Catalog => Box::new(KeyAlgebra::new()),
        ExpressionSyntax::Spdx => Box::new(SpdxAlgebra::new()),
    }
}
