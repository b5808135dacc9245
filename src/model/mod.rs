//! Data model for attribution generation.
//!
//! Inputs are read-only catalog snapshots ([`ProductSnapshot`] and the
//! records it holds); outputs are [`AttributionNode`] values arranged into
//! an [`AttributionDocument`].
//!
//! # Index Support
//!
//! Build a [`CatalogIndex`] once per run to resolve item references and
//! subcomponent edges in O(1):
//!
//! ```ignore
//! let index = CatalogIndex::build(&snapshot)?;
//! let edges = index.children_of(&item_id);
//! ```

mod catalog;
mod document;
mod index;
mod node;

pub use catalog::*;
pub use document::*;
pub use index::*;
pub use node::*;

#[cfg(test)]
pub(crate) use node::test_support;
