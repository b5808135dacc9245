//! Attribution document computation.
//!
//! The pipeline is a pure transform from a [`ProductSnapshot`] plus an
//! [`AttributionConfig`] into an [`AttributionDocument`]:
//!
//! - [`HierarchyWalker`] builds one entry per relationship, following
//!   subcomponent edges when asked and guarding against cycles.
//! - [`NodeIndex`] collapses equal nodes into one slot with a stable anchor.
//! - [`AttributionEngine`] validates the configuration, selects and groups
//!   relationships and assembles the document.
//!
//! [`ProductSnapshot`]: crate::model::ProductSnapshot
//! [`AttributionConfig`]: crate::config::AttributionConfig
//! [`AttributionDocument`]: crate::model::AttributionDocument

mod assembler;
mod index;
mod query;
mod walker;

pub use assembler::AttributionEngine;
pub use index::{IndexedNode, NodeIndex};
pub use query::{ItemFilter, ItemQuery};
pub use walker::HierarchyWalker;
