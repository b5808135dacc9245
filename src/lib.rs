//! **Generate open source attribution documents from catalog snapshots.**
//!
//! `attribution-tools` turns a point-in-time view of a product (its
//! components, packages, custom placeholders, the subcomponent edges between
//! them and the license table) into an attribution notice: every item the
//! product ships, the license each is used under, and the full text of every
//! referenced license.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: snapshot inputs ([`ProductSnapshot`]) and document
//!   outputs ([`AttributionDocument`], [`AttributionNode`]).
//! - **[`license`]**: license expression algebra, credit-line resolution and
//!   expression validation against an allowed key set.
//! - **[`attribution`]**: the [`AttributionEngine`], which selects
//!   relationships, walks the subcomponent hierarchy, deduplicates nodes and
//!   assembles the document.
//! - **[`reports`]**: HTML, JSON and CSV renderers.
//! - **[`pipeline`]**: snapshot loading and output writing shared by the CLI.
//!
//! ## Getting Started
//!
//! ```no_run
//! use std::path::Path;
//! use attribution_tools::{AttributionConfig, AttributionEngine, TocMode};
//! use attribution_tools::pipeline::load_snapshot;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let snapshot = load_snapshot(Path::new("path/to/snapshot.json"))?;
//!
//!     let config = AttributionConfig::builder()
//!         .expand_subcomponents(true)
//!         .toc(TocMode::Nested)
//!         .build();
//!     let document = AttributionEngine::new(config).assemble(&snapshot)?;
//!
//!     println!(
//!         "{} unique entries, {} license texts",
//!         document.index.len(),
//!         document.licenses.len()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Command-Line Interface (CLI)
//!
//! This documentation is for the library crate. The `attribution-tools`
//! binary wraps it with `generate` and `check-license` subcommands.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
// Pedantic lints: allow categories that are design choices for this codebase
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    // Config structs legitimately use many bools for toggle flags
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::similar_names
)]

pub mod attribution;
pub mod cli;
pub mod config;
pub mod error;
pub mod license;
pub mod model;
pub mod pipeline;
pub mod reports;

// Re-export main types for convenience
pub use attribution::{AttributionEngine, ItemFilter, NodeIndex};
pub use config::{AppConfig, AttributionConfig, ExpressionSyntax, OutputConfig, TocMode};
pub use config::{ConfigError, Validatable};
pub use error::{AttributionError, ErrorContext, Result};
pub use license::{algebra_for, KeyAlgebra, LicenseAlgebra, SpdxAlgebra};
pub use model::{
    AttributionDocument, AttributionNode, CatalogIndex, ChildEdge, CustomItem, Item, ItemId,
    ItemKind, License, LicenseChoice, Product, ProductSnapshot, Relationship,
};
pub use reports::{create_reporter, ReportFormat, ReportGenerator};
