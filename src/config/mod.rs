//! Configuration module for attribution-tools.
//!
//! This module provides a unified configuration system with:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use attribution_tools::config::{AttributionConfig, TocMode};
//!
//! let config = AttributionConfig::builder()
//!     .expand_subcomponents(true)
//!     .toc(TocMode::Nested)
//!     .group_by_feature(true)
//!     .build();
//!
//! // Load from file
//! use attribution_tools::config::file::load_or_default;
//! let (config, loaded_from) = load_or_default(None);
//! ```
//!
//! # Configuration File
//!
//! Place a `.attribution-tools.yaml` file in your project root or
//! `~/.config/attribution-tools/`:
//!
//! ```yaml
//! attribution:
//!   expand_subcomponents: true
//!   toc: nested
//! output:
//!   format: html
//! ```

pub mod file;
mod types;
mod validation;

pub use types::{
    AppConfig, AttributionConfig, AttributionConfigBuilder, CheckLicenseConfig, ExpressionSyntax,
    GenerateConfig, LicensingConfig, OutputConfig, TocMode, DEFAULT_MAX_DEPTH,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    ConfigFileError,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// The schema documents every option accepted in `.attribution-tools.yaml`
/// and can be used by editors for validation and autocompletion.
pub fn generate_json_schema() -> crate::Result<String> {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema).map_err(|e| {
        crate::AttributionError::report(
            "serializing config schema",
            crate::error::ReportErrorKind::JsonSerializationError(e.to_string()),
        )
    })
}
