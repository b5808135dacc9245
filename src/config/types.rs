//! Configuration types for attribution-tools operations.
//!
//! Provides structured configuration for document generation and license
//! checks.

use crate::attribution::ItemFilter;
use crate::reports::ReportFormat;
use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default cap on subcomponent nesting.
pub const DEFAULT_MAX_DEPTH: u32 = 32;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
///
/// Aggregates every option of the tool. It can be constructed from CLI
/// arguments, config files, or both (with CLI overriding file settings).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Attribution document options
    pub attribution: AttributionConfig,
    /// Output configuration (format, file)
    pub output: OutputConfig,
    /// License expression handling
    pub licensing: LicensingConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// Attribution Configuration
// ============================================================================

/// How the table of contents is laid out.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum TocMode {
    /// One line per unique node
    #[default]
    Flat,
    /// Mirrors the subcomponent hierarchy
    Nested,
}

impl std::fmt::Display for TocMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flat => write!(f, "flat"),
            Self::Nested => write!(f, "nested"),
        }
    }
}

/// Options controlling one attribution run.
///
/// Immutable once built; passed by reference through the whole traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AttributionConfig {
    /// Include custom (non-catalog) relationships
    pub include_custom: bool,
    /// Include package relationships alongside components
    pub include_packages: bool,
    /// Expand the subcomponent hierarchy
    pub expand_subcomponents: bool,
    /// Include license texts referenced at every level, not only the top
    pub all_license_texts: bool,
    /// Table of contents layout
    pub toc: TocMode,
    /// Surface feature tags as headers (nested TOC only)
    pub group_by_feature: bool,
    /// Show item homepage URLs
    pub include_homepage_url: bool,
    /// Show per-item standard notices
    pub include_standard_notice: bool,
    /// Ad-hoc filter applied to component relationships
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_query: Option<ItemFilter>,
    /// Ad-hoc filter applied to package relationships
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_query: Option<ItemFilter>,
    /// Maximum subcomponent depth below a top-level entry
    #[schemars(range(min = 1))]
    pub max_depth: u32,
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            include_custom: false,
            include_packages: false,
            expand_subcomponents: false,
            all_license_texts: false,
            toc: TocMode::Flat,
            group_by_feature: false,
            include_homepage_url: false,
            include_standard_notice: false,
            component_query: None,
            package_query: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl AttributionConfig {
    /// Create an `AttributionConfig` builder.
    pub fn builder() -> AttributionConfigBuilder {
        AttributionConfigBuilder::default()
    }

    /// Number of configured queries that actually restrict something
    #[must_use]
    pub fn active_query_count(&self) -> usize {
        [&self.component_query, &self.package_query]
            .into_iter()
            .flatten()
            .filter(|query| !query.is_empty())
            .count()
    }
}

// ============================================================================
// Builder for AttributionConfig
// ============================================================================

/// Builder for constructing `AttributionConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AttributionConfigBuilder {
    config: AttributionConfig,
}

impl AttributionConfigBuilder {
    /// Include custom relationships.
    pub const fn include_custom(mut self, include: bool) -> Self {
        self.config.include_custom = include;
        self
    }

    /// Include package relationships.
    pub const fn include_packages(mut self, include: bool) -> Self {
        self.config.include_packages = include;
        self
    }

    /// Expand subcomponents.
    pub const fn expand_subcomponents(mut self, expand: bool) -> Self {
        self.config.expand_subcomponents = expand;
        self
    }

    /// Include license texts from every level.
    pub const fn all_license_texts(mut self, all: bool) -> Self {
        self.config.all_license_texts = all;
        self
    }

    /// Set the table of contents layout.
    pub const fn toc(mut self, toc: TocMode) -> Self {
        self.config.toc = toc;
        self
    }

    /// Surface feature groups.
    pub const fn group_by_feature(mut self, group: bool) -> Self {
        self.config.group_by_feature = group;
        self
    }

    /// Show homepage URLs.
    pub const fn include_homepage_url(mut self, include: bool) -> Self {
        self.config.include_homepage_url = include;
        self
    }

    /// Show standard notices.
    pub const fn include_standard_notice(mut self, include: bool) -> Self {
        self.config.include_standard_notice = include;
        self
    }

    /// Filter component relationships.
    pub fn component_query(mut self, query: ItemFilter) -> Self {
        self.config.component_query = Some(query);
        self
    }

    /// Filter package relationships.
    pub fn package_query(mut self, query: ItemFilter) -> Self {
        self.config.package_query = Some(query);
        self
    }

    /// Set the maximum subcomponent depth.
    pub const fn max_depth(mut self, depth: u32) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Build the `AttributionConfig`.
    #[must_use]
    pub fn build(self) -> AttributionConfig {
        self.config
    }
}

// ============================================================================
// Sub-configuration Types
// ============================================================================

/// Output-related configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: ReportFormat,
    /// Output file path (None for stdout)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Syntax of license expressions in the snapshot.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ExpressionSyntax {
    /// Catalog license keys (`mit`, `apache-2.0`, `LicenseRef-acme`)
    #[default]
    Catalog,
    /// SPDX license identifiers
    Spdx,
}

/// License expression handling
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LicensingConfig {
    /// Expression syntax used by the snapshot
    pub syntax: ExpressionSyntax,
}

// ============================================================================
// Command-specific Configuration Types
// ============================================================================

/// Configuration for generate operations
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Path to the product snapshot (JSON or YAML)
    pub snapshot_path: PathBuf,
    /// Attribution options
    pub attribution: AttributionConfig,
    /// Output configuration
    pub output: OutputConfig,
    /// Expression syntax
    pub syntax: ExpressionSyntax,
}

/// Configuration for check-license operations
#[derive(Debug, Clone)]
pub struct CheckLicenseConfig {
    /// Expression to validate
    pub expression: String,
    /// Snapshot providing licenses and license choices
    pub snapshot_path: PathBuf,
    /// Restricted set of available keys (all snapshot licenses when None)
    pub keys: Option<Vec<String>>,
    /// Expression syntax
    pub syntax: ExpressionSyntax,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AttributionConfig::default();
        assert_eq!(config.toc, TocMode::Flat);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(!config.expand_subcomponents);
        assert_eq!(config.active_query_count(), 0);
    }

    #[test]
    fn test_builder() {
        let config = AttributionConfig::builder()
            .toc(TocMode::Nested)
            .group_by_feature(true)
            .expand_subcomponents(true)
            .max_depth(4)
            .build();
        assert_eq!(config.toc, TocMode::Nested);
        assert!(config.group_by_feature);
        assert_eq!(config.max_depth, 4);
    }

    #[test]
    fn test_empty_query_is_not_active() {
        let config = AttributionConfig::builder()
            .component_query(ItemFilter::default())
            .package_query(ItemFilter {
                name: Some("zlib".to_string()),
                ..Default::default()
            })
            .build();
        assert_eq!(config.active_query_count(), 1);
    }

    #[test]
    fn test_yaml_roundtrip_uses_lowercase_enums() {
        let yaml = "toc: nested\ngroup_by_feature: true\n";
        let config: AttributionConfig = serde_yaml_ng::from_str(yaml).expect("parse");
        assert_eq!(config.toc, TocMode::Nested);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }
}
