//! Configuration validation for attribution-tools.
//!
//! Provides validation traits and implementations for all configuration types.

use super::types::{AppConfig, AttributionConfig, OutputConfig, TocMode};

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.attribution.validate());
        errors.extend(self.output.validate());
        errors
    }
}

impl Validatable for AttributionConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.group_by_feature && self.toc == TocMode::Flat {
            errors.push(ConfigError {
                field: "attribution.group_by_feature".to_string(),
                message: "Grouping by feature requires the nested table of contents".to_string(),
            });
        }

        let active = self.active_query_count();
        if active > 1 {
            errors.push(ConfigError {
                field: "attribution.component_query".to_string(),
                message: format!("Only one ad-hoc query may be active at a time, got {active}"),
            });
        }

        if self.max_depth == 0 {
            errors.push(ConfigError {
                field: "attribution.max_depth".to_string(),
                message: "Max depth must be at least 1".to_string(),
            });
        }

        errors
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Some(ref file_path) = self.file {
            if let Some(parent) = file_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    errors.push(ConfigError {
                        field: "output.file".to_string(),
                        message: format!("Parent directory does not exist: {}", parent.display()),
                    });
                }
            }
        }

        errors
    }
}
