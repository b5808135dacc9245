//! Unified error types for attribution-tools.
//!
//! This module provides the error hierarchy for the library, with rich
//! context for debugging and user-friendly messages.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for attribution-tools operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AttributionError {
    /// Invalid attribution configuration, reported before any traversal
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// License expression resolution failures
    #[error("License resolution failed: {context}")]
    License {
        context: String,
        #[source]
        source: LicenseErrorKind,
    },

    /// Malformed or inconsistent product snapshots
    #[error("Invalid product snapshot: {context}")]
    Snapshot {
        context: String,
        #[source]
        source: SnapshotErrorKind,
    },

    /// Errors during document rendering
    #[error("Report generation failed: {context}")]
    Report {
        context: String,
        #[source]
        source: ReportErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Specific license error kinds
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LicenseErrorKind {
    /// Keys that stayed unresolved after every applicable license choice.
    #[error(
        "Unknown license key(s): {}. Available licenses: {}",
        .keys.join(", "),
        .available.join(", ")
    )]
    UnknownKeys {
        keys: Vec<String>,
        available: Vec<String>,
    },

    #[error("Invalid license expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },
}

/// Specific snapshot error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SnapshotErrorKind {
    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Invalid YAML structure: {0}")]
    InvalidYaml(String),

    #[error("Unknown item '{item}' referenced by {referenced_by}")]
    DanglingItem { item: String, referenced_by: String },
}

/// Specific report error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReportErrorKind {
    #[error("JSON serialization failed: {0}")]
    JsonSerializationError(String),

    #[error("Formatting failed: {0}")]
    FormatError(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for attribution-tools operations
pub type Result<T> = std::result::Result<T, AttributionError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl AttributionError {
    /// Create a license error with context
    pub fn license(context: impl Into<String>, source: LicenseErrorKind) -> Self {
        Self::License {
            context: context.into(),
            source,
        }
    }

    /// Create a license error for keys missing from the available set
    pub fn unknown_keys(
        context: impl Into<String>,
        keys: Vec<String>,
        available: Vec<String>,
    ) -> Self {
        Self::license(context, LicenseErrorKind::UnknownKeys { keys, available })
    }

    /// Create a snapshot error with context
    pub fn snapshot(context: impl Into<String>, source: SnapshotErrorKind) -> Self {
        Self::Snapshot {
            context: context.into(),
            source,
        }
    }

    /// Create a snapshot error for a reference to an item that is not in the snapshot
    pub fn dangling_item(item: impl Into<String>, referenced_by: impl Into<String>) -> Self {
        Self::snapshot(
            "dangling reference",
            SnapshotErrorKind::DanglingItem {
                item: item.into(),
                referenced_by: referenced_by.into(),
            },
        )
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a report error
    pub fn report(context: impl Into<String>, source: ReportErrorKind) -> Self {
        Self::Report {
            context: context.into(),
            source,
        }
    }

    /// The license error kind, if this is a license error.
    pub fn license_kind(&self) -> Option<&LicenseErrorKind> {
        match self {
            Self::License { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for AttributionError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for AttributionError {
    fn from(err: serde_json::Error) -> Self {
        Self::snapshot(
            "JSON deserialization",
            SnapshotErrorKind::InvalidJson(err.to_string()),
        )
    }
}

impl From<serde_yaml_ng::Error> for AttributionError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        Self::snapshot(
            "YAML deserialization",
            SnapshotErrorKind::InvalidYaml(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Context strings are chained outermost first, so a failure deep in the
/// walker surfaces as `"relationship 'app': child 'zlib': base message"`.
///
/// # Example
///
/// ```ignore
/// use attribution_tools::error::ErrorContext;
///
/// let resolved = resolve_license(algebra, &edge.license_expression, &child.license_expression, licenses)
///     .with_context(|| format!("child '{}'", child.display_name()))?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure (lazy evaluation).
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<AttributionError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: AttributionError, new_ctx: &str) -> AttributionError {
    match err {
        AttributionError::License {
            context: existing,
            source,
        } => AttributionError::License {
            context: chain_context(new_ctx, &existing),
            source,
        },
        AttributionError::Snapshot {
            context: existing,
            source,
        } => AttributionError::Snapshot {
            context: chain_context(new_ctx, &existing),
            source,
        },
        AttributionError::Report {
            context: existing,
            source,
        } => AttributionError::Report {
            context: chain_context(new_ctx, &existing),
            source,
        },
        AttributionError::Io {
            path,
            message,
            source,
        } => AttributionError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        AttributionError::Config(msg) => AttributionError::Config(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_keys_message_lists_both_sets() {
        let err = AttributionError::unknown_keys(
            "concluded expression",
            vec!["gpl-3.0".to_string()],
            vec!["apache-2.0".to_string(), "mit".to_string()],
        );
        let display = err.to_string();
        assert!(display.contains("concluded expression"), "{display}");

        let kind = err.license_kind().expect("license error");
        let message = kind.to_string();
        assert_eq!(
            message,
            "Unknown license key(s): gpl-3.0. Available licenses: apache-2.0, mit"
        );
    }

    #[test]
    fn test_error_chain() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = AttributionError::io("/path/to/snapshot.json", io_err);

        assert!(err.to_string().contains("/path/to/snapshot.json"));
    }

    #[test]
    fn test_context_chaining_multiple_levels() {
        fn inner() -> Result<()> {
            Err(AttributionError::unknown_keys(
                "base",
                vec!["x".to_string()],
                Vec::new(),
            ))
        }

        fn middle() -> Result<()> {
            inner().context("child 'zlib'")
        }

        fn outer() -> Result<()> {
            middle().context("relationship 'app'")
        }

        match outer() {
            Err(AttributionError::License { context, .. }) => {
                assert_eq!(context, "relationship 'app': child 'zlib': base");
            }
            other => panic!("Expected License error, got {other:?}"),
        }
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let mut called = false;

        let ok_result: Result<i32> = Ok(42);
        let _ = ok_result.with_context(|| {
            called = true;
            "should not be called"
        });
        assert!(!called, "Closure should not be called for Ok result");

        let err_result: Result<i32> = Err(AttributionError::config("error"));
        let _ = err_result.with_context(|| {
            called = true;
            "should be called"
        });
        assert!(called, "Closure should be called for Err result");
    }

    #[test]
    fn test_json_error_converts_to_snapshot_error() {
        let err: AttributionError = serde_json::from_str::<serde_json::Value>("{")
            .map_err(AttributionError::from)
            .expect_err("invalid json");
        assert!(matches!(
            err,
            AttributionError::Snapshot {
                source: SnapshotErrorKind::InvalidJson(_),
                ..
            }
        ));
    }

    #[test]
    fn test_chain_context_helper() {
        assert_eq!(chain_context("new", ""), "new");
        assert_eq!(chain_context("new", "existing"), "new: existing");
    }
}
