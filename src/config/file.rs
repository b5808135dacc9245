//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::types::{AppConfig, AttributionConfig, ExpressionSyntax};
use crate::reports::ReportFormat;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
const CONFIG_FILE_NAMES: &[&str] = &[
    ".attribution-tools.yaml",
    ".attribution-tools.yml",
    "attribution-tools.yaml",
    "attribution-tools.yml",
];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/attribution-tools/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    if let Some(path) = std::env::current_dir()
        .ok()
        .and_then(|cwd| find_config_in_dir(&cwd))
    {
        return Some(path);
    }

    if let Some(path) = find_git_root().and_then(|root| find_config_in_dir(&root)) {
        return Some(path);
    }

    if let Some(path) =
        dirs::config_dir().and_then(|dir| find_config_in_dir(&dir.join("attribution-tools")))
    {
        return Some(path);
    }

    dirs::home_dir().and_then(|home| find_config_in_dir(&home))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();

    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml_ng::Error),
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml_ng::from_str(&content)?;
    Ok(config)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Configuration Merging
// ============================================================================

impl AppConfig {
    /// Merge another config into this one, with `other` taking precedence.
    ///
    /// Values equal to the defaults in `other` are treated as unset, so
    /// layering CLI args over a file config only overrides what was given.
    pub fn merge(&mut self, other: &Self) {
        let defaults = AttributionConfig::default();
        let a = &mut self.attribution;
        let b = &other.attribution;

        // Booleans - if set to true, override
        a.include_custom |= b.include_custom;
        a.include_packages |= b.include_packages;
        a.expand_subcomponents |= b.expand_subcomponents;
        a.all_license_texts |= b.all_license_texts;
        a.group_by_feature |= b.group_by_feature;
        a.include_homepage_url |= b.include_homepage_url;
        a.include_standard_notice |= b.include_standard_notice;

        if b.toc != defaults.toc {
            a.toc = b.toc;
        }
        if b.max_depth != defaults.max_depth {
            a.max_depth = b.max_depth;
        }
        if b.component_query.is_some() {
            a.component_query.clone_from(&b.component_query);
        }
        if b.package_query.is_some() {
            a.package_query.clone_from(&b.package_query);
        }

        // Output config - only override if explicitly set
        if other.output.format != ReportFormat::default() {
            self.output.format = other.output.format;
        }
        if other.output.file.is_some() {
            self.output.file.clone_from(&other.output.file);
        }

        if other.licensing.syntax != ExpressionSyntax::default() {
            self.licensing.syntax = other.licensing.syntax;
        }
    }

    /// Load from file and merge with CLI overrides.
    #[must_use]
    pub fn from_file_with_overrides(
        config_path: Option<&Path>,
        cli_overrides: &Self,
    ) -> (Self, Option<PathBuf>) {
        let (mut config, loaded_from) = load_or_default(config_path);
        config.merge(cli_overrides);
        (config, loaded_from)
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate an example config file content.
#[must_use]
pub fn generate_example_config() -> String {
    format!(
        r"# Attribution document configuration
# Place this file at .attribution-tools.yaml in your project root or ~/.config/attribution-tools/

{}
",
        serde_yaml_ng::to_string(&AppConfig::default()).unwrap_or_default()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TocMode;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_dir() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join(".attribution-tools.yaml");
        std::fs::write(&config_path, "attribution:\n  toc: nested\n").unwrap();

        assert_eq!(find_config_in_dir(tmp.path()), Some(config_path));
    }

    #[test]
    fn test_find_config_in_dir_not_found() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(find_config_in_dir(tmp.path()), None);
    }

    #[test]
    fn test_load_config_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.yaml");
        let yaml = r"
attribution:
  toc: nested
  group_by_feature: true
  component_query:
    owner: acme
output:
  format: csv
licensing:
  syntax: spdx
";
        std::fs::write(&config_path, yaml).unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.attribution.toc, TocMode::Nested);
        assert!(config.attribution.group_by_feature);
        assert_eq!(
            config
                .attribution
                .component_query
                .and_then(|q| q.owner)
                .as_deref(),
            Some("acme")
        );
        assert_eq!(config.output.format, ReportFormat::Csv);
        assert_eq!(config.licensing.syntax, ExpressionSyntax::Spdx);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config_file(Path::new("/nonexistent/config.yaml"));
        assert!(matches!(result, Err(ConfigFileError::NotFound(_))));
    }

    #[test]
    fn test_config_merge() {
        let mut base = AppConfig::default();
        base.attribution.toc = TocMode::Nested;
        base.attribution.max_depth = 8;

        let mut overrides = AppConfig::default();
        overrides.attribution.expand_subcomponents = true;
        overrides.output.format = ReportFormat::Json;

        base.merge(&overrides);

        assert_eq!(base.attribution.toc, TocMode::Nested);
        assert_eq!(base.attribution.max_depth, 8);
        assert!(base.attribution.expand_subcomponents);
        assert_eq!(base.output.format, ReportFormat::Json);
    }

    #[test]
    fn test_discover_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("custom-config.yaml");
        std::fs::write(&config_path, "output:\n  format: json\n").unwrap();

        assert_eq!(discover_config_file(Some(&config_path)), Some(config_path));
    }

    #[test]
    fn test_generate_example_config() {
        let example = generate_example_config();
        assert!(example.contains("attribution:"));
        assert!(example.contains("max_depth: 32"));
    }
}
