//! Check-license command handler.
//!
//! Validates a single license expression against the licenses a snapshot
//! makes available, the way an interactive form field would before saving.

use crate::config::CheckLicenseConfig;
use crate::error::AttributionError;
use crate::license::{algebra_for, validate_expression};
use crate::pipeline::{exit_codes, load_snapshot};
use anyhow::Result;

/// Run the check-license command, returning the desired exit code.
#[allow(clippy::needless_pass_by_value)]
pub fn run_check_license(config: CheckLicenseConfig) -> Result<i32> {
    let snapshot = load_snapshot(&config.snapshot_path)?;
    let algebra = algebra_for(config.syntax);

    let available = config.keys.clone().unwrap_or_else(|| {
        snapshot
            .licenses
            .iter()
            .map(|license| license.key.clone())
            .collect()
    });

    match validate_expression(
        algebra.as_ref(),
        &config.expression,
        &available,
        &snapshot.license_choices,
    ) {
        Ok(tree) => {
            println!("{tree}");
            Ok(exit_codes::SUCCESS)
        }
        Err(e @ AttributionError::License { .. }) => {
            tracing::debug!("Expression rejected by the {} algebra", algebra.name());
            match e.license_kind() {
                Some(kind) => eprintln!("{e}: {kind}"),
                None => eprintln!("{e}"),
            }
            Ok(exit_codes::VALIDATION_FAILED)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExpressionSyntax;

    const SNAPSHOT: &str = r#"{
        "licenses": [
            {"key": "mit", "short_name": "MIT License"},
            {"key": "gpl-2.0", "short_name": "GPL 2.0"}
        ],
        "license_choices": [
            {"from_expression": "mit OR bsd-new", "to_expression": "mit"}
        ]
    }"#;

    fn config(dir: &std::path::Path, expression: &str, keys: Option<Vec<String>>) -> CheckLicenseConfig {
        let snapshot_path = dir.join("snapshot.json");
        std::fs::write(&snapshot_path, SNAPSHOT).unwrap();
        CheckLicenseConfig {
            expression: expression.to_string(),
            snapshot_path,
            keys,
            syntax: ExpressionSyntax::Catalog,
        }
    }

    #[test]
    fn test_known_keys_pass() {
        let tmp = tempfile::TempDir::new().unwrap();
        let code = run_check_license(config(tmp.path(), "mit AND gpl-2.0", None)).unwrap();
        assert_eq!(code, exit_codes::SUCCESS);
    }

    #[test]
    fn test_choice_resolves_unknown_key() {
        let tmp = tempfile::TempDir::new().unwrap();
        let code = run_check_license(config(tmp.path(), "mit OR bsd-new", None)).unwrap();
        assert_eq!(code, exit_codes::SUCCESS);
    }

    #[test]
    fn test_restricted_keys_reject() {
        let tmp = tempfile::TempDir::new().unwrap();
        let code = run_check_license(config(
            tmp.path(),
            "gpl-2.0",
            Some(vec!["mit".to_string()]),
        ))
        .unwrap();
        assert_eq!(code, exit_codes::VALIDATION_FAILED);
    }
}
