//! Generate command handler.
//!
//! Implements the `generate` subcommand: snapshot in, rendered attribution
//! document out.

use crate::attribution::AttributionEngine;
use crate::config::{GenerateConfig, Validatable};
use crate::error::AttributionError;
use crate::license::algebra_for;
use crate::pipeline::{exit_codes, load_snapshot, write_output, OutputTarget};
use crate::reports::create_reporter;
use anyhow::Result;

/// Run the generate command, returning the desired exit code.
///
/// Rejected option combinations are reported and mapped to
/// [`exit_codes::VALIDATION_FAILED`]; every other failure is an error.
#[allow(clippy::needless_pass_by_value)]
pub fn run_generate(config: GenerateConfig) -> Result<i32> {
    let output_errors = config.output.validate();
    if !output_errors.is_empty() {
        for error in &output_errors {
            eprintln!("Invalid output options: {error}");
        }
        return Ok(exit_codes::VALIDATION_FAILED);
    }

    let snapshot = load_snapshot(&config.snapshot_path)?;

    let engine =
        AttributionEngine::new(config.attribution.clone()).with_algebra(algebra_for(config.syntax));
    let document = match engine.assemble(&snapshot) {
        Ok(document) => document,
        Err(AttributionError::Config(message)) => {
            tracing::error!("Invalid attribution options: {message}");
            eprintln!("Invalid attribution options: {message}");
            return Ok(exit_codes::VALIDATION_FAILED);
        }
        Err(e) => return Err(e.into()),
    };

    if document.is_truncated() {
        tracing::warn!(
            "Document was truncated in {} place(s); see the warnings section",
            document.warnings.len()
        );
    }

    let reporter = create_reporter(config.output.format);
    let content = reporter.generate(&document)?;
    write_output(&content, &OutputTarget::from_option(config.output.file.clone()))?;

    Ok(exit_codes::SUCCESS)
}
