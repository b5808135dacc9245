//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler returns the process exit code instead of exiting itself.

mod check;
mod generate;

pub use check::run_check_license;
pub use generate::run_generate;

// Re-export config types used by handlers
pub use crate::config::{CheckLicenseConfig, GenerateConfig};
