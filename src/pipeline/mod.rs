//! Pipeline orchestration for attribution operations.
//!
//! Shared load → assemble → render → write steps used by the CLI command
//! handlers.

mod load;
mod output;

pub use load::{load_snapshot, parse_snapshot_str, SnapshotFormat};
pub use output::{write_output, OutputTarget};

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// The checked expression or configuration was rejected
    pub const VALIDATION_FAILED: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 3;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_values() {
        assert_eq!(exit_codes::SUCCESS, 0);
        assert_eq!(exit_codes::VALIDATION_FAILED, 1);
        assert_eq!(exit_codes::ERROR, 3);
    }
}
