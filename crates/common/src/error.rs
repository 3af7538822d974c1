//! Error types for Stepwise

use thiserror::Error;

/// Result type alias using the Stepwise model Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while validating test cases and execution settings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid test case '{test_case}': {reason}")]
    InvalidTestCase { test_case: String, reason: String },

    #[error("Duplicate step order {order} in test case '{test_case}'")]
    DuplicateStepOrder { test_case: String, order: u32 },
}
