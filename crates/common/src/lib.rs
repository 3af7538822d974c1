//! Stepwise Common Library
//!
//! Shared data model for the Stepwise test execution engine: test cases,
//! execution settings, execution records and their log lines.

pub mod error;
pub mod execution;
pub mod log;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use execution::{Execution, StepExecution};
pub use log::{LogEntry, LogLevel, MonotonicClock};
pub use types::*;

/// Stepwise version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
