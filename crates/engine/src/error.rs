//! Error types for the execution engine

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Settings or test case rejected before any step ran
    #[error("Configuration error: {0}")]
    Config(#[from] stepwise_common::Error),

    #[error("Test case parse error in {path}: {reason}")]
    TestCaseParse { path: PathBuf, reason: String },

    #[error("Unsupported test case file: {0}")]
    UnsupportedFile(PathBuf),

    #[error("Execution task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}

impl EngineError {
    /// True for errors raised before an execution was created
    pub fn is_config(&self) -> bool {
        matches!(self, EngineError::Config(_))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
