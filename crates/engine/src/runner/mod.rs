//! Step runner capability
//!
//! A step runner performs one step against the system under test (a browser
//! driver, an API client, a simulator) and reports what it observed. It never
//! decides pass/fail and never retries; both belong to the engine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stepwise_common::{ExecutionSettings, Step};

mod scripted;
mod simulated;

pub use scripted::{ScriptedOutcome, ScriptedRunner};
pub use simulated::{SimulatedRunner, SimulatorConfig};

/// What the runner observed after performing a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepObservation {
    pub actual_result: String,
}

impl StepObservation {
    pub fn new(actual_result: impl Into<String>) -> Self {
        Self {
            actual_result: actual_result.into(),
        }
    }
}

/// Infrastructure faults raised by the runner itself
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Driver crashed: {0}")]
    Crashed(String),

    #[error("Driver unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait StepRunner: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Perform a single attempt of `step`
    async fn run_step(
        &self,
        step: &Step,
        settings: &ExecutionSettings,
    ) -> Result<StepObservation, RunnerError>;
}
