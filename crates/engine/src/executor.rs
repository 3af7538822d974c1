//! Single-step execution against a step runner

use std::sync::Arc;

use tracing::{debug, warn};

use stepwise_common::{ExecutionSettings, Step, StepStatus};

use crate::runner::StepRunner;

/// Terminal outcome of one attempt of one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepVerdict {
    /// Always one of Passed, Failed or Error
    pub status: StepStatus,
    pub actual_result: Option<String>,
    pub error: Option<String>,
}

impl StepVerdict {
    pub fn passed(actual_result: String) -> Self {
        Self {
            status: StepStatus::Passed,
            actual_result: Some(actual_result),
            error: None,
        }
    }

    pub fn failed(actual_result: String, error: String) -> Self {
        Self {
            status: StepStatus::Failed,
            actual_result: Some(actual_result),
            error: Some(error),
        }
    }

    pub fn harness_error(error: String) -> Self {
        Self {
            status: StepStatus::Error,
            actual_result: None,
            error: Some(error),
        }
    }
}

/// Runs one attempt of a step and judges it against the expected result.
#[derive(Clone)]
pub struct StepExecutor {
    runner: Arc<dyn StepRunner>,
}

impl StepExecutor {
    pub fn new(runner: Arc<dyn StepRunner>) -> Self {
        Self { runner }
    }

    pub fn runner_name(&self) -> &str {
        self.runner.name()
    }

    pub async fn execute(&self, step: &Step, settings: &ExecutionSettings) -> StepVerdict {
        debug!(
            step = %step.id,
            order = step.order,
            runner = self.runner.name(),
            "Executing step"
        );

        match self.runner.run_step(step, settings).await {
            Ok(observation) => {
                let actual = observation.actual_result;
                if actual.trim() == step.expected_result.trim() {
                    StepVerdict::passed(actual)
                } else {
                    let error = format!(
                        "Expected '{}' but got '{}'",
                        step.expected_result, actual
                    );
                    StepVerdict::failed(actual, error)
                }
            }
            Err(e) => {
                warn!(step = %step.id, "Step runner error: {}", e);
                StepVerdict::harness_error(e.to_string())
            }
        }
    }
}
