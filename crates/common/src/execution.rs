//! Runtime records produced by running a test case

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::log::LogEntry;
use crate::types::{ExecutionResult, ExecutionSettings, ExecutionStatus, Step, StepStatus, TestCase};

/// The record of attempting one step during one execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepExecution {
    /// Fresh per execution; the same step gets a new id on every run
    pub id: Uuid,
    /// Back-reference to the source step
    pub step_id: String,
    pub order: u32,
    pub description: String,
    pub expected_result: String,
    pub actual_result: Option<String>,
    pub status: StepStatus,
    pub screenshot: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_ms: Option<u64>,
    pub error: Option<String>,
    /// Number of times the step runner was invoked for this step
    pub attempts: u32,
    pub logs: Vec<LogEntry>,
}

impl StepExecution {
    pub fn pending(step: &Step) -> Self {
        Self {
            id: Uuid::new_v4(),
            step_id: step.id.clone(),
            order: step.order,
            description: step.description.clone(),
            expected_result: step.expected_result.clone(),
            actual_result: None,
            status: StepStatus::Pending,
            screenshot: None,
            start_time: None,
            end_time: None,
            duration_ms: None,
            error: None,
            attempts: 0,
            logs: Vec::new(),
        }
    }
}

/// Aggregate record of running a whole test case once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub id: Uuid,
    pub test_case_id: String,
    pub test_case_name: String,
    pub status: ExecutionStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_ms: Option<u64>,
    /// Only set once the execution reached a terminal status
    pub result: Option<ExecutionResult>,
    pub browser: String,
    pub environment: String,
    pub headless: bool,
    pub take_screenshots: bool,
    pub record_video: bool,
    pub executed_by: String,
    pub steps: Vec<StepExecution>,
    pub logs: Vec<LogEntry>,
    pub screenshots: Vec<String>,
    pub video: Option<String>,
    /// Harness-level failure, distinct from step assertion failures
    pub error: Option<String>,
}

impl Execution {
    /// Create a queued execution with one pending step record per step,
    /// sorted by step order.
    pub fn new(test_case: &TestCase, settings: &ExecutionSettings, executed_by: &str) -> Self {
        let steps = test_case
            .sorted_steps()
            .into_iter()
            .map(StepExecution::pending)
            .collect();

        Self {
            id: Uuid::new_v4(),
            test_case_id: test_case.id.clone(),
            test_case_name: test_case.name.clone(),
            status: ExecutionStatus::Queued,
            start_time: None,
            end_time: None,
            duration_ms: None,
            result: None,
            browser: settings.browser.clone(),
            environment: settings.environment.clone(),
            headless: settings.headless,
            take_screenshots: settings.take_screenshots,
            record_video: settings.record_video,
            executed_by: executed_by.to_string(),
            steps,
            logs: Vec::new(),
            screenshots: Vec::new(),
            video: None,
            error: None,
        }
    }

    /// Passed iff every step passed; vacuously true for an empty test case
    pub fn computed_result(&self) -> ExecutionResult {
        if self.steps.iter().all(|s| s.status == StepStatus::Passed) {
            ExecutionResult::Passed
        } else {
            ExecutionResult::Failed
        }
    }

    pub fn passed(&self) -> bool {
        self.result == Some(ExecutionResult::Passed)
    }

    pub fn step(&self, step_id: &str) -> Option<&StepExecution> {
        self.steps.iter().find(|s| s.step_id == step_id)
    }

    pub fn count_steps(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }
}
