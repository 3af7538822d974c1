//! Core types for Stepwise

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::error::{Error, Result};

/// A single step of a test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub order: u32,
    pub description: String,
    pub expected_result: String,
}

impl Step {
    pub fn new(
        id: impl Into<String>,
        order: u32,
        description: impl Into<String>,
        expected_result: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            order,
            description: description.into(),
            expected_result: expected_result.into(),
        }
    }
}

/// A test case as supplied by the test-case repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl TestCase {
    pub fn new(id: impl Into<String>, name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            tags: Vec::new(),
            steps,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Check the structural rules the orchestrator relies on.
    ///
    /// Step orders must be unique; gaps are tolerated since steps are sorted
    /// before running.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidTestCase {
                test_case: self.name.clone(),
                reason: "test case id is empty".to_string(),
            });
        }

        let mut seen_orders = HashSet::new();
        let mut seen_ids = HashSet::new();
        for step in &self.steps {
            if !seen_orders.insert(step.order) {
                return Err(Error::DuplicateStepOrder {
                    test_case: self.name.clone(),
                    order: step.order,
                });
            }
            if !seen_ids.insert(step.id.as_str()) {
                return Err(Error::InvalidTestCase {
                    test_case: self.name.clone(),
                    reason: format!("duplicate step id '{}'", step.id),
                });
            }
        }

        Ok(())
    }

    /// Steps sorted by ascending order
    pub fn sorted_steps(&self) -> Vec<&Step> {
        let mut steps: Vec<&Step> = self.steps.iter().collect();
        steps.sort_by_key(|s| s.order);
        steps
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Run configuration for one execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    /// Target environment identifier (e.g. "staging")
    pub environment: String,

    /// Browser or agent identifier
    pub browser: String,

    pub headless: bool,

    pub take_screenshots: bool,

    pub record_video: bool,

    /// Re-attempt failed steps
    pub retry_on_failure: bool,

    /// Additional attempts per failed step, only read when `retry_on_failure` is set
    pub max_retries: u32,

    /// Fixed delay between attempts of the same step
    pub retry_delay_ms: u64,

    /// Wall-clock budget for the whole execution
    pub max_duration_ms: Option<u64>,

    /// Mark steps that never ran as skipped instead of leaving them pending
    pub skip_remaining_on_stop: bool,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            environment: "staging".to_string(),
            browser: "chromium".to_string(),
            headless: true,
            take_screenshots: true,
            record_video: false,
            retry_on_failure: false,
            max_retries: 2,
            retry_delay_ms: 1000,
            max_duration_ms: None,
            skip_remaining_on_stop: false,
        }
    }
}

impl ExecutionSettings {
    pub fn validate(&self) -> Result<()> {
        if self.retry_on_failure && self.max_retries < 1 {
            return Err(Error::InvalidConfig(
                "max_retries must be at least 1 when retry_on_failure is enabled".to_string(),
            ));
        }
        if self.max_duration_ms == Some(0) {
            return Err(Error::InvalidConfig(
                "max_duration_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration_ms.map(Duration::from_millis)
    }

    /// Attempts allowed per step, the first run included
    pub fn attempt_budget(&self) -> u32 {
        if self.retry_on_failure {
            self.max_retries.saturating_add(1)
        } else {
            1
        }
    }
}

/// Execution lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Aborted,
    Error,
    Timeout,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Queued | Self::Running)
    }

    pub fn can_transition_to(&self, next: ExecutionStatus) -> bool {
        match (self, next) {
            (Self::Queued, Self::Running) => true,
            (Self::Running, next) => next.is_terminal(),
            _ => false,
        }
    }
}

impl Default for ExecutionStatus {
    fn default() -> Self {
        Self::Queued
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Queued => write!(f, "queued"),
            ExecutionStatus::Running => write!(f, "running"),
            ExecutionStatus::Completed => write!(f, "completed"),
            ExecutionStatus::Failed => write!(f, "failed"),
            ExecutionStatus::Aborted => write!(f, "aborted"),
            ExecutionStatus::Error => write!(f, "error"),
            ExecutionStatus::Timeout => write!(f, "timeout"),
        }
    }
}

/// Step lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Passed,
    Failed,
    Skipped,
    Error,
}

impl StepStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Passed | Self::Failed | Self::Skipped | Self::Error)
    }

    pub fn can_transition_to(&self, next: StepStatus) -> bool {
        match (self, next) {
            (Self::Pending, Self::Running) | (Self::Pending, Self::Skipped) => true,
            (Self::Running, next) => next.is_terminal() && next != Self::Skipped,
            _ => false,
        }
    }
}

impl Default for StepStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepStatus::Pending => write!(f, "pending"),
            StepStatus::Running => write!(f, "running"),
            StepStatus::Passed => write!(f, "passed"),
            StepStatus::Failed => write!(f, "failed"),
            StepStatus::Skipped => write!(f, "skipped"),
            StepStatus::Error => write!(f, "error"),
        }
    }
}

/// Verdict of a finished execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionResult {
    Passed,
    Failed,
}

impl std::fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionResult::Passed => write!(f, "passed"),
            ExecutionResult::Failed => write!(f, "failed"),
        }
    }
}
