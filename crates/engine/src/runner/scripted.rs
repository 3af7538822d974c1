//! Deterministic runner fed with per-step outcomes

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use stepwise_common::{ExecutionSettings, Step};

use super::{RunnerError, StepObservation, StepRunner};

/// Outcome a scripted runner reports for one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedOutcome {
    /// Observe exactly the expected result
    Pass,
    /// Observe the given text instead of the expected result
    Fail(String),
    /// Raise an infrastructure error
    Crash(String),
}

#[derive(Default)]
struct Script {
    queued: HashMap<String, VecDeque<ScriptedOutcome>>,
    sticky: HashMap<String, ScriptedOutcome>,
    invocations: HashMap<String, usize>,
}

/// Replays scripted outcomes keyed by step id.
///
/// Queued outcomes are consumed one per attempt; once a step's queue is empty
/// its sticky outcome applies, and `Pass` when none was set.
#[derive(Default)]
pub struct ScriptedRunner {
    script: Mutex<Script>,
    latency: Duration,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue outcomes for consecutive attempts of one step
    pub fn then(self, step_id: &str, outcomes: impl IntoIterator<Item = ScriptedOutcome>) -> Self {
        self.script
            .lock()
            .queued
            .entry(step_id.to_string())
            .or_default()
            .extend(outcomes);
        self
    }

    /// Outcome for every attempt of one step once its queue is drained
    pub fn always(self, step_id: &str, outcome: ScriptedOutcome) -> Self {
        self.script
            .lock()
            .sticky
            .insert(step_id.to_string(), outcome);
        self
    }

    /// Simulated time spent on each attempt
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// How many times `step_id` was attempted
    pub fn invocations(&self, step_id: &str) -> usize {
        self.script
            .lock()
            .invocations
            .get(step_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_invocations(&self) -> usize {
        self.script.lock().invocations.values().sum()
    }

    fn next_outcome(&self, step_id: &str) -> ScriptedOutcome {
        let mut script = self.script.lock();
        *script.invocations.entry(step_id.to_string()).or_default() += 1;

        if let Some(outcome) = script.queued.get_mut(step_id).and_then(|q| q.pop_front()) {
            return outcome;
        }
        script
            .sticky
            .get(step_id)
            .cloned()
            .unwrap_or(ScriptedOutcome::Pass)
    }
}

#[async_trait]
impl StepRunner for ScriptedRunner {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn run_step(
        &self,
        step: &Step,
        _settings: &ExecutionSettings,
    ) -> Result<StepObservation, RunnerError> {
        let outcome = self.next_outcome(&step.id);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match outcome {
            ScriptedOutcome::Pass => Ok(StepObservation::new(step.expected_result.clone())),
            ScriptedOutcome::Fail(actual) => Ok(StepObservation::new(actual)),
            ScriptedOutcome::Crash(reason) => Err(RunnerError::Crashed(reason)),
        }
    }
}
