//! Execution orchestrator
//!
//! Drives the steps of a test case strictly one after another, applies the
//! retry policy, names screenshot artifacts and reports progress. Every run
//! owns its [`Execution`]; nothing is shared between concurrent runs except
//! the step runner.
//!
//! Cancellation and the optional wall-clock budget are checked cooperatively
//! at step boundaries and between retry attempts, never in the middle of a
//! step.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use stepwise_common::{
    Execution, ExecutionResult, ExecutionSettings, ExecutionStatus, LogEntry, LogLevel,
    MonotonicClock, Step, StepStatus, TestCase,
};

use crate::artifacts;
use crate::error::EngineResult;
use crate::executor::StepExecutor;
use crate::progress::ProgressSink;
use crate::runner::StepRunner;

/// Why the step loop ended before running every step
#[derive(Debug, Clone, PartialEq, Eq)]
enum StopReason {
    StepFailed,
    Harness(String),
    Cancelled,
    TimedOut,
}

/// The mutable state of one run in progress
struct ActiveRun<'a> {
    execution: Execution,
    sink: &'a dyn ProgressSink,
    clock: MonotonicClock,
}

impl<'a> ActiveRun<'a> {
    fn log(&mut self, level: LogLevel, message: String, step: Option<usize>) {
        let mut entry = LogEntry::new(self.clock.now(), level, message);

        if let Some(idx) = step {
            let step_execution = &mut self.execution.steps[idx];
            entry = entry.for_step(step_execution.step_id.clone());
            step_execution.logs.push(entry.clone());
        }

        match level {
            LogLevel::Info => info!(execution = %self.execution.id, "{}", entry.message),
            LogLevel::Error => error!(execution = %self.execution.id, "{}", entry.message),
        }

        self.sink.on_log_update(&entry);
        self.execution.logs.push(entry);
    }

    fn emit_step(&self, idx: usize) {
        self.sink.on_step_update(&self.execution.steps[idx]);
    }

    fn set_step_status(&mut self, idx: usize, next: StepStatus) {
        let step = &mut self.execution.steps[idx];
        debug_assert!(
            step.status.can_transition_to(next),
            "step {} -> {}",
            step.status,
            next
        );
        step.status = next;
    }

    fn transition(&mut self, next: ExecutionStatus) {
        debug_assert!(
            self.execution.status.can_transition_to(next),
            "execution {} -> {}",
            self.execution.status,
            next
        );
        self.execution.status = next;
        self.sink.on_status_update(self.execution.id, next);
    }

    fn capture_screenshot(&mut self, idx: usize, status: StepStatus, attempt: u32) {
        let step = &mut self.execution.steps[idx];
        let name = artifacts::screenshot_name(self.execution.id, step.order, status, attempt);
        step.screenshot = Some(name.clone());
        self.execution.screenshots.push(name);
    }
}

#[derive(Clone)]
pub struct Orchestrator {
    executor: StepExecutor,
}

impl Orchestrator {
    pub fn new(runner: Arc<dyn StepRunner>) -> Self {
        Self {
            executor: StepExecutor::new(runner),
        }
    }

    /// Run a test case to completion.
    ///
    /// Fails only for invalid settings or an invalid test case, before any
    /// callback fires. Every other outcome, including harness faults, is
    /// reported through the returned execution.
    pub async fn run(
        &self,
        test_case: &TestCase,
        settings: &ExecutionSettings,
        executed_by: &str,
        sink: &dyn ProgressSink,
    ) -> EngineResult<Execution> {
        let cancel = CancellationToken::new();
        self.run_with_cancel(test_case, settings, executed_by, sink, &cancel)
            .await
    }

    /// Like [`Orchestrator::run`], stopping early with status `Aborted`
    /// once `cancel` fires.
    pub async fn run_with_cancel(
        &self,
        test_case: &TestCase,
        settings: &ExecutionSettings,
        executed_by: &str,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> EngineResult<Execution> {
        settings.validate()?;
        test_case.validate()?;

        let steps = test_case.sorted_steps();
        let started = Instant::now();
        let deadline = settings.max_duration().map(|budget| started + budget);

        let mut run = ActiveRun {
            execution: Execution::new(test_case, settings, executed_by),
            sink,
            clock: MonotonicClock::new(),
        };

        sink.on_status_update(run.execution.id, ExecutionStatus::Queued);
        run.execution.start_time = Some(run.clock.now());
        run.transition(ExecutionStatus::Running);

        run.log(
            LogLevel::Info,
            format!(
                "Starting execution of '{}' ({} steps) as {}",
                test_case.name,
                steps.len(),
                executed_by
            ),
            None,
        );
        run.log(
            LogLevel::Info,
            format!(
                "Environment: {}, browser: {}, headless: {}, screenshots: {}, video: {}, retries: {}, runner: {}",
                settings.environment,
                settings.browser,
                settings.headless,
                settings.take_screenshots,
                settings.record_video,
                if settings.retry_on_failure {
                    settings.max_retries.to_string()
                } else {
                    "off".to_string()
                },
                self.executor.runner_name()
            ),
            None,
        );

        let mut stop = None;
        for (idx, step) in steps.iter().enumerate() {
            if let Some(reason) = check_boundary(cancel, deadline) {
                stop = Some(reason);
                break;
            }
            if let Some(reason) = self
                .run_step(&mut run, idx, step, settings, cancel, deadline)
                .await
            {
                stop = Some(reason);
                break;
            }
        }

        Ok(finish(run, stop, settings))
    }

    async fn run_step(
        &self,
        run: &mut ActiveRun<'_>,
        idx: usize,
        step: &Step,
        settings: &ExecutionSettings,
        cancel: &CancellationToken,
        deadline: Option<Instant>,
    ) -> Option<StopReason> {
        let start_time = run.clock.now();
        run.set_step_status(idx, StepStatus::Running);
        run.execution.steps[idx].start_time = Some(start_time);
        run.emit_step(idx);
        run.log(
            LogLevel::Info,
            format!("Running step {}: {}", step.order, step.description),
            Some(idx),
        );

        let budget = settings.attempt_budget();
        let mut attempt = 0;

        let (status, stop) = loop {
            attempt += 1;
            run.execution.steps[idx].attempts = attempt;

            let verdict = self.executor.execute(step, settings).await;
            run.execution.steps[idx].actual_result = verdict.actual_result;

            match verdict.status {
                StepStatus::Passed => {
                    run.execution.steps[idx].error = None;
                    if settings.take_screenshots {
                        run.capture_screenshot(idx, StepStatus::Passed, attempt);
                    }
                    let message = if attempt > 1 {
                        format!("Step {} passed on attempt {}", step.order, attempt)
                    } else {
                        format!("Step {} passed", step.order)
                    };
                    run.log(LogLevel::Info, message, Some(idx));
                    break (StepStatus::Passed, None);
                }
                StepStatus::Error => {
                    let message = verdict
                        .error
                        .unwrap_or_else(|| "step runner failed".to_string());
                    run.execution.steps[idx].error = Some(message.clone());
                    run.log(
                        LogLevel::Error,
                        format!("Step {} aborted by harness error", step.order),
                        Some(idx),
                    );
                    run.log(LogLevel::Error, format!("Error: {}", message), Some(idx));
                    break (StepStatus::Error, Some(StopReason::Harness(message)));
                }
                _ => {
                    let message = verdict
                        .error
                        .unwrap_or_else(|| "assertion failed".to_string());
                    run.execution.steps[idx].error = Some(message.clone());
                    if settings.take_screenshots {
                        run.capture_screenshot(idx, StepStatus::Failed, attempt);
                    }
                    run.log(
                        LogLevel::Error,
                        format!("Step {} failed", step.order),
                        Some(idx),
                    );
                    run.log(LogLevel::Error, format!("Error: {}", message), Some(idx));

                    if attempt >= budget {
                        if budget > 1 {
                            run.log(
                                LogLevel::Error,
                                format!("Step {} failed after {} attempts", step.order, attempt),
                                Some(idx),
                            );
                        }
                        break (StepStatus::Failed, Some(StopReason::StepFailed));
                    }

                    run.log(
                        LogLevel::Info,
                        format!(
                            "Retrying step {} in {} ms (attempt {} of {})",
                            step.order,
                            settings.retry_delay_ms,
                            attempt + 1,
                            budget
                        ),
                        Some(idx),
                    );
                    if let Some(reason) = wait_for_retry(settings, cancel, deadline).await {
                        break (StepStatus::Failed, Some(reason));
                    }
                }
            }
        };

        let end_time = run.clock.now();
        run.set_step_status(idx, status);
        let step_execution = &mut run.execution.steps[idx];
        step_execution.end_time = Some(end_time);
        step_execution.duration_ms = Some(elapsed_ms(start_time, end_time));
        run.emit_step(idx);

        stop
    }
}

fn finish(
    mut run: ActiveRun<'_>,
    stop: Option<StopReason>,
    settings: &ExecutionSettings,
) -> Execution {
    if stop.is_some() && settings.skip_remaining_on_stop {
        for idx in 0..run.execution.steps.len() {
            if run.execution.steps[idx].status != StepStatus::Pending {
                continue;
            }
            run.set_step_status(idx, StepStatus::Skipped);
            let order = run.execution.steps[idx].order;
            run.log(LogLevel::Info, format!("Step {} skipped", order), Some(idx));
            run.emit_step(idx);
        }
    }

    let result = run.execution.computed_result();
    let total = run.execution.steps.len();
    let passed = run.execution.count_steps(StepStatus::Passed);

    let (status, level, message) = match stop {
        None if result == ExecutionResult::Passed => (
            ExecutionStatus::Completed,
            LogLevel::Info,
            format!("Execution completed: {}/{} steps passed", passed, total),
        ),
        None | Some(StopReason::StepFailed) => (
            ExecutionStatus::Failed,
            LogLevel::Error,
            format!("Execution failed: {}/{} steps passed", passed, total),
        ),
        Some(StopReason::Harness(message)) => {
            run.execution.error = Some(message.clone());
            (
                ExecutionStatus::Error,
                LogLevel::Error,
                format!("Execution stopped by harness error: {}", message),
            )
        }
        Some(StopReason::Cancelled) => (
            ExecutionStatus::Aborted,
            LogLevel::Info,
            format!("Execution aborted: {}/{} steps passed", passed, total),
        ),
        Some(StopReason::TimedOut) => (
            ExecutionStatus::Timeout,
            LogLevel::Error,
            format!(
                "Execution exceeded maximum duration of {} ms: {}/{} steps passed",
                settings.max_duration_ms.unwrap_or_default(),
                passed,
                total
            ),
        ),
    };

    if settings.record_video {
        run.execution.video = Some(artifacts::video_name(run.execution.id));
    }

    run.execution.result = Some(result);
    let end_time = run.clock.now();
    run.execution.end_time = Some(end_time);
    run.execution.duration_ms = run
        .execution
        .start_time
        .map(|start| elapsed_ms(start, end_time));

    run.log(level, message, None);
    run.transition(status);

    debug!(
        execution = %run.execution.id,
        status = %status,
        result = %result,
        "Execution finished"
    );
    run.execution
}

fn check_boundary(cancel: &CancellationToken, deadline: Option<Instant>) -> Option<StopReason> {
    if cancel.is_cancelled() {
        return Some(StopReason::Cancelled);
    }
    match deadline {
        Some(deadline) if Instant::now() >= deadline => Some(StopReason::TimedOut),
        _ => None,
    }
}

/// Sleep out the retry delay, waking early on cancellation
async fn wait_for_retry(
    settings: &ExecutionSettings,
    cancel: &CancellationToken,
    deadline: Option<Instant>,
) -> Option<StopReason> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => return Some(StopReason::Cancelled),
        _ = tokio::time::sleep(settings.retry_delay()) => {}
    }
    check_boundary(cancel, deadline)
}

fn elapsed_ms(start: chrono::DateTime<chrono::Utc>, end: chrono::DateTime<chrono::Utc>) -> u64 {
    (end - start).num_milliseconds().max(0) as u64
}
