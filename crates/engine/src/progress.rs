//! Progress reporting for running executions
//!
//! Three independent channels (step updates, log lines, status changes) so
//! consumers can subscribe selectively. All callbacks are invoked
//! synchronously by the orchestrator, in the order the events happen.

use tokio::sync::mpsc;
use uuid::Uuid;

use stepwise_common::{ExecutionStatus, LogEntry, StepExecution};

pub trait ProgressSink: Send + Sync {
    /// A step execution changed; never re-emits an earlier lifecycle state
    fn on_step_update(&self, _step: &StepExecution) {}

    /// A log line was appended; lines arrive in chronological order
    fn on_log_update(&self, _entry: &LogEntry) {}

    /// The execution moved to a new status
    fn on_status_update(&self, _execution_id: Uuid, _status: ExecutionStatus) {}
}

/// Discards all progress
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl ProgressSink for NoopSink {}

type StepFn = Box<dyn Fn(&StepExecution) + Send + Sync>;
type LogFn = Box<dyn Fn(&LogEntry) + Send + Sync>;
type StatusFn = Box<dyn Fn(Uuid, ExecutionStatus) + Send + Sync>;

/// A sink assembled from plain closures; unset channels are ignored.
#[derive(Default)]
pub struct Callbacks {
    on_step: Option<StepFn>,
    on_log: Option<LogFn>,
    on_status: Option<StatusFn>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_step(mut self, f: impl Fn(&StepExecution) + Send + Sync + 'static) -> Self {
        self.on_step = Some(Box::new(f));
        self
    }

    pub fn on_log(mut self, f: impl Fn(&LogEntry) + Send + Sync + 'static) -> Self {
        self.on_log = Some(Box::new(f));
        self
    }

    pub fn on_status(mut self, f: impl Fn(Uuid, ExecutionStatus) + Send + Sync + 'static) -> Self {
        self.on_status = Some(Box::new(f));
        self
    }
}

impl ProgressSink for Callbacks {
    fn on_step_update(&self, step: &StepExecution) {
        if let Some(f) = &self.on_step {
            f(step);
        }
    }

    fn on_log_update(&self, entry: &LogEntry) {
        if let Some(f) = &self.on_log {
            f(entry);
        }
    }

    fn on_status_update(&self, execution_id: Uuid, status: ExecutionStatus) {
        if let Some(f) = &self.on_status {
            f(execution_id, status);
        }
    }
}

/// Progress flattened into a single event stream
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Step(StepExecution),
    Log(LogEntry),
    Status {
        execution_id: Uuid,
        status: ExecutionStatus,
    },
}

/// Forwards every callback as a [`ProgressEvent`] over an unbounded channel.
///
/// Events are dropped silently once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn on_step_update(&self, step: &StepExecution) {
        let _ = self.tx.send(ProgressEvent::Step(step.clone()));
    }

    fn on_log_update(&self, entry: &LogEntry) {
        let _ = self.tx.send(ProgressEvent::Log(entry.clone()));
    }

    fn on_status_update(&self, execution_id: Uuid, status: ExecutionStatus) {
        let _ = self.tx.send(ProgressEvent::Status {
            execution_id,
            status,
        });
    }
}
