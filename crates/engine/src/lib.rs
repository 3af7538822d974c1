//! Stepwise Execution Engine
//!
//! Runs a test case (an ordered list of steps) against a pluggable step
//! runner and produces a single aggregated execution record:
//! - Steps run strictly one after another, sorted by their order
//! - Failed steps are retried according to the execution settings
//! - Progress is streamed through step, log and status callbacks
//! - Runs can be cancelled cooperatively or bounded by a wall-clock budget
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Orchestrator::run(test_case, settings, executed_by, sink)  │
//! │    ├── validate settings + test case                        │
//! │    ├── Queued -> Running                                    │
//! │    ├── for each step (sorted):                              │
//! │    │     ├── boundary check (cancel / max duration)         │
//! │    │     └── StepExecutor::execute -> StepRunner::run_step  │
//! │    │           └── retry loop with fixed delay              │
//! │    └── Completed | Failed | Aborted | Error | Timeout       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ProgressSink                                               │
//! │    ├── on_step_update(&StepExecution)                       │
//! │    ├── on_log_update(&LogEntry)                             │
//! │    └── on_status_update(execution_id, ExecutionStatus)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod artifacts;
pub mod batch;
pub mod config;
pub mod error;
pub mod executor;
pub mod loader;
pub mod orchestrator;
pub mod progress;
pub mod report;
pub mod runner;

pub use batch::run_many;
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use executor::{StepExecutor, StepVerdict};
pub use orchestrator::Orchestrator;
pub use progress::{Callbacks, ChannelSink, NoopSink, ProgressEvent, ProgressSink};
pub use report::{write_results, RunSummary};
pub use runner::{
    RunnerError, ScriptedOutcome, ScriptedRunner, SimulatedRunner, SimulatorConfig,
    StepObservation, StepRunner,
};

pub use tokio_util::sync::CancellationToken;
