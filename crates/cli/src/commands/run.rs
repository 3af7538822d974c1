//! Run test cases

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use stepwise_common::ExecutionSettings;
use stepwise_engine::{
    loader, report, run_many, CancellationToken, EngineConfig, NoopSink, Orchestrator,
    ProgressSink, RunSummary, SimulatedRunner, SimulatorConfig,
};

use crate::output::{
    print_error, print_list, print_summary, print_warning, ConsoleSink, OutputFormat,
};

#[derive(Args)]
pub struct RunArgs {
    /// Test case files or directories
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Run only test cases with this tag
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Target environment
    #[arg(long, env = "STEPWISE_ENVIRONMENT")]
    pub environment: Option<String>,

    /// Browser or agent to run with
    #[arg(long, env = "STEPWISE_BROWSER")]
    pub browser: Option<String>,

    /// Run with a visible browser window
    #[arg(long)]
    pub headed: bool,

    /// Do not capture screenshots
    #[arg(long)]
    pub no_screenshots: bool,

    /// Record a video of each execution
    #[arg(long)]
    pub record_video: bool,

    /// Retry failed steps up to N more times
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Delay between attempts of a step
    #[arg(long, value_name = "MS")]
    pub retry_delay_ms: Option<u64>,

    /// Maximum wall-clock duration of each execution
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Mark steps after a stop as skipped instead of pending
    #[arg(long)]
    pub skip_remaining: bool,

    /// Name recorded as the executor of the run
    #[arg(long, env = "STEPWISE_EXECUTED_BY")]
    pub executed_by: Option<String>,

    /// Output directory for results
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Seed for the simulated step runner
    #[arg(long)]
    pub seed: Option<u64>,

    /// Failure probability of the simulated step runner (0.0 - 1.0)
    #[arg(long)]
    pub failure_rate: Option<f64>,

    /// Do not stream live progress
    #[arg(short, long)]
    pub quiet: bool,
}

impl RunArgs {
    fn settings(&self, defaults: &ExecutionSettings) -> ExecutionSettings {
        let mut settings = defaults.clone();
        if let Some(environment) = &self.environment {
            settings.environment = environment.clone();
        }
        if let Some(browser) = &self.browser {
            settings.browser = browser.clone();
        }
        if self.headed {
            settings.headless = false;
        }
        if self.no_screenshots {
            settings.take_screenshots = false;
        }
        if self.record_video {
            settings.record_video = true;
        }
        if let Some(retries) = self.retries {
            settings.retry_on_failure = true;
            settings.max_retries = retries;
        }
        if let Some(delay) = self.retry_delay_ms {
            settings.retry_delay_ms = delay;
        }
        if let Some(timeout) = self.timeout {
            settings.max_duration_ms = Some(timeout.saturating_mul(1000));
        }
        if self.skip_remaining {
            settings.skip_remaining_on_stop = true;
        }
        settings
    }

    fn simulator(&self, base: &SimulatorConfig) -> SimulatorConfig {
        let mut simulator = base.clone();
        if let Some(seed) = self.seed {
            simulator.seed = Some(seed);
        }
        if let Some(rate) = self.failure_rate {
            simulator.failure_rate = rate;
        }
        simulator
    }
}

/// Outcome of the run command
pub enum RunOutcome {
    AllPassed,
    SomeFailed,
    Rejected,
}

pub async fn execute(
    args: RunArgs,
    config: EngineConfig,
    format: OutputFormat,
) -> Result<RunOutcome> {
    let settings = args.settings(&config.defaults);
    if let Err(e) = settings.validate() {
        print_error(&e.to_string());
        return Ok(RunOutcome::Rejected);
    }

    let simulator = args.simulator(&config.simulator);
    if let Err(e) = simulator.validate() {
        print_error(&e.to_string());
        return Ok(RunOutcome::Rejected);
    }
    let executed_by = args
        .executed_by
        .clone()
        .unwrap_or_else(|| config.executed_by.clone());
    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| config.output_dir.clone());

    let mut cases = loader::load_paths(&args.paths)?;
    if let Some(tag) = &args.tag {
        cases = loader::filter_by_tag(cases, tag);
    }
    if cases.is_empty() {
        print_warning("No test cases matched");
        return Ok(RunOutcome::AllPassed);
    }

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, aborting at the next step boundary");
            interrupt.cancel();
        }
    });

    let sink: Arc<dyn ProgressSink> = if args.quiet || matches!(format, OutputFormat::Json) {
        Arc::new(NoopSink)
    } else {
        Arc::new(ConsoleSink)
    };

    let runner = Arc::new(SimulatedRunner::new(simulator));
    let orchestrator = Orchestrator::new(runner);
    info!(
        environment = %settings.environment,
        browser = %settings.browser,
        "Running {} test case(s) as {}",
        cases.len(),
        executed_by
    );

    let outcomes = run_many(&orchestrator, cases, &settings, &executed_by, sink, &cancel).await;

    let mut executions = Vec::new();
    let mut rejected = false;
    for outcome in outcomes {
        match outcome {
            Ok(execution) => executions.push(execution),
            Err(e) if e.is_config() => {
                rejected = true;
                print_error(&e.to_string());
            }
            Err(e) => return Err(e.into()),
        }
    }

    print_list(&executions, format);
    let summary = RunSummary::from_executions(&executions);
    if matches!(format, OutputFormat::Table) {
        print_summary(&summary);
    }

    report::write_results(&output_dir, &executions)?;

    Ok(if rejected {
        RunOutcome::Rejected
    } else if summary.all_passed() {
        RunOutcome::AllPassed
    } else {
        RunOutcome::SomeFailed
    })
}
