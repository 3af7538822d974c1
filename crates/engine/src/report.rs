//! Run summaries and result files

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use stepwise_common::{Execution, ExecutionStatus};

use crate::error::EngineResult;

pub const RESULTS_FILE: &str = "execution-results.json";

/// Totals over a batch of executions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub aborted: usize,
    pub errored: usize,
    pub timed_out: usize,
    pub duration_ms: u64,
}

impl RunSummary {
    pub fn from_executions(executions: &[Execution]) -> Self {
        let mut summary = Self {
            total: executions.len(),
            ..Default::default()
        };

        for execution in executions {
            match execution.status {
                ExecutionStatus::Completed => summary.passed += 1,
                ExecutionStatus::Failed => summary.failed += 1,
                ExecutionStatus::Aborted => summary.aborted += 1,
                ExecutionStatus::Error => summary.errored += 1,
                ExecutionStatus::Timeout => summary.timed_out += 1,
                ExecutionStatus::Queued | ExecutionStatus::Running => {}
            }
            summary.duration_ms += execution.duration_ms.unwrap_or(0);
        }

        summary
    }

    /// Percentage of executions that completed
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.passed as f64 / self.total as f64 * 100.0
        }
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

/// Contents of the results file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsFile {
    pub generated_at: DateTime<Utc>,
    pub summary: RunSummary,
    pub executions: Vec<Execution>,
}

/// Write execution results to `<output_dir>/execution-results.json`
pub fn write_results(output_dir: &Path, executions: &[Execution]) -> EngineResult<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let results = ResultsFile {
        generated_at: Utc::now(),
        summary: RunSummary::from_executions(executions),
        executions: executions.to_vec(),
    };

    let path = output_dir.join(RESULTS_FILE);
    let json = serde_json::to_string_pretty(&results)?;
    std::fs::write(&path, json)?;

    info!("Results written to: {}", path.display());
    Ok(path)
}

/// Read back a results file
pub fn read_results(path: &Path) -> EngineResult<ResultsFile> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
