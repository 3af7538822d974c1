//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use uuid::Uuid;

use stepwise_common::{Execution, ExecutionStatus, LogEntry, LogLevel, StepStatus};
use stepwise_engine::{ProgressSink, RunSummary};

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

impl TableDisplay for Execution {
    fn headers() -> Vec<&'static str> {
        vec!["Test Case", "Status", "Steps", "Duration", "Executed By", "Error"]
    }

    fn row(&self) -> Vec<String> {
        let passed = self.count_steps(StepStatus::Passed);
        vec![
            self.test_case_name.clone(),
            colored_status(self.status),
            format!("{}/{}", passed, self.steps.len()),
            format!("{} ms", self.duration_ms.unwrap_or(0)),
            self.executed_by.clone(),
            first_error(self).unwrap_or_default(),
        ]
    }
}

fn first_error(execution: &Execution) -> Option<String> {
    execution.error.clone().or_else(|| {
        execution
            .steps
            .iter()
            .find_map(|s| s.error.as_ref().map(|e| format!("step {}: {}", s.order, e)))
    })
}

fn colored_status(status: ExecutionStatus) -> String {
    let label = status.to_string();
    match status {
        ExecutionStatus::Completed => label.green().to_string(),
        ExecutionStatus::Failed | ExecutionStatus::Error => label.red().to_string(),
        ExecutionStatus::Aborted | ExecutionStatus::Timeout => label.yellow().to_string(),
        ExecutionStatus::Queued | ExecutionStatus::Running => label,
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    if items.is_empty() {
        println!("No items found.");
        return;
    }

    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);

            table.set_header(T::headers());
            for item in items {
                table.add_row(item.row());
            }

            println!("{table}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
        }
    }
}

/// Print the totals line of a batch run
pub fn print_summary(summary: &RunSummary) {
    let line = format!(
        "{} passed, {} failed, {} errored, {} aborted, {} timed out ({:.1}% pass rate, {} ms)",
        summary.passed,
        summary.failed,
        summary.errored,
        summary.aborted,
        summary.timed_out,
        summary.pass_rate(),
        summary.duration_ms
    );
    if summary.all_passed() {
        print_success(&line);
    } else {
        print_error(&line);
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("✅ {}", message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("❌ {}", message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    println!("⚠️  {}", message);
}

/// Streams live progress to the terminal
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn on_log_update(&self, entry: &LogEntry) {
        let line = entry.to_string();
        match entry.level {
            LogLevel::Info => println!("   {}", line),
            LogLevel::Error => println!("   {}", line.red()),
        }
    }

    fn on_status_update(&self, execution_id: Uuid, status: ExecutionStatus) {
        let short = execution_id.to_string()[..8].to_string();
        println!("▶ {} {}", short.bold(), colored_status(status));
    }
}
