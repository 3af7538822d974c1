//! Stepwise CLI - Main Entry Point
//!
//! Runs test cases described in YAML or JSON files through the execution
//! engine and reports the results.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use stepwise_engine::EngineConfig;

mod commands;
mod output;

use commands::{config, run, validate};

/// Stepwise - step-by-step test execution
#[derive(Parser)]
#[command(name = "stepwise")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "stepwise.toml", env = "STEPWISE_CONFIG", global = true)]
    config: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run test cases
    Run(run::RunArgs),

    /// Check test case files without running them
    Validate(validate::ValidateArgs),

    /// Manage the configuration file
    #[command(subcommand)]
    Config(config::ConfigCommands),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match EngineConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            output::print_error(&format!("{}: {}", cli.config.display(), e));
            std::process::exit(2);
        }
    };

    match cli.command {
        Commands::Run(args) => match run::execute(args, config, cli.format).await? {
            run::RunOutcome::AllPassed => {}
            run::RunOutcome::SomeFailed => std::process::exit(1),
            run::RunOutcome::Rejected => std::process::exit(2),
        },
        Commands::Validate(args) => {
            if !validate::execute(args)? {
                std::process::exit(1);
            }
        }
        Commands::Config(cmd) => config::execute(cmd, &cli.config, &config)?,
    }

    Ok(())
}
