//! Configuration file commands

use anyhow::{bail, Result};
use clap::Subcommand;
use std::path::Path;

use stepwise_engine::EngineConfig;

use crate::output::print_success;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a configuration file populated with defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

pub fn execute(cmd: ConfigCommands, path: &Path, config: &EngineConfig) -> Result<()> {
    match cmd {
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            EngineConfig::default().save(path)?;
            print_success(&format!("Wrote {}", path.display()));
        }
        ConfigCommands::Show => {
            println!("{}", toml::to_string_pretty(config)?);
        }
    }
    Ok(())
}
