//! Engine configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use stepwise_common::ExecutionSettings;

use crate::error::EngineResult;
use crate::runner::SimulatorConfig;

/// Engine configuration, usually read from `stepwise.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Recorded as `executed_by` on every execution
    pub executed_by: String,

    /// Directory where result files are written
    pub output_dir: PathBuf,

    /// Settings applied when the caller does not override them
    pub defaults: ExecutionSettings,

    /// Tuning for the simulated step runner
    pub simulator: SimulatorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            executed_by: default_user(),
            output_dir: PathBuf::from("test-results"),
            defaults: ExecutionSettings::default(),
            simulator: SimulatorConfig::default(),
        }
    }
}

fn default_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "stepwise".to_string())
}

impl EngineConfig {
    /// Load configuration from file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> EngineResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            config.defaults.validate()?;
            config.simulator.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> EngineResult<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path of the JSON results file
    pub fn results_path(&self) -> PathBuf {
        self.output_dir.join(crate::report::RESULTS_FILE)
    }
}
