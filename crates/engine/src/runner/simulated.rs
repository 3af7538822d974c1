//! Randomised stand-in for a real automation driver

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use stepwise_common::{Error, ExecutionSettings, Step};

use super::{RunnerError, StepObservation, StepRunner};

const FAILURE_OBSERVATIONS: &[&str] = &[
    "Element not found on page",
    "Timed out waiting for element to become visible",
    "Unexpected text content in target element",
    "Page returned HTTP 500",
    "Button was disabled",
];

/// Simulator tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Probability (0.0 - 1.0) that an attempt observes a wrong result
    pub failure_rate: f64,

    /// Probability (0.0 - 1.0) that the driver itself crashes
    pub crash_rate: f64,

    pub min_latency_ms: u64,

    pub max_latency_ms: u64,

    /// Fixed seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            failure_rate: 0.1,
            crash_rate: 0.0,
            min_latency_ms: 200,
            max_latency_ms: 800,
            seed: None,
        }
    }
}

impl SimulatorConfig {
    /// Both rates must be probabilities; NaN and infinities are rejected
    pub fn validate(&self) -> stepwise_common::Result<()> {
        let rates = [
            ("failure_rate", self.failure_rate),
            ("crash_rate", self.crash_rate),
        ];
        for (name, rate) in rates {
            if !(0.0..=1.0).contains(&rate) {
                return Err(Error::InvalidConfig(format!(
                    "{} must be between 0.0 and 1.0, got {}",
                    name, rate
                )));
            }
        }
        Ok(())
    }
}

/// Clamp a configured rate into a probability `gen_bool` accepts
fn probability(rate: f64) -> f64 {
    if rate.is_nan() {
        0.0
    } else {
        rate.clamp(0.0, 1.0)
    }
}

enum Roll {
    Pass,
    Fail(&'static str),
    Crash,
}

pub struct SimulatedRunner {
    config: SimulatorConfig,
    rng: Mutex<StdRng>,
}

impl SimulatedRunner {
    pub fn new(config: SimulatorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            rng: Mutex::new(rng),
        }
    }

    fn roll(&self) -> (Duration, Roll) {
        let mut rng = self.rng.lock();

        let (lo, hi) = (
            self.config.min_latency_ms,
            self.config.max_latency_ms.max(self.config.min_latency_ms),
        );
        let latency = Duration::from_millis(rng.gen_range(lo..=hi));

        let roll = if rng.gen_bool(probability(self.config.crash_rate)) {
            Roll::Crash
        } else if rng.gen_bool(probability(self.config.failure_rate)) {
            let observed = FAILURE_OBSERVATIONS
                .choose(&mut *rng)
                .copied()
                .unwrap_or("Unexpected result");
            Roll::Fail(observed)
        } else {
            Roll::Pass
        };

        (latency, roll)
    }
}

#[async_trait]
impl StepRunner for SimulatedRunner {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn run_step(
        &self,
        step: &Step,
        settings: &ExecutionSettings,
    ) -> Result<StepObservation, RunnerError> {
        let (latency, roll) = self.roll();
        debug!(
            step = %step.id,
            browser = %settings.browser,
            latency_ms = latency.as_millis() as u64,
            "Simulating step"
        );

        tokio::time::sleep(latency).await;

        match roll {
            Roll::Pass => Ok(StepObservation::new(step.expected_result.clone())),
            Roll::Fail(observed) => Ok(StepObservation::new(observed)),
            Roll::Crash => Err(RunnerError::Crashed(format!(
                "{} session terminated unexpectedly",
                settings.browser
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(failure_rate: f64, seed: u64) -> SimulatedRunner {
        SimulatedRunner::new(SimulatorConfig {
            failure_rate,
            crash_rate: 0.0,
            min_latency_ms: 0,
            max_latency_ms: 0,
            seed: Some(seed),
        })
    }

    #[tokio::test]
    async fn test_zero_failure_rate_always_passes() {
        let runner = instant(0.0, 7);
        let step = Step::new("s1", 1, "Open login", "Login form visible");
        let settings = ExecutionSettings::default();
        for _ in 0..20 {
            let obs = runner.run_step(&step, &settings).await.unwrap();
            assert_eq!(obs.actual_result, "Login form visible");
        }
    }

    #[tokio::test]
    async fn test_full_failure_rate_always_fails() {
        let runner = instant(1.0, 7);
        let step = Step::new("s1", 1, "Open login", "Login form visible");
        let obs = runner
            .run_step(&step, &ExecutionSettings::default())
            .await
            .unwrap();
        assert!(FAILURE_OBSERVATIONS.contains(&obs.actual_result.as_str()));
    }

    #[tokio::test]
    async fn test_seeded_runs_are_reproducible() {
        let step = Step::new("s1", 1, "Submit", "Saved");
        let settings = ExecutionSettings::default();
        let a = instant(0.5, 42);
        let b = instant(0.5, 42);
        for _ in 0..30 {
            let x = a.run_step(&step, &settings).await.unwrap();
            let y = b.run_step(&step, &settings).await.unwrap();
            assert_eq!(x, y);
        }
    }

    #[test]
    fn test_rates_must_be_probabilities() {
        assert!(SimulatorConfig::default().validate().is_ok());
        for rate in [f64::NAN, f64::INFINITY, -0.1, 1.5] {
            let config = SimulatorConfig {
                failure_rate: rate,
                ..Default::default()
            };
            assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        }
        let config = SimulatorConfig {
            crash_rate: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_nan_rates_never_fire() {
        let runner = SimulatedRunner::new(SimulatorConfig {
            failure_rate: f64::NAN,
            crash_rate: f64::NAN,
            min_latency_ms: 0,
            max_latency_ms: 0,
            seed: Some(3),
        });
        let step = Step::new("s1", 1, "Submit", "Saved");
        let obs = runner
            .run_step(&step, &ExecutionSettings::default())
            .await
            .unwrap();
        assert_eq!(obs.actual_result, "Saved");
    }

    #[tokio::test]
    async fn test_crash_rate() {
        let runner = SimulatedRunner::new(SimulatorConfig {
            crash_rate: 1.0,
            min_latency_ms: 0,
            max_latency_ms: 0,
            seed: Some(1),
            ..Default::default()
        });
        let step = Step::new("s1", 1, "Submit", "Saved");
        let err = runner
            .run_step(&step, &ExecutionSettings::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("chromium"));
    }
}
