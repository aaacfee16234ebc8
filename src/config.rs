//! Tunables consumed by the miner, the trainer and the predictor.
//!
//! Every struct has explicit defaults and round-trips through JSON so a
//! training run can record exactly what it was built with.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// Extra preceding words allowed beyond `2 * len(shortform)`.
    pub window_slack: usize,
    /// Nodes below this frequency are pruned; a child must reach it to be
    /// specialized into.
    pub min_support: usize,
    /// Minimum `child.frequency / node.frequency` to keep specializing.
    pub specialization_ratio: f64,
}

impl MinerConfig {
    pub fn v0() -> Self {
        Self {
            window_slack: 5,
            min_support: 1,
            specialization_ratio: 0.1,
        }
    }

    /// Maximum number of preceding words considered for a shortform of
    /// `chars` characters as written (`IL-6` counts 4).
    pub fn window_len(&self, chars: usize) -> usize {
        2 * chars + self.window_slack
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratio = self.specialization_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(invalid("miner.specialization_ratio", format!("{ratio} not in (0, 1]")));
        }
        if self.min_support == 0 {
            return Err(invalid("miner.min_support", "must be at least 1"));
        }
        Ok(())
    }
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self::v0()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub min_examples_per_class: usize,
    /// Vocabulary cap K.
    pub vocabulary_size: usize,
    pub folds: usize,
    /// Inverse regularization strengths (C) searched by cross-validation.
    pub regularization_grid: Vec<f64>,
    pub max_iterations: usize,
    /// Gradient step, scaled down by `1 + lambda` so strong regularization
    /// cannot overshoot.
    pub learning_rate: f64,
    pub tolerance: f64,
    /// Seed for stratified fold assignment.
    pub seed: u64,
}

impl TrainingConfig {
    pub fn v0() -> Self {
        Self {
            min_examples_per_class: 5,
            vocabulary_size: 1000,
            folds: 5,
            regularization_grid: vec![0.01, 0.1, 1.0, 10.0, 100.0],
            max_iterations: 300,
            learning_rate: 1.0,
            tolerance: 1e-6,
            seed: 0,
        }
    }

    /// Checked by the trainer before any fitting, since the fields are
    /// public and need not come through [`Config::from_json_str`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vocabulary_size == 0 {
            return Err(invalid("training.vocabulary_size", "must be at least 1"));
        }
        if self.folds < 2 {
            return Err(invalid("training.folds", format!("{} folds, need at least 2", self.folds)));
        }
        if self.min_examples_per_class == 0 {
            return Err(invalid("training.min_examples_per_class", "must be at least 1"));
        }
        if self.regularization_grid.is_empty() {
            return Err(invalid("training.regularization_grid", "must not be empty"));
        }
        if let Some(c) = self.regularization_grid.iter().find(|c| !(c.is_finite() && **c > 0.0)) {
            return Err(invalid("training.regularization_grid", format!("{c} is not a positive C")));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(invalid("training.learning_rate", format!("{}", self.learning_rate)));
        }
        if self.max_iterations == 0 {
            return Err(invalid("training.max_iterations", "must be at least 1"));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(invalid("training.tolerance", format!("{}", self.tolerance)));
        }
        Ok(())
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self::v0()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// τ: minimum top-class probability to accept a prediction.
    pub confidence_threshold: f64,
    /// Tokens on each side of an occurrence fed to the feature extractor.
    pub context_radius: usize,
}

impl PredictionConfig {
    pub fn v0() -> Self {
        Self {
            confidence_threshold: 0.5,
            context_radius: 10,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let tau = self.confidence_threshold;
        if !(0.0..=1.0).contains(&tau) {
            return Err(invalid("prediction.confidence_threshold", format!("{tau} not in [0, 1]")));
        }
        Ok(())
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self::v0()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub miner: MinerConfig,
    pub training: TrainingConfig,
    pub prediction: PredictionConfig,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.miner.validate()?;
        self.training.validate()?;
        self.prediction.validate()
    }
}
