//! Run configuration, loaded from TOML with every key optional.
//!
//! ```toml
//! seed = 42
//! feature_set = "extended"
//! protocol = "leave-one-out"
//! test_fraction = 0.3
//! parallel_folds = true
//!
//! [classifier]
//! kind = "logistic"
//! class_weight = "balanced"
//! ridge = 1.0
//! ```

use crate::features::FeatureSet;
use crate::model::{ClassWeight, Classifier, WeightedLogistic, WeightedNeighbours};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Seed used for every stochastic step unless configured otherwise.
pub const DEFAULT_SEED: u64 = 42;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML configuration: {0}")]
    TomlParseError(#[from] toml::de::Error),
    #[error("test_fraction must lie strictly between 0 and 1, got {0}")]
    InvalidTestFraction(f64),
    #[error("classifier.neighbours must be at least 1")]
    ZeroNeighbours,
    #[error("classifier.ridge must be finite and non-negative, got {0}")]
    InvalidRidge(f64),
}

/// Validation protocol for the trainer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Protocol {
    /// Stratified train/test split.
    Holdout,
    /// One fit per record, each predicting the record it left out.
    #[default]
    LeaveOneOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ClassifierKind {
    #[default]
    Logistic,
    Neighbours,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub kind: ClassifierKind,
    pub class_weight: ClassWeight,
    /// L2 penalty on the standardised logistic coefficients.
    pub ridge: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub neighbours: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            kind: ClassifierKind::Logistic,
            class_weight: ClassWeight::Balanced,
            ridge: 1.0,
            max_iterations: 100,
            tolerance: 1e-8,
            neighbours: 3,
        }
    }
}

impl ClassifierConfig {
    /// A fresh, untrained classifier.
    pub fn build(&self) -> Classifier {
        match self.kind {
            ClassifierKind::Logistic => Classifier::Logistic(WeightedLogistic::new(
                self.class_weight,
                self.ridge,
                self.max_iterations,
                self.tolerance,
            )),
            ClassifierKind::Neighbours => Classifier::Neighbours(WeightedNeighbours::new(
                self.class_weight,
                self.neighbours,
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub seed: u64,
    /// Layout used when deriving features. Tables read back keep their own
    /// columns unless `--feature-set` names one explicitly.
    pub feature_set: FeatureSet,
    pub protocol: Protocol,
    pub test_fraction: f64,
    pub parallel_folds: bool,
    pub classifier: ClassifierConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            feature_set: FeatureSet::Extended,
            protocol: Protocol::LeaveOneOut,
            test_fraction: 0.3,
            parallel_folds: true,
            classifier: ClassifierConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ConfigError::InvalidTestFraction(self.test_fraction));
        }
        if self.classifier.neighbours == 0 {
            return Err(ConfigError::ZeroNeighbours);
        }
        if !self.classifier.ridge.is_finite() || self.classifier.ridge < 0.0 {
            return Err(ConfigError::InvalidRidge(self.classifier.ridge));
        }
        Ok(())
    }
}
