// Solid Engine CLI - Command-line front end for Solid Engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! YAML configuration.
//!
//! ```yaml
//! thresholds:
//!   outlier: 5.0
//! simulation:
//!   seed: 42
//!   jitter: 0.5
//! cli:
//!   default_dataset: data/sample_readings.csv
//! ```
//!
//! Every section and key is optional.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use solid_engine::{DEFAULT_JITTER, DEFAULT_OUTLIER_THRESHOLD, DEFAULT_SEED};
use std::path::Path;

/// Dataset used by `report` when `--data` is absent.
pub const DEFAULT_DATASET: &str = "data/sample_readings.csv";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Outlier settings.
    pub thresholds: ThresholdConfig,

    /// Generator settings.
    pub simulation: SimulationConfig,

    /// Front-end settings.
    #[serde(alias = "CLI")]
    pub cli: CliConfig,
}

/// Outlier settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Absolute delta at or above which a reading is an outlier.
    pub outlier: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            outlier: DEFAULT_OUTLIER_THRESHOLD,
        }
    }
}

/// Generator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    pub jitter: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            jitter: DEFAULT_JITTER,
        }
    }
}

/// Front-end settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub default_dataset: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            default_dataset: DEFAULT_DATASET.to_string(),
        }
    }
}

impl Config {
    /// Load from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| CliError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Parse YAML text. Empty text yields the defaults.
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Reject values the pipeline would refuse later.
    pub fn validate(&self) -> Result<()> {
        let outlier = self.thresholds.outlier;
        if !outlier.is_finite() || outlier < 0.0 {
            return Err(CliError::InvalidConfig(format!(
                "thresholds.outlier must be a finite value >= 0, got {}",
                outlier
            )));
        }
        let jitter = self.simulation.jitter;
        if !jitter.is_finite() || jitter < 0.0 {
            return Err(CliError::InvalidConfig(format!(
                "simulation.jitter must be a finite value >= 0, got {}",
                jitter
            )));
        }
        Ok(())
    }
}
