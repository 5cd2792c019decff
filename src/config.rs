// Habitat - Configuration
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Habitat toolkit configuration.
//!
//! Defaults reproduce the fixed constants of the demo dashboard; every stage
//! can be tuned independently through [`HabitatConfig`].

use crate::error::{HabitatError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Upper bound on the rows a single simulation may generate.
pub const MAX_ROWS: usize = 1_000_000;

/// Master configuration for a simulation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HabitatConfig {
    /// Sensor data generation.
    pub generator: GeneratorConfig,

    /// Health status thresholds.
    pub health: HealthThresholds,

    /// Anomaly detection.
    pub anomaly: AnomalyConfig,

    /// Failure risk predictor.
    pub predictor: PredictorConfig,
}

impl HabitatConfig {
    /// Load from a JSON file and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse from JSON and validate. Missing sections take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.generator.validate()?;
        self.health.validate()?;
        self.anomaly.validate()?;
        self.predictor.validate()
    }
}

/// Sensor data generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Interval between readings, in simulated hours.
    pub step_hours: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { step_hours: 0.1 }
    }
}

impl GeneratorConfig {
    /// Create a new generator config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tick size.
    pub fn with_step_hours(mut self, step_hours: f64) -> Self {
        self.step_hours = step_hours;
        self
    }

    /// Number of ticks in `[0, hours)`, at most [`MAX_ROWS`].
    pub fn row_count(&self, hours: f64) -> Result<usize> {
        let rows = (hours / self.step_hours).ceil().max(0.0);
        if !rows.is_finite() || rows > MAX_ROWS as f64 {
            return Err(HabitatError::invalid_input(format!(
                "{} hours at a {} h step exceeds the {} row limit",
                hours, self.step_hours, MAX_ROWS
            )));
        }
        Ok(rows as usize)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.step_hours.is_finite() || self.step_hours <= 0.0 {
            return Err(HabitatError::invalid_config(format!(
                "generator.step_hours must be finite and positive, got {}",
                self.step_hours
            )));
        }
        Ok(())
    }
}

/// Thresholds applied to column means by the health checker.
///
/// All comparisons are strict: a mean equal to a bound is nominal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthThresholds {
    pub oxygen_min: f64,
    pub oxygen_max: f64,
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub co2_max: f64,
    pub humidity_min: f64,
    pub humidity_max: f64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            oxygen_min: 19.5,
            oxygen_max: 20.5,
            temperature_min: 19.0,
            temperature_max: 25.0,
            co2_max: 0.05,
            humidity_min: 40.0,
            humidity_max: 60.0,
        }
    }
}

impl HealthThresholds {
    pub fn validate(&self) -> Result<()> {
        let ranges = [
            ("oxygen", self.oxygen_min, self.oxygen_max),
            ("temperature", self.temperature_min, self.temperature_max),
            ("humidity", self.humidity_min, self.humidity_max),
        ];
        for (name, min, max) in ranges {
            if !(min.is_finite() && max.is_finite()) || min > max {
                return Err(HabitatError::invalid_config(format!(
                    "health.{name} range is invalid: [{min}, {max}]"
                )));
            }
        }
        if !self.co2_max.is_finite() {
            return Err(HabitatError::invalid_config("health.co2_max must be finite"));
        }
        Ok(())
    }
}

/// Anomaly detection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// A value is anomalous when `|value - mean| > z_threshold * std`.
    pub z_threshold: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self { z_threshold: 2.0 }
    }
}

impl AnomalyConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.z_threshold.is_finite() || self.z_threshold <= 0.0 {
            return Err(HabitatError::invalid_config(format!(
                "anomaly.z_threshold must be finite and positive, got {}",
                self.z_threshold
            )));
        }
        Ok(())
    }
}

/// Failure risk predictor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Fraction of rows held out for evaluation, in (0, 1).
    pub test_fraction: f64,

    /// Seed of the train/test shuffle, independent of the label source.
    pub split_seed: u64,

    /// Shape of the default forest regressor.
    pub forest: ForestConfig,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            split_seed: 42,
            forest: ForestConfig::default(),
        }
    }
}

impl PredictorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(HabitatError::invalid_config(format!(
                "predictor.test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        self.forest.validate()
    }
}

/// Bagged regression tree ensemble configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees.
    pub n_trees: usize,

    /// Maximum tree depth (`None` = grow until leaves are pure or too small).
    pub max_depth: Option<usize>,

    /// Minimum samples required to split a node.
    pub min_samples_split: usize,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

impl ForestConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(HabitatError::invalid_config(
                "predictor.forest.n_trees must be at least 1",
            ));
        }
        if self.min_samples_split < 2 {
            return Err(HabitatError::invalid_config(format!(
                "predictor.forest.min_samples_split must be at least 2, got {}",
                self.min_samples_split
            )));
        }
        Ok(())
    }
}
