// Habitat - Failure risk predictor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Failure risk prediction.
//!
//! A toy pipeline: each reading gets a risk label from a [`RiskLabeler`], the
//! rows are split into train and held-out sets, a [`Regressor`] is trained on
//! the six measurement channels, and its held-out predictions are returned.
//!
//! The default labeler draws uniform random labels, so the predictions carry
//! no information about real failures. Swap in a labeler backed by a real
//! failure signal to make the output meaningful; callers stay unchanged.

mod forest;
mod regressor;

pub use forest::{ForestRegressor, RegressionTree};
pub use regressor::{mean_squared_error, FeatureRow, LinearRegressor, Regressor, FEATURE_COUNT};

use crate::config::PredictorConfig;
use crate::error::{HabitatError, Result};
use crate::reading::ReadingTable;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Source of per-row failure risk labels.
pub trait RiskLabeler {
    /// One label per row of `table`.
    fn label(&self, table: &ReadingTable, rng: &mut dyn RngCore) -> Result<Vec<f64>>;
}

/// Placeholder labels: independent uniform draws in `[0, 1)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomRiskLabels;

impl RiskLabeler for RandomRiskLabels {
    fn label(&self, table: &ReadingTable, rng: &mut dyn RngCore) -> Result<Vec<f64>> {
        Ok((0..table.len()).map(|_| rng.gen::<f64>()).collect())
    }
}

/// Row indices of a train/held-out partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with `seed` and hold out `ceil(test_fraction * n)` rows.
///
/// Both sides must end up non-empty.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Result<Split> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(HabitatError::invalid_input(format!(
            "test fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }

    let n_test = (test_fraction * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(HabitatError::invalid_input(format!(
            "cannot split {} rows into non-empty train and test sets",
            n
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));
    let train = order.split_off(n_test);

    Ok(Split { train, test: order })
}

/// Output of one prediction pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureForecast {
    /// Regressor that produced the predictions.
    pub model: String,
    /// Predicted risk for each held-out row.
    pub predictions: Vec<f64>,
    /// Labels of the held-out rows, aligned with `predictions`.
    pub actual: Vec<f64>,
    /// Positions of the held-out rows in the input table.
    pub test_indices: Vec<usize>,
    /// Number of rows the model was trained on.
    pub train_rows: usize,
    /// Held-out mean squared error.
    pub mse: f64,
}

/// Label, split, train, predict.
pub struct FailurePredictor {
    config: PredictorConfig,
    regressor: Box<dyn Regressor>,
    labeler: Box<dyn RiskLabeler>,
}

impl FailurePredictor {
    /// Create a predictor using a forest regressor and random labels.
    pub fn new(config: PredictorConfig) -> Self {
        let regressor = Box::new(ForestRegressor::new(config.forest.clone()));
        Self {
            config,
            regressor,
            labeler: Box::new(RandomRiskLabels),
        }
    }

    /// Replace the regression strategy.
    pub fn with_regressor(mut self, regressor: impl Regressor + 'static) -> Self {
        self.regressor = Box::new(regressor);
        self
    }

    /// Replace the label source.
    pub fn with_labeler(mut self, labeler: impl RiskLabeler + 'static) -> Self {
        self.labeler = Box::new(labeler);
        self
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Name of the configured regressor.
    pub fn model_name(&self) -> &'static str {
        self.regressor.name()
    }

    /// Run one full pass. The model is refitted from scratch every call.
    pub fn forecast<R: RngCore + ?Sized>(
        &mut self,
        table: &ReadingTable,
        rng: &mut R,
    ) -> Result<FailureForecast> {
        let mut rng = rng;
        let rng: &mut dyn RngCore = &mut rng;

        self.config.validate()?;
        table.validate("failure prediction")?;

        let labels = self.labeler.label(table, rng)?;
        if labels.len() != table.len() {
            return Err(HabitatError::Model(format!(
                "labeler produced {} labels for {} rows",
                labels.len(),
                table.len()
            )));
        }

        let split = train_test_split(
            table.len(),
            self.config.test_fraction,
            self.config.split_seed,
        )?;
        debug!(
            train = split.train.len(),
            test = split.test.len(),
            "failure predictor split"
        );

        let rows = table.rows();
        let train_x: Vec<FeatureRow> = split.train.iter().map(|&i| rows[i].features()).collect();
        let train_y: Vec<f64> = split.train.iter().map(|&i| labels[i]).collect();
        let test_x: Vec<FeatureRow> = split.test.iter().map(|&i| rows[i].features()).collect();
        let actual: Vec<f64> = split.test.iter().map(|&i| labels[i]).collect();

        self.regressor.fit(&train_x, &train_y, rng)?;
        let predictions = self.regressor.predict(&test_x)?;
        let mse = mean_squared_error(&actual, &predictions)?;

        info!(model = self.regressor.name(), mse, "Model Mean Squared Error: {}", mse);

        Ok(FailureForecast {
            model: self.regressor.name().to_string(),
            predictions,
            actual,
            test_indices: split.test,
            train_rows: split.train.len(),
            mse,
        })
    }
}

impl Default for FailurePredictor {
    fn default() -> Self {
        Self::new(PredictorConfig::default())
    }
}

impl std::fmt::Debug for FailurePredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailurePredictor")
            .field("config", &self.config)
            .field("model", &self.regressor.name())
            .finish()
    }
}

/// Predict failure risk for the held-out 20% of `table` with the default
/// forest regressor and random labels.
pub fn predict_failures<R: RngCore + ?Sized>(
    table: &ReadingTable,
    rng: &mut R,
) -> Result<Vec<f64>> {
    Ok(FailurePredictor::default().forecast(table, rng)?.predictions)
}
