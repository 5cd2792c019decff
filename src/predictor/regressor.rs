// Habitat - Regressors
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Regression strategies for the failure risk predictor.

use crate::error::{HabitatError, Result};
use nalgebra::{DMatrix, DVector};
use rand::RngCore;

/// Number of input features (the six measurement channels).
pub const FEATURE_COUNT: usize = 6;

/// One feature vector, in [`Channel::MEASUREMENTS`](crate::Channel::MEASUREMENTS) order.
pub type FeatureRow = [f64; FEATURE_COUNT];

/// A trainable regression model.
///
/// `fit` replaces any previously learned state.
pub trait Regressor {
    /// Short model identifier for diagnostics.
    fn name(&self) -> &'static str;

    /// Train on `features` against `targets`.
    fn fit(&mut self, features: &[FeatureRow], targets: &[f64], rng: &mut dyn RngCore)
        -> Result<()>;

    /// Predict one value per feature row.
    fn predict(&self, features: &[FeatureRow]) -> Result<Vec<f64>>;
}

pub(crate) fn check_training_shape(features: &[FeatureRow], targets: &[f64]) -> Result<()> {
    if features.is_empty() {
        return Err(HabitatError::Model("no training rows".to_string()));
    }
    if features.len() != targets.len() {
        return Err(HabitatError::Model(format!(
            "feature rows ({}) and targets ({}) differ in length",
            features.len(),
            targets.len()
        )));
    }
    Ok(())
}

/// Ordinary least squares with an intercept term, solved by SVD.
#[derive(Debug, Clone, Default)]
pub struct LinearRegressor {
    coefficients: Option<DVector<f64>>,
}

impl LinearRegressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intercept followed by one weight per feature, once fitted.
    pub fn coefficients(&self) -> Option<&[f64]> {
        self.coefficients.as_ref().map(|c| c.as_slice())
    }
}

impl Regressor for LinearRegressor {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn fit(
        &mut self,
        features: &[FeatureRow],
        targets: &[f64],
        _rng: &mut dyn RngCore,
    ) -> Result<()> {
        check_training_shape(features, targets)?;

        // Design matrix (samples x (1 + features)), first column is the intercept
        let design = DMatrix::<f64>::from_fn(features.len(), FEATURE_COUNT + 1, |i, j| {
            if j == 0 {
                1.0
            } else {
                features[i][j - 1]
            }
        });
        let y = DVector::<f64>::from_column_slice(targets);

        // Habitat channels are collinear (oxygen/CO2 share sin t), so singular
        // values below a relative tolerance are treated as zero.
        let svd = design.svd(true, true);
        let tolerance = svd.singular_values.max() * 1e-10;
        let beta = svd
            .solve(&y, tolerance)
            .map_err(|e| HabitatError::Model(format!("least squares solve failed: {}", e)))?;

        self.coefficients = Some(beta);
        Ok(())
    }

    fn predict(&self, features: &[FeatureRow]) -> Result<Vec<f64>> {
        let beta = self
            .coefficients
            .as_ref()
            .ok_or_else(|| HabitatError::Model("linear model is not fitted".to_string()))?;

        Ok(features
            .iter()
            .map(|row| {
                beta[0]
                    + row
                        .iter()
                        .enumerate()
                        .map(|(j, x)| beta[j + 1] * x)
                        .sum::<f64>()
            })
            .collect())
    }
}

/// Mean squared error between `actual` and `predicted`.
pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return Err(HabitatError::invalid_input(format!(
            "mean squared error needs equal non-empty inputs, got {} and {}",
            actual.len(),
            predicted.len()
        )));
    }
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    Ok(sum / actual.len() as f64)
}
