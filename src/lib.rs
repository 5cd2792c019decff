// Habitat - Crate root
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Habitat
//!
//! Synthetic environmental sensor data for a crewed space habitat, with the
//! three analyses a habitat dashboard runs over it.
//!
//! ## Key Features
//!
//! - **Sensor simulation**: oxygen, temperature, water, CO2, humidity and power
//!   channels as fixed functions of elapsed time plus bounded noise
//! - **Health status**: threshold rules over column means
//! - **Anomaly detection**: rows with any column beyond two standard deviations
//! - **Failure risk**: a toy regression pipeline with pluggable model and labels
//!
//! Every random draw comes from a caller-supplied `rand` generator, so a seeded
//! generator makes a whole pass reproducible.
//!
//! ## Quick Start
//!
//! ```rust
//! use habitat::{check_health_status, detect_anomalies, predict_failures, simulate_sensor_data};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//!
//! // 4 astronauts, 12 simulated hours, one reading every 0.1 h
//! let readings = simulate_sensor_data(4, 12.0, &mut rng).unwrap();
//! assert_eq!(readings.len(), 120);
//!
//! let status = check_health_status(&readings).unwrap();
//! assert!(status.starts_with("✅"));
//!
//! let risk = predict_failures(&readings, &mut rng).unwrap();
//! assert_eq!(risk.len(), 24);
//!
//! let anomalies = detect_anomalies(&readings).unwrap();
//! assert!(anomalies.len() < readings.len());
//! ```
//!
//! ## Modules
//!
//! - [`reading`]: Fixed-schema readings, tables and column statistics
//! - [`generator`]: Sensor data simulation
//! - [`health`]: Threshold health checks
//! - [`anomaly`]: Z-score anomaly detection
//! - [`predictor`]: Failure risk regression pipeline
//! - [`pipeline`]: All of the above in one pass
//! - [`config`]: Tunables for every stage

// Modules
pub mod anomaly;
pub mod config;
pub mod error;
pub mod generator;
pub mod health;
pub mod pipeline;
pub mod predictor;
pub mod reading;

// Re-exports
pub use anomaly::{detect_anomalies, Anomaly, AnomalyDetector, ChannelDeviation};
pub use config::{
    AnomalyConfig, ForestConfig, GeneratorConfig, HabitatConfig, HealthThresholds,
    PredictorConfig, MAX_ROWS,
};
pub use error::{HabitatError, Result};
pub use generator::{simulate_sensor_data, SensorSimulator, SignalPattern};
pub use health::{
    check_health_status, Deviation, HealthChecker, HealthReport, HealthWarning, WarningKind,
};
pub use pipeline::{HabitatMonitor, SimulationReport};
pub use predictor::{
    predict_failures, FailureForecast, FailurePredictor, ForestRegressor, LinearRegressor,
    RandomRiskLabels, Regressor, RiskLabeler,
};
pub use reading::{Channel, ColumnStats, Reading, ReadingTable};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
