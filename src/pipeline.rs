// Habitat - Simulation pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! One full generate-and-analyse pass.

use crate::anomaly::{Anomaly, AnomalyDetector};
use crate::config::HabitatConfig;
use crate::error::Result;
use crate::generator::SensorSimulator;
use crate::health::{HealthChecker, HealthReport};
use crate::predictor::{FailureForecast, FailurePredictor};
use crate::reading::ReadingTable;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Everything a dashboard needs to render one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub astronauts: u32,
    pub hours: f64,
    pub readings: ReadingTable,
    pub health: HealthReport,
    pub forecast: FailureForecast,
    pub anomalies: Vec<Anomaly>,
}

impl SimulationReport {
    /// Flagged rows as a table.
    pub fn anomaly_table(&self) -> ReadingTable {
        self.anomalies.iter().map(|a| a.reading).collect()
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Runs the generator and the three analysis stages with one configuration.
#[derive(Debug)]
pub struct HabitatMonitor {
    simulator: SensorSimulator,
    health: HealthChecker,
    anomaly: AnomalyDetector,
    predictor: FailurePredictor,
}

impl HabitatMonitor {
    /// Build every stage from `config` after validating it.
    pub fn new(config: HabitatConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            simulator: SensorSimulator::new(config.generator),
            health: HealthChecker::new(config.health),
            anomaly: AnomalyDetector::new(config.anomaly),
            predictor: FailurePredictor::new(config.predictor),
        })
    }

    /// Replace the failure predictor (custom regressor or labeler).
    pub fn with_predictor(mut self, predictor: FailurePredictor) -> Self {
        self.predictor = predictor;
        self
    }

    /// Generate readings and run every analysis over them.
    pub fn run<R: RngCore + ?Sized>(
        &mut self,
        astronauts: u32,
        hours: f64,
        rng: &mut R,
    ) -> Result<SimulationReport> {
        let readings = self.simulator.simulate(astronauts, hours, rng)?;
        let health = self.health.check(&readings)?;
        let forecast = self.predictor.forecast(&readings, rng)?;
        let anomalies = self.anomaly.scan(&readings)?;

        info!(
            astronauts,
            hours,
            rows = readings.len(),
            warnings = health.warnings.len(),
            anomalies = anomalies.len(),
            "simulation pass complete"
        );

        Ok(SimulationReport {
            astronauts,
            hours,
            readings,
            health,
            forecast,
            anomalies,
        })
    }
}
