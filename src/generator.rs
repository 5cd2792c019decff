// Habitat - Sensor data generator
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Synthetic habitat sensor data generation.
//!
//! Each channel follows a fixed [`SignalPattern`] evaluated at elapsed time
//! `t` (hours). Trigonometric channels are noise-free; water and power carry
//! bounded uniform noise drawn from the caller's random source.

use crate::config::GeneratorConfig;
use crate::error::{HabitatError, Result};
use crate::reading::{Reading, ReadingTable};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Signal shape of one generated channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SignalPattern {
    /// `offset + amplitude * sin(t)`
    Sine { offset: f64, amplitude: f64 },

    /// `offset + amplitude * cos(t)`
    Cosine { offset: f64, amplitude: f64 },

    /// Uniform draw in `[low, high)`.
    Uniform { low: f64, high: f64 },

    /// `per_crew * astronauts + uniform[-jitter, jitter)`
    CrewLoad { per_crew: f64, jitter: f64 },
}

impl SignalPattern {
    /// Evaluate the pattern at time `t` for a crew of `astronauts`.
    pub fn evaluate<R: Rng + ?Sized>(&self, t: f64, astronauts: u32, rng: &mut R) -> f64 {
        match *self {
            SignalPattern::Sine { offset, amplitude } => offset + amplitude * t.sin(),
            SignalPattern::Cosine { offset, amplitude } => offset + amplitude * t.cos(),
            SignalPattern::Uniform { low, high } => rng.gen_range(low..high),
            SignalPattern::CrewLoad { per_crew, jitter } => {
                per_crew * astronauts as f64 + rng.gen_range(-jitter..jitter)
            }
        }
    }

    /// Bounds the pattern can produce for a crew of `astronauts`.
    pub fn range(&self, astronauts: u32) -> (f64, f64) {
        match *self {
            SignalPattern::Sine { offset, amplitude }
            | SignalPattern::Cosine { offset, amplitude } => {
                (offset - amplitude.abs(), offset + amplitude.abs())
            }
            SignalPattern::Uniform { low, high } => (low, high),
            SignalPattern::CrewLoad { per_crew, jitter } => {
                let base = per_crew * astronauts as f64;
                (base - jitter, base + jitter)
            }
        }
    }
}

/// Oxygen concentration, 19.5% to 20.5%.
pub const OXYGEN: SignalPattern = SignalPattern::Sine {
    offset: 20.0,
    amplitude: 0.5,
};

/// Cabin temperature, 19°C to 25°C.
pub const TEMPERATURE: SignalPattern = SignalPattern::Cosine {
    offset: 22.0,
    amplitude: 3.0,
};

/// Water usage between 1 and 5 litres.
pub const WATER_USAGE: SignalPattern = SignalPattern::Uniform {
    low: 1.0,
    high: 5.0,
};

/// CO2 concentration, 0.02% to 0.06%.
pub const CO2: SignalPattern = SignalPattern::Sine {
    offset: 0.04,
    amplitude: 0.02,
};

/// Relative humidity, 40% to 60%.
pub const HUMIDITY: SignalPattern = SignalPattern::Cosine {
    offset: 50.0,
    amplitude: 10.0,
};

/// Power draw, 100 W per astronaut ± 10 W.
pub const POWER_USAGE: SignalPattern = SignalPattern::CrewLoad {
    per_crew: 100.0,
    jitter: 10.0,
};

/// Generates reading tables.
#[derive(Debug, Clone, Default)]
pub struct SensorSimulator {
    config: GeneratorConfig,
}

impl SensorSimulator {
    /// Create a simulator with the given configuration.
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate one reading per tick in `[0, hours)`.
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        astronaut_count: u32,
        hours: f64,
        rng: &mut R,
    ) -> Result<ReadingTable> {
        self.config.validate()?;

        if astronaut_count == 0 {
            return Err(HabitatError::invalid_input(
                "astronaut count must be at least 1",
            ));
        }
        if !hours.is_finite() || hours <= 0.0 {
            return Err(HabitatError::invalid_input(format!(
                "simulation hours must be finite and positive, got {}",
                hours
            )));
        }

        let rows = self.config.row_count(hours)?;
        let table: ReadingTable = (0..rows)
            .map(|i| {
                let t = i as f64 * self.config.step_hours;
                Reading {
                    time: t,
                    oxygen_level: OXYGEN.evaluate(t, astronaut_count, rng),
                    temperature: TEMPERATURE.evaluate(t, astronaut_count, rng),
                    water_usage: WATER_USAGE.evaluate(t, astronaut_count, rng),
                    co2_level: CO2.evaluate(t, astronaut_count, rng),
                    humidity: HUMIDITY.evaluate(t, astronaut_count, rng),
                    power_usage: POWER_USAGE.evaluate(t, astronaut_count, rng),
                }
            })
            .collect();

        debug!(
            astronauts = astronaut_count,
            hours,
            rows = table.len(),
            "generated sensor data"
        );

        Ok(table)
    }
}

/// Generate a reading table with the default 0.1-hour tick.
pub fn simulate_sensor_data<R: Rng + ?Sized>(
    astronaut_count: u32,
    hours: f64,
    rng: &mut R,
) -> Result<ReadingTable> {
    SensorSimulator::default().simulate(astronaut_count, hours, rng)
}
