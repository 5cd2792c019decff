// Habitat - Reading table
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Reading table structures and export.
//!
//! A [`ReadingTable`] is the fixed-schema, time-ordered output of the
//! generator and the input of every analysis stage.

use crate::error::{HabitatError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

/// One column of the reading table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Time,
    OxygenLevel,
    Temperature,
    WaterUsage,
    Co2Level,
    Humidity,
    PowerUsage,
}

impl Channel {
    /// Every column, time first.
    pub const ALL: [Channel; 7] = [
        Channel::Time,
        Channel::OxygenLevel,
        Channel::Temperature,
        Channel::WaterUsage,
        Channel::Co2Level,
        Channel::Humidity,
        Channel::PowerUsage,
    ];

    /// The six measurement columns (everything except time).
    pub const MEASUREMENTS: [Channel; 6] = [
        Channel::OxygenLevel,
        Channel::Temperature,
        Channel::WaterUsage,
        Channel::Co2Level,
        Channel::Humidity,
        Channel::PowerUsage,
    ];

    /// Human-readable column label.
    pub fn label(&self) -> &'static str {
        match self {
            Channel::Time => "Time",
            Channel::OxygenLevel => "Oxygen Level",
            Channel::Temperature => "Temperature",
            Channel::WaterUsage => "Water Usage",
            Channel::Co2Level => "CO2 Level",
            Channel::Humidity => "Humidity",
            Channel::PowerUsage => "Power Usage",
        }
    }

    /// Unit of measurement.
    pub fn unit(&self) -> &'static str {
        match self {
            Channel::Time => "h",
            Channel::OxygenLevel => "%",
            Channel::Temperature => "°C",
            Channel::WaterUsage => "L",
            Channel::Co2Level => "%",
            Channel::Humidity => "%",
            Channel::PowerUsage => "W",
        }
    }

    /// Snake-case identifier used for CSV headers.
    pub fn key(&self) -> &'static str {
        match self {
            Channel::Time => "time",
            Channel::OxygenLevel => "oxygen_level",
            Channel::Temperature => "temperature",
            Channel::WaterUsage => "water_usage",
            Channel::Co2Level => "co2_level",
            Channel::Humidity => "humidity",
            Channel::PowerUsage => "power_usage",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single row of habitat measurements.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Reading {
    /// Elapsed simulation time in hours.
    pub time: f64,
    /// Oxygen concentration (%).
    pub oxygen_level: f64,
    /// Cabin temperature (°C).
    pub temperature: f64,
    /// Water usage (litres).
    pub water_usage: f64,
    /// CO2 concentration (%).
    pub co2_level: f64,
    /// Relative humidity (%).
    pub humidity: f64,
    /// Power draw (W).
    pub power_usage: f64,
}

impl Reading {
    /// Get the value of a column.
    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Time => self.time,
            Channel::OxygenLevel => self.oxygen_level,
            Channel::Temperature => self.temperature,
            Channel::WaterUsage => self.water_usage,
            Channel::Co2Level => self.co2_level,
            Channel::Humidity => self.humidity,
            Channel::PowerUsage => self.power_usage,
        }
    }

    /// The six measurement values in [`Channel::MEASUREMENTS`] order.
    pub fn features(&self) -> [f64; 6] {
        Channel::MEASUREMENTS.map(|c| self.get(c))
    }
}

/// Basic statistics for a column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator, 0 for a single row).
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl ColumnStats {
    /// Compute statistics over a slice of values. `None` when empty.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;

        let std_dev = if count > 1 {
            let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (sum_sq / (count - 1) as f64).sqrt()
        } else {
            0.0
        };

        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            count,
            mean,
            std_dev,
            min,
            max,
        })
    }

    /// Signed distance from the mean in standard deviations.
    ///
    /// Zero spread yields 0 for the mean itself and an infinite score
    /// otherwise.
    pub fn z_score(&self, value: f64) -> f64 {
        let deviation = value - self.mean;
        if self.std_dev > 0.0 {
            deviation / self.std_dev
        } else if deviation == 0.0 {
            0.0
        } else {
            deviation.signum() * f64::INFINITY
        }
    }
}

/// An ordered, time-indexed table of habitat readings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingTable {
    rows: Vec<Reading>,
}

impl ReadingTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from existing rows.
    pub fn from_rows(rows: Vec<Reading>) -> Self {
        Self { rows }
    }

    /// Get all rows.
    pub fn rows(&self) -> &[Reading] {
        &self.rows
    }

    /// Iterate over rows.
    pub fn iter(&self) -> std::slice::Iter<'_, Reading> {
        self.rows.iter()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fail with `InvalidInput` if the table has no rows or any field is
    /// NaN or infinite.
    pub fn validate(&self, operation: &str) -> Result<()> {
        if self.is_empty() {
            return Err(HabitatError::invalid_input(format!(
                "{} requires a non-empty reading table",
                operation
            )));
        }

        for (index, row) in self.rows.iter().enumerate() {
            if let Some(&channel) = Channel::ALL.iter().find(|&&c| !row.get(c).is_finite()) {
                return Err(HabitatError::invalid_input(format!(
                    "{} requires finite readings, row {} has {} = {}",
                    operation,
                    index,
                    channel.key(),
                    row.get(channel)
                )));
            }
        }
        Ok(())
    }

    /// Get a column as a vector of values.
    pub fn column(&self, channel: Channel) -> Vec<f64> {
        self.rows.iter().map(|r| r.get(channel)).collect()
    }

    /// Column mean. `None` when empty.
    pub fn mean(&self, channel: Channel) -> Option<f64> {
        if self.rows.is_empty() {
            return None;
        }
        let sum: f64 = self.rows.iter().map(|r| r.get(channel)).sum();
        Some(sum / self.rows.len() as f64)
    }

    /// Column statistics. `None` when empty.
    pub fn stats(&self, channel: Channel) -> Option<ColumnStats> {
        ColumnStats::from_values(&self.column(channel))
    }

    /// Rows at the given indices, in the order given. Out-of-range indices
    /// are skipped.
    pub fn subset(&self, indices: &[usize]) -> ReadingTable {
        let rows = indices
            .iter()
            .filter_map(|&i| self.rows.get(i).copied())
            .collect();
        Self { rows }
    }

    /// Simulated span covered by the table, in hours.
    pub fn duration_hours(&self) -> f64 {
        match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        }
    }

    /// Write the table as CSV with a header row.
    pub fn to_csv_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(Channel::ALL.iter().map(|c| c.key()))?;
        for row in &self.rows {
            csv.write_record(Channel::ALL.iter().map(|&c| format!("{:.6}", row.get(c))))?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl FromIterator<Reading> for ReadingTable {
    fn from_iter<I: IntoIterator<Item = Reading>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ReadingTable {
    type Item = &'a Reading;
    type IntoIter = std::slice::Iter<'a, Reading>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
