// Habitat - Anomaly detection
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Statistical outlier detection over a reading table.

use crate::config::AnomalyConfig;
use crate::error::Result;
use crate::reading::{Channel, ColumnStats, Reading, ReadingTable};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One channel of a row that exceeded the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelDeviation {
    pub channel: Channel,
    pub value: f64,
    pub z_score: f64,
}

/// A flagged row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    /// Row position in the scanned table.
    pub index: usize,
    pub reading: Reading,
    /// Every channel that exceeded the threshold, in column order.
    pub channels: Vec<ChannelDeviation>,
}

/// Whole-table z-score anomaly detector.
#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    config: AnomalyConfig,
}

impl AnomalyDetector {
    pub fn new(config: AnomalyConfig) -> Self {
        Self { config }
    }

    /// Check if `value` lies strictly more than `z_threshold` standard
    /// deviations from the column mean.
    pub fn is_outlier(&self, value: f64, stats: &ColumnStats) -> bool {
        (value - stats.mean).abs() > self.config.z_threshold * stats.std_dev
    }

    /// Flag every row with at least one outlying column. Statistics are
    /// computed over the whole table, time column included.
    pub fn scan(&self, table: &ReadingTable) -> Result<Vec<Anomaly>> {
        table.validate("anomaly detection")?;

        let stats: Vec<(Channel, ColumnStats)> = Channel::ALL
            .iter()
            .filter_map(|&c| table.stats(c).map(|s| (c, s)))
            .collect();

        let anomalies: Vec<Anomaly> = table
            .iter()
            .enumerate()
            .filter_map(|(index, reading)| {
                let channels: Vec<ChannelDeviation> = stats
                    .iter()
                    .filter(|(c, s)| self.is_outlier(reading.get(*c), s))
                    .map(|(c, s)| ChannelDeviation {
                        channel: *c,
                        value: reading.get(*c),
                        z_score: s.z_score(reading.get(*c)),
                    })
                    .collect();

                (!channels.is_empty()).then(|| Anomaly {
                    index,
                    reading: *reading,
                    channels,
                })
            })
            .collect();

        debug!(
            rows = table.len(),
            flagged = anomalies.len(),
            z_threshold = self.config.z_threshold,
            "anomaly scan complete"
        );

        Ok(anomalies)
    }

    /// Flagged rows as a table, order preserved.
    pub fn detect(&self, table: &ReadingTable) -> Result<ReadingTable> {
        Ok(self.scan(table)?.into_iter().map(|a| a.reading).collect())
    }
}

/// Return the rows of `table` where any column deviates from its mean by
/// more than two standard deviations.
pub fn detect_anomalies(table: &ReadingTable) -> Result<ReadingTable> {
    AnomalyDetector::default().detect(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HabitatError;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn flat(n: usize) -> Vec<Reading> {
        (0..n)
            .map(|i| Reading {
                time: i as f64 * 0.1,
                oxygen_level: 20.0,
                temperature: 22.0,
                water_usage: 3.0,
                co2_level: 0.04,
                humidity: 50.0,
                power_usage: 400.0,
            })
            .collect()
    }

    fn stats(mean: f64, std_dev: f64) -> ColumnStats {
        ColumnStats {
            count: 100,
            mean,
            std_dev,
            min: 0.0,
            max: 0.0,
        }
    }

    #[test]
    fn test_threshold_is_strict() {
        let detector = AnomalyDetector::default();
        let s = stats(10.0, 1.0);

        assert!(!detector.is_outlier(10.0 + 2.0 * 1.0, &s));
        assert!(detector.is_outlier(10.0 + 2.01 * 1.0, &s));
        assert!(!detector.is_outlier(10.0 - 2.0 * 1.0, &s));
        assert!(detector.is_outlier(10.0 - 2.01 * 1.0, &s));
    }

    #[test]
    fn test_spike_is_flagged() {
        let mut rows = flat(50);
        rows[17].water_usage = 30.0;
        let table = ReadingTable::from_rows(rows);

        let anomalies = AnomalyDetector::default().scan(&table).unwrap();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].index, 17);
        assert_eq!(anomalies[0].channels.len(), 1);
        assert_eq!(anomalies[0].channels[0].channel, Channel::WaterUsage);
        assert!(anomalies[0].channels[0].z_score > 2.0);
    }

    #[test]
    fn test_multiple_channels_reported() {
        let mut rows = flat(50);
        rows[5].oxygen_level = 25.0;
        rows[5].power_usage = 900.0;
        let table = ReadingTable::from_rows(rows);

        let anomalies = AnomalyDetector::default().scan(&table).unwrap();
        let channels: Vec<Channel> = anomalies[0].channels.iter().map(|c| c.channel).collect();
        assert_eq!(channels, vec![Channel::OxygenLevel, Channel::PowerUsage]);
    }

    #[test]
    fn test_order_preserved() {
        let mut rows = flat(60);
        rows[40].humidity = 90.0;
        rows[3].humidity = 10.0;
        let table = ReadingTable::from_rows(rows);

        let flagged = detect_anomalies(&table).unwrap();
        assert_eq!(flagged.len(), 2);
        assert!(flagged.rows()[0].time < flagged.rows()[1].time);
        assert_eq!(flagged.rows()[0].humidity, 10.0);
    }

    #[test]
    fn test_constant_table_has_no_anomalies() {
        let table = ReadingTable::from_rows(flat(20));
        assert!(detect_anomalies(&table).unwrap().is_empty());
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let mut rows = flat(10);
        rows[0].oxygen_level = f64::NAN;
        assert!(matches!(
            detect_anomalies(&ReadingTable::from_rows(rows)),
            Err(HabitatError::InvalidInput(_))
        ));

        let mut rows = flat(20);
        rows[3].power_usage = f64::INFINITY;
        assert!(matches!(
            AnomalyDetector::default().scan(&ReadingTable::from_rows(rows)),
            Err(HabitatError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_single_row() {
        let table = ReadingTable::from_rows(flat(1));
        assert!(detect_anomalies(&table).unwrap().is_empty());
    }

    #[test]
    fn test_uniform_noise_flags_subset() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut rows = flat(200);
        for row in &mut rows {
            row.water_usage = rng.gen_range(1.0..5.0);
        }
        rows[100].water_usage = 12.0;
        let table = ReadingTable::from_rows(rows);

        let flagged = detect_anomalies(&table).unwrap();
        assert!(!flagged.is_empty());
        assert!(flagged.len() < table.len());
        assert!(flagged.rows().iter().any(|r| r.water_usage == 12.0));
    }

    #[test]
    fn test_stricter_threshold_flags_fewer() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut rows = flat(200);
        for row in &mut rows {
            row.power_usage = 400.0 + rng.gen_range(-10.0..10.0);
        }
        let table = ReadingTable::from_rows(rows);

        let loose = AnomalyDetector::new(AnomalyConfig { z_threshold: 1.0 })
            .scan(&table)
            .unwrap();
        let strict = AnomalyDetector::new(AnomalyConfig { z_threshold: 3.0 })
            .scan(&table)
            .unwrap();
        assert!(strict.len() < loose.len());
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(detect_anomalies(&ReadingTable::new()).is_err());
    }
}
