// Habitat - Health status checks
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Habitat health status checks
//!
//! Compares column means of the life-support channels against fixed
//! thresholds and reports one warning per violated rule.

use crate::config::HealthThresholds;
use crate::error::Result;
use crate::reading::{Channel, ReadingTable};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Message emitted when no rule is violated.
pub const ALL_NORMAL_MESSAGE: &str = "✅ All systems normal. Astronauts are safe and healthy.";

/// Which side of the nominal band a mean fell on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deviation {
    Low,
    High,
}

/// The checked rules, one variant per warning text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    LowOxygen,
    HighOxygen,
    LowTemperature,
    HighTemperature,
    HighCo2,
    LowHumidity,
    HighHumidity,
}

impl WarningKind {
    /// Channel whose mean the rule inspects
    pub fn channel(self) -> Channel {
        match self {
            WarningKind::LowOxygen | WarningKind::HighOxygen => Channel::OxygenLevel,
            WarningKind::LowTemperature | WarningKind::HighTemperature => Channel::Temperature,
            WarningKind::HighCo2 => Channel::Co2Level,
            WarningKind::LowHumidity | WarningKind::HighHumidity => Channel::Humidity,
        }
    }

    pub fn deviation(self) -> Deviation {
        match self {
            WarningKind::LowOxygen | WarningKind::LowTemperature | WarningKind::LowHumidity => {
                Deviation::Low
            }
            WarningKind::HighOxygen
            | WarningKind::HighTemperature
            | WarningKind::HighCo2
            | WarningKind::HighHumidity => Deviation::High,
        }
    }

    /// Operator-facing text
    pub fn message(self) -> &'static str {
        match self {
            WarningKind::LowOxygen => {
                "🚨 Warning: Low oxygen levels detected. Provide additional oxygen supply."
            }
            WarningKind::HighOxygen => {
                "🚨 Warning: High oxygen levels detected. Check oxygen system."
            }
            WarningKind::LowTemperature => {
                "🚨 Warning: Low temperature detected. Activate heating systems."
            }
            WarningKind::HighTemperature => {
                "🚨 Warning: High temperature detected. Activate cooling systems."
            }
            WarningKind::HighCo2 => {
                "🚨 Warning: High CO2 levels detected. Activate CO2 scrubbers."
            }
            WarningKind::LowHumidity => {
                "🚨 Warning: Low humidity detected. Increase humidity levels."
            }
            WarningKind::HighHumidity => {
                "🚨 Warning: High humidity detected. Decrease humidity levels."
            }
        }
    }
}

/// A violated health rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthWarning {
    /// Rule that fired
    pub kind: WarningKind,
    /// Observed column mean
    pub observed: f64,
    /// Threshold that was crossed
    pub threshold: f64,
}

impl HealthWarning {
    pub fn channel(&self) -> Channel {
        self.kind.channel()
    }

    pub fn deviation(&self) -> Deviation {
        self.kind.deviation()
    }

    /// Operator-facing text for this warning
    pub fn message(&self) -> &'static str {
        self.kind.message()
    }
}

impl fmt::Display for HealthWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Column means the checker evaluated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthMeans {
    pub oxygen_level: f64,
    pub temperature: f64,
    pub co2_level: f64,
    pub humidity: f64,
}

/// Result of a health check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Violated rules, in oxygen, temperature, CO2, humidity order
    pub warnings: Vec<HealthWarning>,
    /// Means the rules were applied to
    pub means: HealthMeans,
}

impl HealthReport {
    /// Check if no rule was violated
    pub fn is_nominal(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Warning lines, or the single all-normal line
    pub fn lines(&self) -> Vec<&'static str> {
        if self.warnings.is_empty() {
            vec![ALL_NORMAL_MESSAGE]
        } else {
            self.warnings.iter().map(|w| w.message()).collect()
        }
    }
}

impl fmt::Display for HealthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

/// Threshold-based health checker
#[derive(Debug, Clone, Default)]
pub struct HealthChecker {
    thresholds: HealthThresholds,
}

impl HealthChecker {
    /// Create a checker with the given thresholds
    pub fn new(thresholds: HealthThresholds) -> Self {
        Self { thresholds }
    }

    /// Get the thresholds
    pub fn thresholds(&self) -> &HealthThresholds {
        &self.thresholds
    }

    /// Evaluate every rule against the table's column means
    pub fn check(&self, table: &ReadingTable) -> Result<HealthReport> {
        table.validate("health check")?;

        // validate guarantees a mean for every column
        let mean = |channel| table.mean(channel).unwrap_or_default();
        let means = HealthMeans {
            oxygen_level: mean(Channel::OxygenLevel),
            temperature: mean(Channel::Temperature),
            co2_level: mean(Channel::Co2Level),
            humidity: mean(Channel::Humidity),
        };
        debug!(?means, "health check means");

        let t = &self.thresholds;
        let rules = [
            (
                means.oxygen_level,
                Some((WarningKind::LowOxygen, t.oxygen_min)),
                Some((WarningKind::HighOxygen, t.oxygen_max)),
            ),
            (
                means.temperature,
                Some((WarningKind::LowTemperature, t.temperature_min)),
                Some((WarningKind::HighTemperature, t.temperature_max)),
            ),
            (
                means.co2_level,
                None,
                Some((WarningKind::HighCo2, t.co2_max)),
            ),
            (
                means.humidity,
                Some((WarningKind::LowHumidity, t.humidity_min)),
                Some((WarningKind::HighHumidity, t.humidity_max)),
            ),
        ];

        let warnings: Vec<HealthWarning> = rules
            .into_iter()
            .filter_map(|(observed, low, high)| evaluate_rule(observed, low, high))
            .inspect(|w| warn!(channel = %w.channel(), observed = w.observed, "{}", w.message()))
            .collect();

        Ok(HealthReport { warnings, means })
    }
}

/// Low and high checks are exclusive per metric: the low bound wins.
fn evaluate_rule(
    observed: f64,
    low: Option<(WarningKind, f64)>,
    high: Option<(WarningKind, f64)>,
) -> Option<HealthWarning> {
    let (kind, threshold) = match (low, high) {
        (Some((kind, min)), _) if observed < min => (kind, min),
        (_, Some((kind, max))) if observed > max => (kind, max),
        _ => return None,
    };
    Some(HealthWarning {
        kind,
        observed,
        threshold,
    })
}

/// Check habitat health with the default thresholds, returning the
/// newline-joined report text.
pub fn check_health_status(table: &ReadingTable) -> Result<String> {
    Ok(HealthChecker::default().check(table)?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HabitatError;
    use crate::reading::Reading;

    fn nominal() -> Reading {
        Reading {
            time: 0.0,
            oxygen_level: 20.0,
            temperature: 22.0,
            water_usage: 3.0,
            co2_level: 0.04,
            humidity: 50.0,
            power_usage: 400.0,
        }
    }

    fn table_with(modify: impl Fn(&mut Reading)) -> ReadingTable {
        let mut row = nominal();
        modify(&mut row);
        ReadingTable::from_rows(vec![row; 3])
    }

    #[test]
    fn test_all_normal() {
        let text = check_health_status(&table_with(|_| {})).unwrap();
        assert_eq!(text, ALL_NORMAL_MESSAGE);
    }

    #[test]
    fn test_oxygen_boundary() {
        let low = HealthChecker::default()
            .check(&table_with(|r| r.oxygen_level = 19.4))
            .unwrap();
        assert_eq!(low.warnings.len(), 1);
        assert_eq!(low.warnings[0].kind, WarningKind::LowOxygen);
        assert_eq!(low.warnings[0].channel(), Channel::OxygenLevel);
        assert_eq!(low.warnings[0].deviation(), Deviation::Low);

        let ok = HealthChecker::default()
            .check(&table_with(|r| r.oxygen_level = 19.6))
            .unwrap();
        assert!(ok.is_nominal());

        // Strict comparison: the bound itself is nominal
        let edge = HealthChecker::default()
            .check(&table_with(|r| r.oxygen_level = 19.5))
            .unwrap();
        assert!(edge.is_nominal());
    }

    #[test]
    fn test_multiple_warnings() {
        let table = table_with(|r| {
            r.oxygen_level = 21.0;
            r.temperature = 18.0;
            r.co2_level = 0.06;
            r.humidity = 65.0;
        });
        let text = check_health_status(&table).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "🚨 Warning: High oxygen levels detected. Check oxygen system.",
                "🚨 Warning: Low temperature detected. Activate heating systems.",
                "🚨 Warning: High CO2 levels detected. Activate CO2 scrubbers.",
                "🚨 Warning: High humidity detected. Decrease humidity levels.",
            ]
        );
        assert!(!text.contains(ALL_NORMAL_MESSAGE));
    }

    #[test]
    fn test_low_co2_is_not_a_warning() {
        let report = HealthChecker::default()
            .check(&table_with(|r| r.co2_level = 0.0))
            .unwrap();
        assert!(report.is_nominal());
    }

    #[test]
    fn test_uses_means_not_extremes() {
        let mut low = nominal();
        low.humidity = 30.0;
        let mut high = nominal();
        high.humidity = 70.0;
        let report = HealthChecker::default()
            .check(&ReadingTable::from_rows(vec![low, high]))
            .unwrap();

        assert!(report.is_nominal());
        assert_eq!(report.means.humidity, 50.0);
    }

    #[test]
    fn test_deterministic() {
        let table = table_with(|r| r.temperature = 26.0);
        let a = HealthChecker::default().check(&table).unwrap();
        let b = HealthChecker::default().check(&table).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.warnings[0].threshold, 25.0);
    }

    #[test]
    fn test_custom_thresholds() {
        let checker = HealthChecker::new(HealthThresholds {
            oxygen_min: 20.5,
            ..Default::default()
        });
        let report = checker.check(&table_with(|_| {})).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].threshold, 20.5);
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(check_health_status(&ReadingTable::new()).is_err());
    }

    #[test]
    fn test_non_finite_mean_rejected() {
        let mut rows = vec![nominal(); 3];
        rows[0].oxygen_level = f64::NAN;
        assert!(matches!(
            check_health_status(&ReadingTable::from_rows(rows)),
            Err(HabitatError::InvalidInput(_))
        ));

        let mut rows = vec![nominal(); 20];
        rows[3].power_usage = f64::INFINITY;
        assert!(HealthChecker::default()
            .check(&ReadingTable::from_rows(rows))
            .is_err());
    }

    #[test]
    fn test_warning_kinds_map_to_channels() {
        assert_eq!(WarningKind::HighCo2.channel(), Channel::Co2Level);
        assert_eq!(WarningKind::HighCo2.deviation(), Deviation::High);
        assert_eq!(WarningKind::LowHumidity.deviation(), Deviation::Low);
        assert_eq!(
            WarningKind::LowTemperature.message(),
            "🚨 Warning: Low temperature detected. Activate heating systems."
        );
    }
}
