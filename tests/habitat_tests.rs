// Habitat - Integration tests
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Integration tests for the habitat toolkit.

use approx::assert_relative_eq;
use habitat::health::ALL_NORMAL_MESSAGE;
use habitat::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ============================================================================
// Helper Functions
// ============================================================================

fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn nominal_row(time: f64) -> Reading {
    Reading {
        time,
        oxygen_level: 20.0,
        temperature: 22.0,
        water_usage: 3.0,
        co2_level: 0.04,
        humidity: 50.0,
        power_usage: 400.0,
    }
}

// ============================================================================
// Section 1: Generator
// ============================================================================

#[test]
fn test_row_count_for_every_slider_value() {
    let mut rng = seeded(1);
    for hours in 1..=24 {
        let table = simulate_sensor_data(4, hours as f64, &mut rng).unwrap();
        assert_eq!(table.len(), hours * 10, "hours = {}", hours);
    }
}

#[test]
fn test_power_scales_with_crew() {
    let mut rng = seeded(2);
    for astronauts in 1..=10u32 {
        let table = simulate_sensor_data(astronauts, 3.0, &mut rng).unwrap();
        let stats = table.stats(Channel::PowerUsage).unwrap();
        let base = 100.0 * astronauts as f64;
        assert!(stats.min >= base - 10.0);
        assert!(stats.max <= base + 10.0);
    }
}

#[test]
fn test_channel_bounds() {
    let table = simulate_sensor_data(4, 24.0, &mut seeded(3)).unwrap();
    let within = |channel, lo, hi| {
        let s = table.stats(channel).unwrap();
        assert!(s.min >= lo && s.max <= hi, "{} out of [{}, {}]", channel, lo, hi);
    };
    within(Channel::OxygenLevel, 19.5, 20.5);
    within(Channel::Temperature, 19.0, 25.0);
    within(Channel::WaterUsage, 1.0, 5.0);
    within(Channel::Co2Level, 0.02, 0.06);
    within(Channel::Humidity, 40.0, 60.0);
}

// ============================================================================
// Section 2: Health
// ============================================================================

#[test]
fn test_health_boundary_policy() {
    let table_with_oxygen = |oxygen| {
        ReadingTable::from_rows(
            (0..4)
                .map(|i| Reading {
                    oxygen_level: oxygen,
                    ..nominal_row(i as f64 * 0.1)
                })
                .collect(),
        )
    };

    let low = check_health_status(&table_with_oxygen(19.4)).unwrap();
    assert!(low.contains("Low oxygen"));

    let fine = check_health_status(&table_with_oxygen(19.6)).unwrap();
    assert_eq!(fine, ALL_NORMAL_MESSAGE);
}

#[test]
fn test_short_run_raises_co2_warning() {
    // Over [0, 2) h the CO2 sine averages above 0.05
    let table = simulate_sensor_data(4, 2.0, &mut seeded(10)).unwrap();
    let report = HealthChecker::default().check(&table).unwrap();

    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].channel(), Channel::Co2Level);
    assert!(report.means.co2_level > 0.05);
}

#[test]
fn test_health_is_pure() {
    let table = simulate_sensor_data(3, 8.0, &mut seeded(4)).unwrap();
    let first = check_health_status(&table).unwrap();
    for _ in 0..5 {
        assert_eq!(check_health_status(&table).unwrap(), first);
    }
}

// ============================================================================
// Section 3: Anomalies
// ============================================================================

#[test]
fn test_anomaly_strict_threshold() {
    let detector = AnomalyDetector::default();
    let stats = ColumnStats::from_values(&[9.0, 10.0, 11.0]).unwrap();
    assert_eq!(stats.mean, 10.0);
    assert_eq!(stats.std_dev, 1.0);

    let at = stats.mean + 2.0 * stats.std_dev;
    let beyond = stats.mean + 2.01 * stats.std_dev;
    assert!(!detector.is_outlier(at, &stats));
    assert!(detector.is_outlier(beyond, &stats));
}

#[test]
fn test_anomaly_rows_are_subset_of_input() {
    let mut rows: Vec<Reading> = (0..100).map(|i| nominal_row(i as f64 * 0.1)).collect();
    rows[10].temperature = 40.0;
    rows[70].co2_level = 0.5;
    let table = ReadingTable::from_rows(rows);

    let flagged = detect_anomalies(&table).unwrap();
    assert_eq!(flagged.len(), 2);
    for row in flagged.rows() {
        assert!(table.rows().contains(row));
    }
    assert_relative_eq!(flagged.rows()[0].time, 1.0);
    assert_relative_eq!(flagged.rows()[1].time, 7.0);
}

// ============================================================================
// Section 4: Predictor
// ============================================================================

#[test]
fn test_prediction_length_is_held_out_fraction() {
    for hours in [1.0, 5.0, 12.0, 24.0] {
        let table = simulate_sensor_data(2, hours, &mut seeded(5)).unwrap();
        let predictions = predict_failures(&table, &mut seeded(6)).unwrap();
        let expected = (0.2 * table.len() as f64).ceil() as usize;
        assert_eq!(predictions.len(), expected);
    }
}

#[test]
fn test_predictions_reproduce_with_seed() {
    let table = simulate_sensor_data(4, 12.0, &mut seeded(7)).unwrap();
    let a = predict_failures(&table, &mut seeded(8)).unwrap();
    let b = predict_failures(&table, &mut seeded(8)).unwrap();
    assert_eq!(a, b);
}

// ============================================================================
// Section 5: End to end
// ============================================================================

#[test]
fn test_end_to_end_four_astronauts_twelve_hours() {
    let mut rng = seeded(42);
    let readings = simulate_sensor_data(4, 12.0, &mut rng).unwrap();
    assert_eq!(readings.len(), 120);

    let health = check_health_status(&readings).unwrap();
    assert_eq!(health, ALL_NORMAL_MESSAGE);
    assert!(!health.contains("Warning"));

    let anomalies = detect_anomalies(&readings).unwrap();
    assert!(anomalies.len() < readings.len());

    let risk = predict_failures(&readings, &mut rng).unwrap();
    assert_eq!(risk.len(), 24);
}

#[test]
fn test_monitor_from_config_file() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(
        file.path(),
        r#"{ "predictor": { "forest": { "n_trees": 10, "max_depth": 4 } } }"#,
    )
    .unwrap();

    let config = HabitatConfig::load(file.path()).unwrap();
    let report = HabitatMonitor::new(config)
        .unwrap()
        .run(4, 12.0, &mut seeded(9))
        .unwrap();

    assert_eq!(report.readings.len(), 120);
    assert_eq!(report.forecast.predictions.len(), 24);
    assert!(report.health.is_nominal());
}
