// Habitat Dashboard - Terminal dashboard for habitat simulations
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Text rendering of a simulation report.
//!
//! Panels mirror the web dashboard: data table, one chart per channel,
//! health, failure risk and anomalies.

use habitat::{Channel, ReadingTable, SimulationReport};
use std::fmt::Write;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Channels drawn as line charts, with their panel titles.
pub const CHARTS: [(Channel, &str); 5] = [
    (Channel::OxygenLevel, "Oxygen Levels Over Time"),
    (Channel::Temperature, "Temperature Over Time"),
    (Channel::Co2Level, "CO2 Levels Over Time"),
    (Channel::Humidity, "Humidity Over Time"),
    (Channel::PowerUsage, "Power Usage Over Time"),
];

/// Rendering options.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Rows shown in the data table panel.
    pub table_rows: usize,
    /// Width of each chart in characters.
    pub chart_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            table_rows: 10,
            chart_width: 60,
        }
    }
}

/// Render a series as a one-line sparkline of at most `width` characters.
///
/// Values are averaged into equal-width buckets when the series is longer
/// than `width`.
pub fn sparkline(values: &[f64], width: usize) -> String {
    if values.is_empty() || width == 0 {
        return String::new();
    }

    let buckets = width.min(values.len());
    let points: Vec<f64> = (0..buckets)
        .map(|b| {
            let start = b * values.len() / buckets;
            let end = ((b + 1) * values.len() / buckets).max(start + 1);
            let slice = &values[start..end];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect();

    let min = points.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = points.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    points
        .iter()
        .map(|v| {
            if span <= 0.0 {
                SPARK_LEVELS[SPARK_LEVELS.len() / 2]
            } else {
                let level = ((v - min) / span * (SPARK_LEVELS.len() - 1) as f64).round();
                SPARK_LEVELS[level as usize]
            }
        })
        .collect()
}

/// Render up to `limit` rows of a table with a header.
pub fn render_table(table: &ReadingTable, limit: usize) -> String {
    let mut out = String::new();

    let header: Vec<String> = Channel::ALL
        .iter()
        .map(|c| format!("{:>14}", format!("{} ({})", c.label(), c.unit())))
        .collect();
    let _ = writeln!(out, "{}", header.join(" "));

    for row in table.iter().take(limit) {
        let cells: Vec<String> = Channel::ALL
            .iter()
            .map(|&c| format!("{:>14.4}", row.get(c)))
            .collect();
        let _ = writeln!(out, "{}", cells.join(" "));
    }

    if table.len() > limit {
        let _ = writeln!(out, "... {} more rows", table.len() - limit);
    }

    out
}

/// Render one channel as a titled sparkline chart with its range.
pub fn render_chart(table: &ReadingTable, channel: Channel, title: &str, width: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", title);

    match table.stats(channel) {
        Some(stats) => {
            let _ = writeln!(out, "{}", sparkline(&table.column(channel), width));
            let _ = writeln!(
                out,
                "{:.4} .. {:.4} {} over {:.1} h",
                stats.min,
                stats.max,
                channel.unit(),
                table.duration_hours()
            );
        }
        None => {
            let _ = writeln!(out, "(no data)");
        }
    }

    out
}

/// Render the full dashboard.
pub fn render_report(report: &SimulationReport, options: RenderOptions) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Smart Space Habitat Manager");
    let _ = writeln!(
        out,
        "Settings: {} astronauts, {} h ({} readings)",
        report.astronauts,
        report.hours,
        report.readings.len()
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "== Habitat Sensor Data ==");
    out.push_str(&render_table(&report.readings, options.table_rows));
    let _ = writeln!(out);

    for (channel, title) in CHARTS {
        out.push_str(&render_chart(
            &report.readings,
            channel,
            title,
            options.chart_width,
        ));
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "== Astronaut Health Monitoring ==");
    let _ = writeln!(out, "{}", report.health);
    let _ = writeln!(out);

    let _ = writeln!(out, "== Predictive Maintenance ==");
    let _ = writeln!(out, "Failure Risk Predictions:");
    let predictions: Vec<String> = report
        .forecast
        .predictions
        .iter()
        .map(|p| format!("{:.3}", p))
        .collect();
    let _ = writeln!(out, "[{}]", predictions.join(", "));
    let _ = writeln!(
        out,
        "Model: {} (trained on {} rows, held-out MSE {:.4})",
        report.forecast.model, report.forecast.train_rows, report.forecast.mse
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "== Anomaly Detection ==");
    let _ = writeln!(out, "Detected Anomalies:");
    if report.anomalies.is_empty() {
        let _ = writeln!(out, "(none)");
    } else {
        let flagged = report.anomaly_table();
        out.push_str(&render_table(&flagged, flagged.len()));
        for anomaly in &report.anomalies {
            let channels: Vec<String> = anomaly
                .channels
                .iter()
                .map(|d| format!("{} (z={:+.2})", d.channel, d.z_score))
                .collect();
            let _ = writeln!(out, "row {}: {}", anomaly.index, channels.join(", "));
        }
    }

    out
}
