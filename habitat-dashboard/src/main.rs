// Habitat Dashboard - Terminal dashboard for habitat simulations
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Habitat Dashboard
//!
//! Runs one simulation pass and renders it to stdout.
//!
//! ## Usage
//!
//! ```bash
//! # Default settings: 4 astronauts, 12 hours
//! habitat-dashboard
//!
//! # Reproducible run, JSON output
//! habitat-dashboard --astronauts 6 --hours 24 --seed 42 --format json
//!
//! # Export the reading table
//! habitat-dashboard --format csv > readings.csv
//! ```

mod render;

use clap::{Parser, ValueEnum};
use habitat::{HabitatConfig, HabitatError, HabitatMonitor, SimulationReport};
use rand::rngs::StdRng;
use rand::SeedableRng;
use render::{render_report, RenderOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::{debug, error, info, Level};
use tracing_subscriber::EnvFilter;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable panels
    Text,
    /// Full report as JSON
    Json,
    /// Reading table as CSV
    Csv,
}

/// Smart Space Habitat Manager
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of astronauts on board
    #[arg(short, long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..=10))]
    astronauts: u32,

    /// Simulation time in hours
    #[arg(
        short = 'H',
        long,
        default_value_t = 12,
        value_parser = clap::value_parser!(u32).range(1..=24)
    )]
    hours: u32,

    /// Seed for a reproducible run
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Rows shown in the text data table
    #[arg(long, default_value_t = 10)]
    rows: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Dashboard errors.
#[derive(Debug, Error)]
enum DashboardError {
    #[error(transparent)]
    Habitat(#[from] HabitatError),

    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr so stdout stays clean for JSON/CSV
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    info!("Habitat Dashboard v{}", env!("CARGO_PKG_VERSION"));

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), DashboardError> {
    let config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            HabitatConfig::load(path)?
        }
        None => HabitatConfig::default(),
    };
    debug!(?config, "effective configuration");

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut monitor = HabitatMonitor::new(config)?;
    let report = monitor.run(args.astronauts, args.hours as f64, &mut rng)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&report, args, &mut out)?;
    out.flush()?;
    Ok(())
}

fn write_report<W: Write>(
    report: &SimulationReport,
    args: &Args,
    out: &mut W,
) -> Result<(), DashboardError> {
    match args.format {
        OutputFormat::Text => {
            let options = RenderOptions {
                table_rows: args.rows,
                ..Default::default()
            };
            out.write_all(render_report(report, options).as_bytes())?;
        }
        OutputFormat::Json => {
            writeln!(out, "{}", report.to_json_pretty()?)?;
        }
        OutputFormat::Csv => {
            report.readings.to_csv_writer(&mut *out)?;
        }
    }
    Ok(())
}
