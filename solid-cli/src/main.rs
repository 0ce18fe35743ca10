// Solid Engine CLI - Command-line front end for Solid Engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Solid Engine CLI
//!
//! Reliability reports from CSV readings, and seeded synthetic batches.
//!
//! ## Usage
//!
//! ```bash
//! # Report on a dataset
//! solid-engine report --data readings.csv --style detailed
//!
//! # Only one sensor, outliers removed, CSV export
//! solid-engine report --data readings.csv --sensor sensor-1 --drop-outliers --csv-out out.csv
//!
//! # Synthetic batch, metrics printed as JSON
//! solid-engine simulate --sensor probe --expected 12.0 --count 8 --seed 99
//! ```

mod commands;
mod config;
mod error;
mod observer;

use chrono::{DateTime, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use config::Config;
use solid_engine::{ReportStyle, DEFAULT_COUNT, DEFAULT_EXPECTED_VALUE, DEFAULT_SENSOR_ID};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Solid Engine sensor reliability toolkit
#[derive(Parser, Debug)]
#[command(name = "solid-engine", author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report on readings loaded from CSV
    Report(ReportArgs),
    /// Generate synthetic readings and summarize them
    Simulate(SimulateArgs),
}

#[derive(ClapArgs, Debug)]
struct ReportArgs {
    /// CSV dataset (defaults to the configured dataset)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Output style
    #[arg(short, long, value_enum, default_value_t = OutputStyle::Table)]
    style: OutputStyle,

    /// Keep only this sensor
    #[arg(long)]
    sensor: Option<String>,

    /// Keep readings at or after this timestamp
    #[arg(long, value_parser = parse_time)]
    since: Option<DateTime<Utc>>,

    /// Keep readings at or before this timestamp
    #[arg(long, value_parser = parse_time)]
    until: Option<DateTime<Utc>>,

    /// Remove outliers before aggregating
    #[arg(long)]
    drop_outliers: bool,

    /// Outlier threshold (overrides the configuration)
    #[arg(long)]
    threshold: Option<f64>,

    /// Also write the report records to this CSV file
    #[arg(long)]
    csv_out: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct SimulateArgs {
    /// Sensor identifier
    #[arg(long, default_value = DEFAULT_SENSOR_ID)]
    sensor: String,

    /// Expected value
    #[arg(long, default_value_t = DEFAULT_EXPECTED_VALUE, allow_negative_numbers = true)]
    expected: f64,

    /// Number of readings
    #[arg(short = 'n', long, default_value_t = DEFAULT_COUNT)]
    count: usize,

    /// RNG seed (overrides the configuration)
    #[arg(long)]
    seed: Option<u64>,

    /// Noise amplitude (overrides the configuration)
    #[arg(long)]
    jitter: Option<f64>,

    /// Noise distribution
    #[arg(long, value_enum, default_value_t = NoiseKind::Uniform)]
    noise: NoiseKind,

    /// Value added per reading index
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    drift: f64,

    /// Seconds between readings
    #[arg(long, default_value_t = solid_engine::DEFAULT_SPACING_SECONDS)]
    spacing: i64,

    /// Add a shifted second pass of the batch
    #[arg(long)]
    extend: bool,

    /// Render a report instead of the metrics dictionary
    #[arg(short, long, value_enum)]
    style: Option<OutputStyle>,
}

/// Output rendering selected on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputStyle {
    Table,
    Compact,
    Detailed,
    Json,
}

impl OutputStyle {
    /// Text style, or `None` for JSON.
    fn report_style(self) -> Option<ReportStyle> {
        match self {
            OutputStyle::Table => Some(ReportStyle::Table),
            OutputStyle::Compact => Some(ReportStyle::Compact),
            OutputStyle::Detailed => Some(ReportStyle::Detailed),
            OutputStyle::Json => None,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum NoiseKind {
    Uniform,
    Gaussian,
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, String> {
    solid_engine::ingest::parse_timestamp(raw)
        .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match log_level.to_lowercase().as_str() {
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
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> error::Result<String> {
    let config = Config::load(args.config.as_deref())?;
    match args.command {
        Command::Report(report) => commands::report(&report, &config),
        Command::Simulate(simulate) => commands::simulate(&simulate, &config),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args.log_level);

    info!("Solid Engine v{}", solid_engine::VERSION);

    match run(args) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
