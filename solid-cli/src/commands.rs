// Solid Engine CLI - Command-line front end for Solid Engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Subcommand implementations. Each returns the text to print.

use crate::config::Config;
use crate::error::Result;
use crate::observer::TracingObserver;
use crate::{NoiseKind, OutputStyle, ReportArgs, SimulateArgs};
use solid_engine::simulation::DEFAULT_EXTEND_OFFSET_SECONDS;
use solid_engine::{
    CsvLoader, NoiseModel, ReadingBatch, ReportBuilder, ScenarioRequest, ScenarioSimulator,
    SharedObserver,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

fn observer() -> SharedObserver {
    Arc::new(TracingObserver)
}

fn render(builder: &ReportBuilder, batches: &[ReadingBatch], style: OutputStyle) -> Result<String> {
    let text = match style.report_style() {
        Some(style) => builder.render(batches, style)?,
        None => builder.to_json(batches)?,
    };
    Ok(text)
}

/// `report`: load, filter, aggregate, render.
pub fn report(args: &ReportArgs, config: &Config) -> Result<String> {
    let path = args
        .data
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.cli.default_dataset));
    let threshold = args.threshold.unwrap_or(config.thresholds.outlier);
    debug!(path = %path.display(), threshold, "Running report");

    let mut batch = CsvLoader::new().with_observer(observer()).load(&path)?;
    if let Some(sensor) = &args.sensor {
        batch = batch.filter_by_sensor(sensor);
    }
    if args.since.is_some() || args.until.is_some() {
        batch = batch.filter_by_time_range(args.since, args.until);
    }
    if args.drop_outliers {
        let before = batch.count();
        batch = batch.without_outliers(threshold);
        debug!("Dropped {} outliers", before - batch.count());
    }

    let builder = ReportBuilder::new()
        .with_outlier_threshold(threshold)
        .with_observer(observer());
    let batches = [batch];

    if let Some(csv_out) = &args.csv_out {
        builder.export_csv(&batches, csv_out)?;
        info!("Report records written to {}", csv_out.display());
    }

    render(&builder, &batches, args.style)
}

/// `simulate`: generate (and optionally extend) a batch, then summarize it.
///
/// Without `--style` each batch's metrics dictionary is printed as one JSON
/// object per line.
pub fn simulate(args: &SimulateArgs, config: &Config) -> Result<String> {
    let seed = args.seed.unwrap_or(config.simulation.seed);
    let jitter = args.jitter.unwrap_or(config.simulation.jitter);
    let noise = match args.noise {
        NoiseKind::Uniform => NoiseModel::uniform(jitter),
        NoiseKind::Gaussian => NoiseModel::gaussian(jitter),
    };

    let mut simulator = ScenarioSimulator::new(seed, noise)?.with_observer(observer());
    let request = ScenarioRequest::new(args.sensor.as_str(), args.expected)
        .with_count(args.count)
        .with_spacing_secs(args.spacing)
        .with_drift_rate(args.drift);

    let mut batches = vec![simulator.generate(&request)?];
    if args.extend {
        let extended = simulator.extend(&batches, DEFAULT_EXTEND_OFFSET_SECONDS)?;
        batches.extend(extended);
    }

    let threshold = config.thresholds.outlier;
    match args.style {
        Some(style) => {
            let builder = ReportBuilder::new()
                .with_outlier_threshold(threshold)
                .with_observer(observer());
            render(&builder, &batches, style)
        }
        None => {
            let mut lines = Vec::with_capacity(batches.len());
            for batch in &batches {
                let record = batch.metrics(threshold)?.to_record(false);
                lines.push(serde_json::to_string(&record)?);
            }
            Ok(lines.join("\n"))
        }
    }
}
