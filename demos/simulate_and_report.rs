// Solid Engine - Sensor reliability pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Run a simulation then print a report.
//!
//! Run with: cargo run --example simulate_and_report

use solid_engine::simulation::DEFAULT_EXTEND_OFFSET_SECONDS;
use solid_engine::{
    NoiseModel, ReliabilityMetrics, ReportBuilder, ReportStyle, ScenarioRequest,
    ScenarioSimulator,
};

fn main() -> solid_engine::Result<()> {
    let mut simulator = ScenarioSimulator::new(99, NoiseModel::default())?;
    let request = ScenarioRequest::new("demo", 12.0).with_count(8);
    let batch = simulator.generate(&request)?;

    let metrics = ReliabilityMetrics::from_readings_default(batch.readings());
    println!("Demo batch metrics: {}", serde_json::to_string(&metrics.to_record(false))?);
    println!();

    let extended = simulator.extend(std::slice::from_ref(&batch), DEFAULT_EXTEND_OFFSET_SECONDS)?;
    let batches = [vec![batch], extended].concat();
    println!("{}", ReportBuilder::new().render(&batches, ReportStyle::Table)?);

    Ok(())
}
