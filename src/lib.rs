// Solid Engine - Sensor reliability pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Solid Engine
//!
//! Reliability analysis for sensor measurements.
//!
//! ## Key Features
//!
//! - **Single-pass metrics**: average delta, spread, outlier ratio, worst deviation
//! - **Composable filters**: by sensor, by time window, by outlier threshold
//! - **Deterministic simulation**: seeded synthetic batches for testing
//! - **Reports**: table, compact, detailed, JSON and CSV renderings
//!
//! ## Quick Start
//!
//! ```rust
//! use solid_engine::{NoiseModel, ReportBuilder, ReportStyle, ScenarioRequest, ScenarioSimulator};
//! use chrono::{TimeZone, Utc};
//!
//! let mut simulator = ScenarioSimulator::new(42, NoiseModel::default()).unwrap();
//! let request = ScenarioRequest::new("sensor-1", 10.0)
//!     .with_count(5)
//!     .with_start_time(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
//! let batch = simulator.generate(&request).unwrap();
//!
//! let metrics = batch.metrics(solid_engine::DEFAULT_OUTLIER_THRESHOLD).unwrap();
//! assert_eq!(metrics.count, 5);
//! assert!(metrics.average_delta.abs() <= 0.5);
//!
//! let report = ReportBuilder::new().render(&[batch], ReportStyle::Table).unwrap();
//! assert!(report.contains("sim:sensor-1"));
//! ```
//!
//! ## Modules
//!
//! - [`reading`]: Reading and batch model
//! - [`metrics`]: Reliability metrics aggregation
//! - [`filters`]: Reading selection
//! - [`simulation`]: Seeded synthetic data
//! - [`report`]: Rendering and export
//! - [`ingest`]: CSV loading

// Modules
pub mod batch;
pub mod error;
pub mod filters;
pub mod ingest;
pub mod metrics;
pub mod observer;
pub mod reading;
pub mod report;
pub mod simulation;
pub mod statistics;
pub mod utils;

// Re-exports for convenient access
pub use batch::{chunk_batches, merge_batches};
pub use error::{EngineError, Result};
pub use ingest::CsvLoader;
pub use metrics::{MetricsRecord, ReliabilityMetrics};
pub use observer::{
    null_observer, MemoryObserver, NullObserver, PipelineEvent, PipelineObserver, SharedObserver,
};
pub use reading::{Reading, ReadingBatch};
pub use report::{ReportBuilder, ReportLine, ReportRecord, ReportStyle};
pub use simulation::{NoiseModel, ScenarioRequest, ScenarioSimulator};
pub use utils::{clamp, normalize};

#[cfg(feature = "logging")]
pub use observer::LogObserver;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Absolute delta at or above which a reading counts as an outlier
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 5.0;

/// Default noise amplitude for synthetic readings
pub const DEFAULT_JITTER: f64 = 0.5;

/// Default spacing between synthetic readings, in seconds
pub const DEFAULT_SPACING_SECONDS: i64 = 60;

/// Default simulator seed
pub const DEFAULT_SEED: u64 = 42;

/// Default sensor for ad-hoc simulation
pub const DEFAULT_SENSOR_ID: &str = "sensor-1";

/// Default expected value for ad-hoc simulation
pub const DEFAULT_EXPECTED_VALUE: f64 = 10.0;

/// Default reading count for ad-hoc simulation
pub const DEFAULT_COUNT: usize = 5;
