// Solid Engine - Sensor reliability pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Deterministic synthetic readings.
//!
//! A [`ScenarioSimulator`] owns a seeded [`StdRng`]. Each call to
//! [`ScenarioSimulator::generate`] continues the same random sequence, so the
//! output of a call depends on the seed and on every call made before it.
//!
//! ```rust
//! use solid_engine::{NoiseModel, ScenarioRequest, ScenarioSimulator};
//! use chrono::{TimeZone, Utc};
//!
//! let mut simulator = ScenarioSimulator::new(42, NoiseModel::uniform(0.5)).unwrap();
//! let request = ScenarioRequest::new("sensor-1", 10.0)
//!     .with_count(5)
//!     .with_start_time(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
//!
//! let batch = simulator.generate(&request).unwrap();
//! assert_eq!(batch.source(), "sim:sensor-1");
//! assert_eq!(batch.count(), 5);
//! ```

use crate::error::{EngineError, Result};
use crate::observer::{null_observer, PipelineEvent, SharedObserver};
use crate::reading::{Reading, ReadingBatch};
use crate::{DEFAULT_JITTER, DEFAULT_SPACING_SECONDS};
use chrono::{DateTime, Duration, Utc};
use rand::distributions::Uniform;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use std::fmt;

/// Default number of readings per generated batch.
pub const DEFAULT_SCENARIO_COUNT: usize = 10;

/// Default time shift applied by [`ScenarioSimulator::extend`].
pub const DEFAULT_EXTEND_OFFSET_SECONDS: i64 = 15;

/// Marker appended to the source of extended batches.
pub const EXTENDED_SOURCE_MARKER: &str = "+";

/// Noise added to each generated reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoiseModel {
    /// Delta drawn uniformly from `[-jitter, +jitter]`.
    Uniform { jitter: f64 },
    /// Delta drawn from `N(0, jitter / 2)`.
    Gaussian { jitter: f64 },
}

impl Default for NoiseModel {
    fn default() -> Self {
        NoiseModel::Uniform {
            jitter: DEFAULT_JITTER,
        }
    }
}

impl NoiseModel {
    pub fn uniform(jitter: f64) -> Self {
        NoiseModel::Uniform { jitter }
    }

    pub fn gaussian(jitter: f64) -> Self {
        NoiseModel::Gaussian { jitter }
    }

    /// Build a model from its name (`"uniform"` or `"gaussian"`).
    pub fn from_name(name: &str, jitter: f64) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "uniform" => Ok(Self::uniform(jitter)),
            "gaussian" | "normal" => Ok(Self::gaussian(jitter)),
            other => Err(EngineError::InvalidArgument(format!(
                "unknown noise type: {}",
                other
            ))),
        }
    }

    /// Configured noise magnitude.
    pub fn jitter(&self) -> f64 {
        match self {
            NoiseModel::Uniform { jitter } | NoiseModel::Gaussian { jitter } => *jitter,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NoiseModel::Uniform { .. } => "uniform",
            NoiseModel::Gaussian { .. } => "gaussian",
        }
    }

    /// Build the sampling distribution for this model.
    fn sampler(&self) -> Result<NoiseSampler> {
        let jitter = self.jitter();
        if !jitter.is_finite() || jitter < 0.0 {
            return Err(EngineError::InvalidArgument(format!(
                "jitter must be a finite non-negative number, got {}",
                jitter
            )));
        }
        if !(2.0 * jitter).is_finite() {
            return Err(EngineError::InvalidArgument(format!(
                "jitter must be at most {}, got {}",
                f64::MAX / 2.0,
                jitter
            )));
        }
        match self {
            NoiseModel::Uniform { .. } => Ok(NoiseSampler::Uniform(Uniform::new_inclusive(
                -jitter, jitter,
            ))),
            NoiseModel::Gaussian { .. } => Normal::new(0.0, jitter / 2.0)
                .map(NoiseSampler::Gaussian)
                .map_err(|e| EngineError::InvalidArgument(format!("gaussian noise: {}", e))),
        }
    }
}

enum NoiseSampler {
    Uniform(Uniform<f64>),
    Gaussian(Normal<f64>),
}

impl Distribution<f64> for NoiseSampler {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            NoiseSampler::Uniform(d) => d.sample(rng),
            NoiseSampler::Gaussian(d) => d.sample(rng),
        }
    }
}

/// Parameters for one generated batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioRequest {
    /// Sensor identifier for every generated reading.
    pub sensor_id: String,
    /// Baseline value; also stored as each reading's `expected`.
    pub expected_value: f64,
    /// Number of readings.
    pub count: usize,
    /// Seconds between consecutive readings.
    pub spacing_seconds: i64,
    /// Timestamp of the first reading (`None` = now).
    pub start_time: Option<DateTime<Utc>>,
    /// Value added per reading index to simulate linear drift.
    pub drift_rate: f64,
}

impl ScenarioRequest {
    /// Create a request with default count, spacing and no drift.
    pub fn new(sensor_id: impl Into<String>, expected_value: f64) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            expected_value,
            count: DEFAULT_SCENARIO_COUNT,
            spacing_seconds: DEFAULT_SPACING_SECONDS,
            start_time: None,
            drift_rate: 0.0,
        }
    }

    /// Set number of readings.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Set spacing between readings in seconds.
    pub fn with_spacing_secs(mut self, secs: i64) -> Self {
        self.spacing_seconds = secs;
        self
    }

    /// Set the first timestamp.
    pub fn with_start_time(mut self, start: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self
    }

    /// Set linear drift per reading.
    pub fn with_drift_rate(mut self, drift_rate: f64) -> Self {
        self.drift_rate = drift_rate;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.sensor_id.trim().is_empty() {
            return Err(EngineError::Validation(
                "sensor_id cannot be empty".to_string(),
            ));
        }
        if !self.expected_value.is_finite() {
            return Err(EngineError::Validation(format!(
                "expected value is not numeric: {}",
                self.expected_value
            )));
        }
        if !self.drift_rate.is_finite() {
            return Err(EngineError::InvalidArgument(format!(
                "drift rate must be finite, got {}",
                self.drift_rate
            )));
        }
        Ok(())
    }
}

/// Seeded generator of synthetic reading batches.
pub struct ScenarioSimulator {
    seed: u64,
    noise: NoiseModel,
    rng: StdRng,
    observer: SharedObserver,
}

impl fmt::Debug for ScenarioSimulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioSimulator")
            .field("seed", &self.seed)
            .field("noise", &self.noise)
            .finish_non_exhaustive()
    }
}

impl ScenarioSimulator {
    /// Create a simulator seeded once with `seed`.
    ///
    /// Fails with [`EngineError::InvalidArgument`] if the jitter is negative
    /// or not finite.
    pub fn new(seed: u64, noise: NoiseModel) -> Result<Self> {
        noise.sampler()?;
        Ok(Self {
            seed,
            noise,
            rng: StdRng::seed_from_u64(seed),
            observer: null_observer(),
        })
    }

    /// Report progress to `observer`.
    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn noise(&self) -> NoiseModel {
        self.noise
    }

    /// Generate a batch labeled `"sim:<sensor_id>"`.
    ///
    /// Reading `i` is stamped `start + i * spacing_seconds` and valued
    /// `expected + noise + drift_rate * i`.
    pub fn generate(&mut self, request: &ScenarioRequest) -> Result<ReadingBatch> {
        request.validate()?;
        let sampler = self.noise.sampler()?;
        let start = request.start_time.unwrap_or_else(Utc::now);

        let mut readings = Vec::new();
        readings.try_reserve_exact(request.count).map_err(|e| {
            EngineError::InvalidArgument(format!(
                "cannot generate {} readings: {}",
                request.count, e
            ))
        })?;
        for index in 0..request.count {
            let noise = sampler.sample(&mut self.rng);
            let drift = request.drift_rate * index as f64;
            let recorded_at = offset_time(start, index as i64, request.spacing_seconds)?;
            readings.push(Reading::new(
                request.sensor_id.clone(),
                recorded_at,
                request.expected_value + noise + drift,
                request.expected_value,
            )?);
        }

        let batch = ReadingBatch::new(format!("sim:{}", request.sensor_id), readings);
        self.observer.observe(PipelineEvent::BatchGenerated {
            source: batch.source().to_string(),
            count: batch.count(),
            seed: self.seed,
        });
        Ok(batch)
    }

    /// Secondary sensor pass over existing batches.
    ///
    /// Every reading is moved `offset_seconds` later and nudged by
    /// `jitter / 10`; sources get a trailing `+`. No randomness is consumed.
    pub fn extend(&self, batches: &[ReadingBatch], offset_seconds: i64) -> Result<Vec<ReadingBatch>> {
        let offset = Duration::try_seconds(offset_seconds).ok_or_else(|| {
            EngineError::InvalidArgument(format!("offset out of range: {}s", offset_seconds))
        })?;
        let nudge = self.noise.jitter() / 10.0;

        batches
            .iter()
            .map(|batch| {
                let readings = batch
                    .readings()
                    .iter()
                    .map(|r| r.shifted(offset, nudge))
                    .collect::<Result<Vec<_>>>()?;
                let extended = ReadingBatch::new(
                    format!("{}{}", batch.source(), EXTENDED_SOURCE_MARKER),
                    readings,
                );
                self.observer.observe(PipelineEvent::BatchExtended {
                    source: extended.source().to_string(),
                    count: extended.count(),
                });
                Ok(extended)
            })
            .collect()
    }
}

fn offset_time(start: DateTime<Utc>, index: i64, spacing_seconds: i64) -> Result<DateTime<Utc>> {
    index
        .checked_mul(spacing_seconds)
        .and_then(Duration::try_seconds)
        .and_then(|d| start.checked_add_signed(d))
        .ok_or_else(|| {
            EngineError::InvalidArgument(format!(
                "timestamp overflow at reading {} with spacing {}s",
                index, spacing_seconds
            ))
        })
}
