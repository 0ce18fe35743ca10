// Solid Engine - Sensor reliability pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Reliability metrics aggregated over a set of readings.
//!
//! Aggregation is a single pass over the deltas using Welford's update, so
//! the standard deviation matches the population formula
//! `sqrt(mean((x - mean)^2))` without a second traversal.

use crate::error::{EngineError, Result};
use crate::reading::Reading;
use crate::utils::round_to;
use crate::DEFAULT_OUTLIER_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal places used by dictionary-style renderings.
pub const RECORD_PRECISION: u32 = 4;

/// Aggregate metrics derived from multiple readings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityMetrics {
    /// Number of readings aggregated.
    pub count: usize,
    /// Arithmetic mean of the deltas.
    pub average_delta: f64,
    /// Population standard deviation of the deltas.
    pub std_dev: f64,
    /// Fraction of readings with `|delta| >= threshold`.
    pub outlier_ratio: f64,
    /// Signed delta of the largest-magnitude reading (first one on ties).
    pub max_delta: f64,
}

/// Running state for the single-pass aggregation.
#[derive(Debug, Default)]
struct DeltaAccumulator {
    count: usize,
    mean: f64,
    m2: f64,
    outliers: usize,
    max_delta: f64,
}

impl DeltaAccumulator {
    fn push(&mut self, delta: f64, threshold: f64) {
        self.count += 1;
        let diff = delta - self.mean;
        self.mean += diff / self.count as f64;
        self.m2 += diff * (delta - self.mean);

        if delta.abs() >= threshold {
            self.outliers += 1;
        }
        // Strict comparison keeps the first maximum on ties.
        if self.count == 1 || delta.abs() > self.max_delta.abs() {
            self.max_delta = delta;
        }
    }

    fn finish(self) -> ReliabilityMetrics {
        if self.count == 0 {
            return ReliabilityMetrics::default();
        }
        let n = self.count as f64;
        let std_dev = if self.count > 1 {
            (self.m2 / n).max(0.0).sqrt()
        } else {
            0.0
        };

        ReliabilityMetrics {
            count: self.count,
            average_delta: self.mean,
            std_dev,
            outlier_ratio: self.outliers as f64 / n,
            max_delta: self.max_delta,
        }
    }
}

impl ReliabilityMetrics {
    /// Aggregate the deltas of `readings`.
    ///
    /// `outlier_threshold` must be a non-negative number, otherwise
    /// [`EngineError::InvalidArgument`] is returned. An empty input yields
    /// all-zero metrics.
    pub fn from_readings<'a, I>(readings: I, outlier_threshold: f64) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Reading>,
    {
        validate_threshold(outlier_threshold)?;

        let mut acc = DeltaAccumulator::default();
        for reading in readings {
            acc.push(reading.delta(), outlier_threshold);
        }
        Ok(acc.finish())
    }

    /// [`from_readings`](Self::from_readings) with the default threshold of 5.0.
    pub fn from_readings_default<'a, I>(readings: I) -> Self
    where
        I: IntoIterator<Item = &'a Reading>,
    {
        let mut acc = DeltaAccumulator::default();
        readings
            .into_iter()
            .for_each(|r| acc.push(r.delta(), DEFAULT_OUTLIER_THRESHOLD));
        acc.finish()
    }

    /// Check if any readings were aggregated.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of readings counted as outliers.
    pub fn outlier_count(&self) -> usize {
        (self.outlier_ratio * self.count as f64).round() as usize
    }

    /// Dictionary-style rendering with floats rounded to 4 decimals.
    pub fn to_record(&self, include_max_delta: bool) -> MetricsRecord {
        MetricsRecord {
            count: self.count,
            average_delta: round_to(self.average_delta, RECORD_PRECISION),
            std_dev: round_to(self.std_dev, RECORD_PRECISION),
            outlier_ratio: round_to(self.outlier_ratio, RECORD_PRECISION),
            max_delta: include_max_delta.then(|| round_to(self.max_delta, RECORD_PRECISION)),
        }
    }

    /// One-line human readable summary.
    pub fn summary(&self) -> String {
        format!(
            "{} readings, avg delta {:+.4}, std {:.4}, outliers {:.2}%",
            self.count,
            self.average_delta,
            self.std_dev,
            self.outlier_ratio * 100.0
        )
    }
}

impl fmt::Display for ReliabilityMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Serializable metrics dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub count: usize,
    pub average_delta: f64,
    pub std_dev: f64,
    pub outlier_ratio: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_delta: Option<f64>,
}

pub(crate) fn validate_threshold(threshold: f64) -> Result<()> {
    if threshold.is_nan() || threshold < 0.0 {
        return Err(EngineError::InvalidArgument(format!(
            "outlier threshold must be >= 0, got {}",
            threshold
        )));
    }
    Ok(())
}
