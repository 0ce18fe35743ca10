// Solid Engine - Sensor reliability pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Measurement model: a single sensor reading and a labeled batch of them.
//!
//! Both types are immutable once built. Every transformation (filtering,
//! shifting, merging) hands back a new value.

use crate::error::{EngineError, Result};
use crate::filters;
use crate::metrics::ReliabilityMetrics;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Single measurement captured by a sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    sensor_id: String,
    recorded_at: DateTime<Utc>,
    value: f64,
    expected: f64,
}

impl Reading {
    /// Create a validated reading.
    ///
    /// Fails with [`EngineError::Validation`] when `sensor_id` is blank or
    /// when `value`/`expected` is NaN or infinite.
    pub fn new(
        sensor_id: impl Into<String>,
        recorded_at: DateTime<Utc>,
        value: f64,
        expected: f64,
    ) -> Result<Self> {
        let sensor_id = sensor_id.into();
        if sensor_id.trim().is_empty() {
            return Err(EngineError::Validation(
                "sensor_id cannot be empty".to_string(),
            ));
        }
        if !value.is_finite() {
            return Err(EngineError::Validation(format!(
                "value for {} is not numeric: {}",
                sensor_id, value
            )));
        }
        if !expected.is_finite() {
            return Err(EngineError::Validation(format!(
                "expected for {} is not numeric: {}",
                sensor_id, expected
            )));
        }

        Ok(Self {
            sensor_id,
            recorded_at,
            value,
            expected,
        })
    }

    pub fn sensor_id(&self) -> &str {
        &self.sensor_id
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn expected(&self) -> f64 {
        self.expected
    }

    /// Difference between measurement and expected value.
    pub fn delta(&self) -> f64 {
        self.value - self.expected
    }

    /// Delta as a percentage of the expected value.
    ///
    /// Saturates to `0.0` when `expected` is zero.
    pub fn relative_error(&self) -> f64 {
        if self.expected == 0.0 {
            return 0.0;
        }
        (self.delta() / self.expected) * 100.0
    }

    /// `|delta| >= threshold`.
    pub fn is_outlier(&self, threshold: f64) -> bool {
        self.delta().abs() >= threshold
    }

    /// New reading moved forward in time by `offset` with `value_offset`
    /// added to the measured value.
    pub fn shifted(&self, offset: Duration, value_offset: f64) -> Result<Self> {
        let recorded_at = self.recorded_at.checked_add_signed(offset).ok_or_else(|| {
            EngineError::InvalidArgument(format!("cannot shift {} by {}", self.recorded_at, offset))
        })?;
        Self::new(
            self.sensor_id.clone(),
            recorded_at,
            self.value + value_offset,
            self.expected,
        )
    }
}

/// Labeled, ordered collection of readings from one logical source.
///
/// Order is discovery/generation order and is not guaranteed to be sorted
/// by time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingBatch {
    source: String,
    readings: Vec<Reading>,
}

impl ReadingBatch {
    /// Create a batch from an owned list of readings.
    pub fn new(source: impl Into<String>, readings: Vec<Reading>) -> Self {
        Self {
            source: source.into(),
            readings,
        }
    }

    /// Create a batch from any iterator of readings.
    pub fn from_readings(source: impl Into<String>, iter: impl IntoIterator<Item = Reading>) -> Self {
        Self::new(source, iter.into_iter().collect())
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Number of readings.
    pub fn count(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Consume the batch, returning its readings.
    pub fn into_readings(self) -> Vec<Reading> {
        self.readings
    }

    /// Readings from a single sensor. The new batch is labeled
    /// `"<source>:<sensor_id>"`.
    pub fn filter_by_sensor(&self, sensor_id: &str) -> ReadingBatch {
        ReadingBatch::new(
            format!("{}:{}", self.source, sensor_id),
            filters::by_sensor(&self.readings, sensor_id),
        )
    }

    /// Readings recorded within `[start, end]`, keeping the source label.
    pub fn filter_by_time_range(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> ReadingBatch {
        ReadingBatch::new(
            self.source.clone(),
            filters::by_time_range(&self.readings, start, end),
        )
    }

    /// Readings with `|delta| < threshold`, keeping the source label.
    pub fn without_outliers(&self, threshold: f64) -> ReadingBatch {
        ReadingBatch::new(
            self.source.clone(),
            filters::without_outliers(&self.readings, threshold),
        )
    }

    /// Readings accepted by `predicate`, keeping the source label.
    pub fn filter<F>(&self, predicate: F) -> ReadingBatch
    where
        F: Fn(&Reading) -> bool,
    {
        ReadingBatch::new(
            self.source.clone(),
            filters::by_predicate(&self.readings, predicate),
        )
    }

    /// Reliability metrics for this batch.
    pub fn metrics(&self, outlier_threshold: f64) -> Result<ReliabilityMetrics> {
        ReliabilityMetrics::from_readings(&self.readings, outlier_threshold)
    }
}
