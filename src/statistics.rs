// Solid Engine - Sensor reliability pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Additional delta statistics not covered by [`ReliabilityMetrics`].
//!
//! [`ReliabilityMetrics`]: crate::metrics::ReliabilityMetrics

use crate::reading::Reading;

fn deltas(readings: &[Reading]) -> Vec<f64> {
    readings.iter().map(Reading::delta).collect()
}

/// Median delta. Even counts average the two middle values; empty input
/// returns `0.0`.
pub fn median_delta(readings: &[Reading]) -> f64 {
    let mut values = deltas(readings);
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);

    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Sample (Bessel-corrected) standard deviation of deltas.
///
/// Needs at least two readings, otherwise `0.0`.
pub fn sample_std_dev(readings: &[Reading]) -> f64 {
    let values = deltas(readings);
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

/// Minimum and maximum delta, `(0.0, 0.0)` for empty input.
pub fn delta_range(readings: &[Reading]) -> (f64, f64) {
    if readings.is_empty() {
        return (0.0, 0.0);
    }
    readings
        .iter()
        .map(Reading::delta)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| {
            (lo.min(d), hi.max(d))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn readings(deltas: &[f64]) -> Vec<Reading> {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        deltas
            .iter()
            .map(|d| Reading::new("s", ts, 20.0 + d, 20.0).unwrap())
            .collect()
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_relative_eq!(median_delta(&readings(&[3.0, -1.0, 2.0])), 2.0);
        assert_relative_eq!(median_delta(&readings(&[4.0, 1.0, 2.0, 3.0])), 2.5);
        assert_eq!(median_delta(&[]), 0.0);
    }

    #[test]
    fn test_sample_std_dev() {
        // 2,4,4,4,5,5,7,9: sample variance = 32/7
        let data = readings(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_relative_eq!(sample_std_dev(&data), (32.0f64 / 7.0).sqrt(), epsilon = 1e-9);
        assert_eq!(sample_std_dev(&readings(&[1.0])), 0.0);
    }

    #[test]
    fn test_delta_range() {
        assert_eq!(delta_range(&readings(&[1.0, -2.0, 3.0])), (-2.0, 3.0));
        assert_eq!(delta_range(&[]), (0.0, 0.0));
    }
}
