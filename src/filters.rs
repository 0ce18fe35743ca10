// Solid Engine - Sensor reliability pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Reading filters.
//!
//! Every filter is pure and order-preserving: it returns a new vector with
//! the non-matching readings dropped. Chaining filters narrows the result
//! step by step, each filter seeing only the output of the previous one.

use crate::reading::Reading;
use chrono::{DateTime, Utc};

/// Keep readings whose `sensor_id` equals `sensor_id` exactly.
pub fn by_sensor(readings: &[Reading], sensor_id: &str) -> Vec<Reading> {
    by_predicate(readings, |r| r.sensor_id() == sensor_id)
}

/// Keep readings recorded within `[start, end]` (inclusive).
///
/// A missing bound leaves that side unbounded.
pub fn by_time_range(
    readings: &[Reading],
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Vec<Reading> {
    by_predicate(readings, |r| {
        let at = r.recorded_at();
        start.map_or(true, |s| at >= s) && end.map_or(true, |e| at <= e)
    })
}

/// Keep readings accepted by an arbitrary predicate.
pub fn by_predicate<F>(readings: &[Reading], predicate: F) -> Vec<Reading>
where
    F: Fn(&Reading) -> bool,
{
    readings.iter().filter(|r| predicate(r)).cloned().collect()
}

/// Drop outliers: keep readings with `|delta| < threshold`.
///
/// This is the exact complement of [`Reading::is_outlier`], so a reading
/// sitting on the threshold is removed.
pub fn without_outliers(readings: &[Reading], threshold: f64) -> Vec<Reading> {
    by_predicate(readings, |r| r.delta().abs() < threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn reading(sensor: &str, minute: i64, delta: f64) -> Reading {
        Reading::new(sensor, t0() + Duration::minutes(minute), 10.0 + delta, 10.0).unwrap()
    }

    fn sample() -> Vec<Reading> {
        vec![
            reading("a", 0, 0.5),
            reading("b", 1, 6.0),
            reading("a", 2, -5.0),
            reading("c", 3, 0.0),
            reading("a", 4, 1.0),
        ]
    }

    #[test]
    fn test_by_sensor_preserves_order() {
        let out = by_sensor(&sample(), "a");
        let minutes: Vec<i64> = out
            .iter()
            .map(|r| (r.recorded_at() - t0()).num_minutes())
            .collect();
        assert_eq!(minutes, vec![0, 2, 4]);
        assert!(by_sensor(&sample(), "A").is_empty());
    }

    #[test]
    fn test_by_time_range_inclusive() {
        let data = sample();
        let out = by_time_range(
            &data,
            Some(t0() + Duration::minutes(1)),
            Some(t0() + Duration::minutes(3)),
        );
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].sensor_id(), "b");
        assert_eq!(out[2].sensor_id(), "c");
    }

    #[test]
    fn test_by_time_range_open_bounds() {
        let data = sample();
        assert_eq!(by_time_range(&data, None, None).len(), 5);
        assert_eq!(
            by_time_range(&data, Some(t0() + Duration::minutes(3)), None).len(),
            2
        );
        assert_eq!(by_time_range(&data, None, Some(t0())).len(), 1);
    }

    #[test]
    fn test_by_predicate() {
        let out = by_predicate(&sample(), |r| r.delta() > 0.0);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_without_outliers_boundary() {
        let data = sample();
        let out = without_outliers(&data, 5.0);

        // delta 6.0 and |-5.0| are dropped, matching is_outlier
        assert_eq!(out.len(), 3);
        assert!(data[2].is_outlier(5.0));
        assert!(!out.contains(&data[2]));
    }

    #[test]
    fn test_filters_are_idempotent() {
        let data = sample();

        let once = without_outliers(&data, 5.0);
        assert_eq!(without_outliers(&once, 5.0), once);

        let once = by_sensor(&data, "a");
        assert_eq!(by_sensor(&once, "a"), once);

        let start = Some(t0() + Duration::minutes(1));
        let once = by_time_range(&data, start, None);
        assert_eq!(by_time_range(&once, start, None), once);
    }

    #[test]
    fn test_chaining_matches_intersection() {
        let data = sample();
        let chained = without_outliers(&by_sensor(&data, "a"), 5.0);
        let reversed = by_sensor(&without_outliers(&data, 5.0), "a");
        let direct = by_predicate(&data, |r| r.sensor_id() == "a" && r.delta().abs() < 5.0);

        assert_eq!(chained, direct);
        assert_eq!(reversed, direct);
        assert_eq!(chained.len(), 2);
    }
}
