// Solid Engine - Sensor reliability pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Small numeric helpers shared across the pipeline.

use crate::error::{EngineError, Result};

/// Clamp a value between two bounds.
///
/// Fails with [`EngineError::InvalidArgument`] when `lower > upper`.
pub fn clamp(value: f64, lower: f64, upper: f64) -> Result<f64> {
    if lower > upper {
        return Err(EngineError::InvalidArgument(format!(
            "lower bound {} cannot exceed upper bound {}",
            lower, upper
        )));
    }
    Ok(value.max(lower).min(upper))
}

/// Map `value` from `[min, max]` onto `[0, 1]`.
///
/// A degenerate range (`min == max`) maps everything to `0.0`. Values
/// outside the range are not clamped.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range == 0.0 {
        return 0.0;
    }
    (value - min) / range
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
