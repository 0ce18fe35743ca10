// Solid Engine - Sensor reliability pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for Solid Engine
//!
//! Every fallible operation in the crate returns [`EngineError`]. Nothing is
//! retried internally: the pipeline works on in-memory values, so the same
//! input always fails the same way.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Solid Engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Boxed low-level cause carried by [`EngineError::SourceData`].
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for Solid Engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// A reading could not be constructed (empty id, non-numeric value)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Illegal parameter passed to an operation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed input row. `row` is 1-based and the header counts as row 1.
    #[error("Malformed source data at row {row}: {source}")]
    SourceData {
        row: usize,
        #[source]
        source: BoxedCause,
    },

    /// Input file missing or unreadable
    #[error("Resource unavailable: {}: {source}", .path.display())]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON rendering failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Delimited export failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl EngineError {
    /// Shorthand for [`EngineError::SourceData`].
    pub fn source_data(row: usize, cause: impl Into<BoxedCause>) -> Self {
        EngineError::SourceData {
            row,
            source: cause.into(),
        }
    }

    /// Row index for source data errors.
    pub fn row(&self) -> Option<usize> {
        match self {
            EngineError::SourceData { row, .. } => Some(*row),
            _ => None,
        }
    }
}
