// Solid Engine - Sensor reliability pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Batch-level utilities: merging and chunking.

use crate::error::{EngineError, Result};
use crate::reading::ReadingBatch;

/// Default chunk size for [`chunk_batches`].
pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// Concatenate the readings of several batches, in order, into one batch.
pub fn merge_batches<'a, I>(batches: I, source: &str) -> ReadingBatch
where
    I: IntoIterator<Item = &'a ReadingBatch>,
{
    let readings = batches
        .into_iter()
        .flat_map(|b| b.readings().iter().cloned())
        .collect();
    ReadingBatch::new(source, readings)
}

/// Split batches into consecutive groups of at most `size`.
pub fn chunk_batches(
    batches: &[ReadingBatch],
    size: usize,
) -> Result<impl Iterator<Item = &[ReadingBatch]>> {
    if size == 0 {
        return Err(EngineError::InvalidArgument(
            "chunk size must be at least 1".to_string(),
        ));
    }
    Ok(batches.chunks(size))
}
