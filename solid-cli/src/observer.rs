// Solid Engine CLI - Command-line front end for Solid Engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Pipeline observer backed by `tracing`.

use solid_engine::{PipelineEvent, PipelineObserver};
use tracing::{debug, info};

/// Emits every pipeline event as a `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn observe(&self, event: PipelineEvent) {
        let name = event.name();
        match event {
            PipelineEvent::BatchLoaded { source, count } => {
                info!(event = name, %source, count, "Loaded {} readings", count)
            }
            PipelineEvent::BatchGenerated {
                source,
                count,
                seed,
            } => info!(event = name, %source, count, seed, "Generated {} readings", count),
            PipelineEvent::BatchExtended { source, count } => {
                debug!(event = name, %source, count, "Extended batch")
            }
            PipelineEvent::ReportBuilt { lines } => {
                debug!(event = name, lines, "Report built")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_without_subscriber() {
        let observer = TracingObserver;
        observer.observe(PipelineEvent::ReportBuilt { lines: 1 });
        observer.observe(PipelineEvent::BatchLoaded {
            source: "a.csv".to_string(),
            count: 2,
        });
    }
}
