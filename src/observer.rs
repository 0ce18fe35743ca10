// Solid Engine - Sensor reliability pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Pipeline observability.
//!
//! Components that report progress (loader, simulator, report builder) take
//! an injected [`PipelineObserver`] instead of writing to a process-wide
//! logger. The default is [`NullObserver`]; the CLI plugs in a tracing-backed
//! one and tests use [`MemoryObserver`].

use std::sync::{Arc, Mutex, PoisonError};

/// Progress event emitted by a pipeline component.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// Readings loaded from an external source.
    BatchLoaded { source: String, count: usize },
    /// Synthetic batch produced by the simulator.
    BatchGenerated {
        source: String,
        count: usize,
        seed: u64,
    },
    /// Secondary pass produced by `ScenarioSimulator::extend`.
    BatchExtended { source: String, count: usize },
    /// Report lines computed.
    ReportBuilt { lines: usize },
}

impl PipelineEvent {
    /// Short event name.
    pub fn name(&self) -> &'static str {
        match self {
            PipelineEvent::BatchLoaded { .. } => "batch_loaded",
            PipelineEvent::BatchGenerated { .. } => "batch_generated",
            PipelineEvent::BatchExtended { .. } => "batch_extended",
            PipelineEvent::ReportBuilt { .. } => "report_built",
        }
    }
}

/// Sink for pipeline events.
pub trait PipelineObserver: Send + Sync {
    /// Record an event
    fn observe(&self, event: PipelineEvent);
}

/// Shared observer handle.
pub type SharedObserver = Arc<dyn PipelineObserver>;

/// Observer that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl PipelineObserver for NullObserver {
    fn observe(&self, _event: PipelineEvent) {}
}

/// The default observer handle.
pub fn null_observer() -> SharedObserver {
    Arc::new(NullObserver)
}

/// In-memory observer, mostly useful in tests.
#[derive(Debug, Default)]
pub struct MemoryObserver {
    events: Mutex<Vec<PipelineEvent>>,
}

impl MemoryObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded events
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PipelineObserver for MemoryObserver {
    fn observe(&self, event: PipelineEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

/// Forwards events to the `log` facade.
#[cfg(feature = "logging")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

#[cfg(feature = "logging")]
impl PipelineObserver for LogObserver {
    fn observe(&self, event: PipelineEvent) {
        match &event {
            PipelineEvent::BatchLoaded { source, count } => {
                log::info!("loaded {} readings from {}", count, source)
            }
            PipelineEvent::BatchGenerated {
                source,
                count,
                seed,
            } => log::info!("generated {} readings for {} (seed {})", count, source, seed),
            PipelineEvent::BatchExtended { source, count } => {
                log::debug!("extended {} ({} readings)", source, count)
            }
            PipelineEvent::ReportBuilt { lines } => log::debug!("report built: {} lines", lines),
        }
    }
}
