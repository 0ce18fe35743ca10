// Solid Engine - Sensor reliability pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Report rendering.
//!
//! [`ReportBuilder`] computes one [`ReportLine`] per batch, each batch
//! aggregated on its own, and renders the lines as text, serializable
//! records, JSON or CSV.

use crate::error::{EngineError, Result};
use crate::metrics::{validate_threshold, ReliabilityMetrics, RECORD_PRECISION};
use crate::observer::{null_observer, PipelineEvent, SharedObserver};
use crate::reading::ReadingBatch;
use crate::utils::round_to;
use crate::DEFAULT_OUTLIER_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

/// Column names of the delimited export.
pub const CSV_HEADER: [&str; 5] = ["source", "count", "average_delta", "std_dev", "outlier_ratio"];

const SOURCE_WIDTH: usize = 24;

/// Text layout for [`ReportBuilder::render`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStyle {
    /// Fixed-width table with header and rule.
    #[default]
    Table,
    /// One free-form line per batch.
    Compact,
    /// Multi-line block per batch, full precision.
    Detailed,
}

impl ReportStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStyle::Table => "table",
            ReportStyle::Compact => "compact",
            ReportStyle::Detailed => "detailed",
        }
    }
}

impl fmt::Display for ReportStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStyle {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "table" | "tabular" => Ok(ReportStyle::Table),
            "compact" => Ok(ReportStyle::Compact),
            "detailed" => Ok(ReportStyle::Detailed),
            other => Err(EngineError::InvalidArgument(format!(
                "unknown report style: {}",
                other
            ))),
        }
    }
}

/// Metrics row bound to its batch source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportLine {
    pub source: String,
    pub count: usize,
    pub average_delta: f64,
    pub std_dev: f64,
    pub outlier_ratio: f64,
    pub max_delta: f64,
}

impl ReportLine {
    pub fn new(source: impl Into<String>, metrics: &ReliabilityMetrics) -> Self {
        Self {
            source: source.into(),
            count: metrics.count,
            average_delta: metrics.average_delta,
            std_dev: metrics.std_dev,
            outlier_ratio: metrics.outlier_ratio,
            max_delta: metrics.max_delta,
        }
    }

    /// Header row matching [`as_table_row`](Self::as_table_row) for the
    /// same `source_width`.
    pub fn table_header(source_width: usize) -> String {
        format!(
            "{:>w$} {:>6} {:>10} {:>10} {:>9}",
            "source",
            "count",
            "avg_delta",
            "std_dev",
            "outliers",
            w = source_width
        )
    }

    /// Fixed-width row. Sources wider than `source_width` widen the row.
    pub fn as_table_row(&self, source_width: usize) -> String {
        format!(
            "{:>w$} {:>6} {:>+10.3} {:>10.3} {:>9}",
            self.source,
            self.count,
            self.average_delta,
            self.std_dev,
            format!("{:.2}%", self.outlier_ratio * 100.0),
            w = source_width
        )
    }

    pub fn as_compact(&self) -> String {
        format!(
            "{}: {} readings, avg={:+.3}, outliers={:.1}%",
            self.source,
            self.count,
            self.average_delta,
            self.outlier_ratio * 100.0
        )
    }

    pub fn as_detailed(&self) -> String {
        format!(
            "Source:          {}\n  \
             Readings:      {}\n  \
             Average delta: {:+.6}\n  \
             Std deviation: {:.6}\n  \
             Outlier ratio: {:.6}%\n  \
             Max delta:     {:+.6}",
            self.source,
            self.count,
            self.average_delta,
            self.std_dev,
            self.outlier_ratio * 100.0,
            self.max_delta
        )
    }

    /// Serializable record, floats rounded to 4 decimals.
    pub fn to_record(&self) -> ReportRecord {
        ReportRecord {
            source: self.source.clone(),
            count: self.count,
            average_delta: round_to(self.average_delta, RECORD_PRECISION),
            std_dev: round_to(self.std_dev, RECORD_PRECISION),
            outlier_ratio: round_to(self.outlier_ratio, RECORD_PRECISION),
        }
    }

    fn csv_fields(&self) -> [String; 5] {
        [
            self.source.clone(),
            self.count.to_string(),
            format!("{:.4}", self.average_delta),
            format!("{:.4}", self.std_dev),
            format!("{:.4}", self.outlier_ratio),
        ]
    }
}

/// Plain mapping record for JSON and other serializers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub source: String,
    pub count: usize,
    pub average_delta: f64,
    pub std_dev: f64,
    pub outlier_ratio: f64,
}

/// Builds and renders reports over reading batches.
#[derive(Clone)]
pub struct ReportBuilder {
    outlier_threshold: f64,
    observer: SharedObserver,
}

impl fmt::Debug for ReportBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportBuilder")
            .field("outlier_threshold", &self.outlier_threshold)
            .finish_non_exhaustive()
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportBuilder {
    /// Builder using the default outlier threshold.
    pub fn new() -> Self {
        Self {
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
            observer: null_observer(),
        }
    }

    /// Set the outlier threshold used for every batch.
    pub fn with_outlier_threshold(mut self, threshold: f64) -> Self {
        self.outlier_threshold = threshold;
        self
    }

    /// Report progress to `observer`.
    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn outlier_threshold(&self) -> f64 {
        self.outlier_threshold
    }

    /// One line per batch, in input order.
    pub fn build(&self, batches: &[ReadingBatch]) -> Result<Vec<ReportLine>> {
        validate_threshold(self.outlier_threshold)?;

        let lines = batches
            .iter()
            .map(|batch| {
                let metrics = batch.metrics(self.outlier_threshold)?;
                Ok(ReportLine::new(batch.source(), &metrics))
            })
            .collect::<Result<Vec<_>>>()?;

        self.observer
            .observe(PipelineEvent::ReportBuilt { lines: lines.len() });
        Ok(lines)
    }

    /// Render the batches as text.
    pub fn render(&self, batches: &[ReadingBatch], style: ReportStyle) -> Result<String> {
        let lines = self.build(batches)?;
        let text = match style {
            ReportStyle::Table => {
                let width = lines
                    .iter()
                    .map(|line| line.source.chars().count())
                    .fold(SOURCE_WIDTH, usize::max);
                let header = ReportLine::table_header(width);
                let mut out = vec![header.clone(), "-".repeat(header.chars().count())];
                out.extend(lines.iter().map(|line| line.as_table_row(width)));
                out.join("\n")
            }
            ReportStyle::Compact => lines
                .iter()
                .map(ReportLine::as_compact)
                .collect::<Vec<_>>()
                .join("\n"),
            ReportStyle::Detailed => lines
                .iter()
                .map(ReportLine::as_detailed)
                .collect::<Vec<_>>()
                .join("\n\n"),
        };
        Ok(text)
    }

    /// Records suitable for serialization.
    pub fn export_records(&self, batches: &[ReadingBatch]) -> Result<Vec<ReportRecord>> {
        Ok(self
            .build(batches)?
            .iter()
            .map(ReportLine::to_record)
            .collect())
    }

    /// Pretty-printed JSON array of records.
    pub fn to_json(&self, batches: &[ReadingBatch]) -> Result<String> {
        let records = self.export_records(batches)?;
        Ok(serde_json::to_string_pretty(&records)?)
    }

    /// Write the delimited export to any writer.
    pub fn write_csv<W: Write>(&self, batches: &[ReadingBatch], writer: W) -> Result<()> {
        let lines = self.build(batches)?;
        let mut wtr = csv::Writer::from_writer(writer);

        wtr.write_record(CSV_HEADER)?;
        for line in &lines {
            wtr.write_record(line.csv_fields())?;
        }
        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Write the delimited export to a file.
    pub fn export_csv(&self, batches: &[ReadingBatch], path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| EngineError::ResourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        self.write_csv(batches, BufWriter::new(file))
    }
}
