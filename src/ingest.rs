// Solid Engine - Sensor reliability pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! CSV ingestion of sensor readings.
//!
//! Expected columns: `sensor_id,recorded_at,value,expected` (any order).
//! Rows are numbered the way an editor shows them: the header is row 1.
//! The first malformed row aborts the load; no partial batch is returned.

use crate::error::{EngineError, Result};
use crate::observer::{null_observer, PipelineEvent, SharedObserver};
use crate::reading::{Reading, ReadingBatch};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Columns every input file must provide.
pub const REQUIRED_COLUMNS: [&str; 4] = ["sensor_id", "recorded_at", "value", "expected"];

/// Row as it appears in the file, before any parsing.
#[derive(Debug, Deserialize)]
struct RawRecord {
    sensor_id: String,
    recorded_at: String,
    value: String,
    expected: String,
}

impl RawRecord {
    fn into_reading(self) -> std::result::Result<Reading, crate::error::BoxedCause> {
        let recorded_at = parse_timestamp(&self.recorded_at)?;
        let value: f64 = self.value.parse()?;
        let expected: f64 = self.expected.parse()?;
        Ok(Reading::new(self.sensor_id, recorded_at, value, expected)?)
    }
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 with an offset, or a naive date-time (`T` or space
/// separated, optional fraction) or plain date taken as UTC.
pub fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::default()))
        })?;
    Ok(Utc.from_utc_datetime(&naive))
}

/// Loads reading batches from CSV.
#[derive(Clone)]
pub struct CsvLoader {
    observer: SharedObserver,
}

impl fmt::Debug for CsvLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvLoader").finish_non_exhaustive()
    }
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvLoader {
    pub fn new() -> Self {
        Self {
            observer: null_observer(),
        }
    }

    /// Report progress to `observer`.
    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Load a file. The batch is labeled with the file name.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<ReadingBatch> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| EngineError::ResourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.read(file, source)
    }

    /// Read CSV data from any reader.
    pub fn read<R: Read>(&self, reader: R, source: impl Into<String>) -> Result<ReadingBatch> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(|e| EngineError::source_data(1, e))?
            .clone();
        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|col| !headers.iter().any(|h| h == **col))
        {
            return Err(EngineError::source_data(
                1,
                format!("missing column: {}", missing),
            ));
        }

        let mut readings = Vec::new();
        for (index, result) in rdr.records().enumerate() {
            let fallback_row = index + 2;
            let record = result.map_err(|e| {
                let row = e
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(fallback_row);
                EngineError::source_data(row, e)
            })?;
            let row = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(fallback_row);

            let raw: RawRecord = record
                .deserialize(Some(&headers))
                .map_err(|e| EngineError::source_data(row, e))?;
            let reading = raw
                .into_reading()
                .map_err(|cause| EngineError::SourceData { row, source: cause })?;
            readings.push(reading);
        }

        let batch = ReadingBatch::new(source, readings);
        self.observer.observe(PipelineEvent::BatchLoaded {
            source: batch.source().to_string(),
            count: batch.count(),
        });
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::MemoryObserver;
    use chrono::Timelike;
    use std::error::Error as _;
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    const GOOD: &str = "\
sensor_id,recorded_at,value,expected
sensor-1,2025-01-01T00:00:00,10.5,10
sensor-2,2025-01-01T00:01:00Z,9.75,10
sensor-1,2025-01-01 00:02:00.5,12,10
";

    #[test]
    fn test_read_valid_rows() {
        let batch = CsvLoader::new().read(GOOD.as_bytes(), "inline").unwrap();

        assert_eq!(batch.source(), "inline");
        assert_eq!(batch.count(), 3);
        assert_eq!(batch.readings()[1].sensor_id(), "sensor-2");
        assert_eq!(batch.readings()[2].delta(), 2.0);
        assert_eq!(batch.readings()[2].recorded_at().nanosecond(), 500_000_000);
    }

    #[test]
    fn test_column_order_is_free() {
        let data = "value,expected,sensor_id,recorded_at\n1.5,1,s,2025-01-01\n";
        let batch = CsvLoader::new().read(data.as_bytes(), "x").unwrap();
        assert_eq!(batch.readings()[0].delta(), 0.5);
    }

    #[test]
    fn test_bad_value_reports_row() {
        let data = "sensor_id,recorded_at,value,expected\n\
                    s,2025-01-01T00:00:00,1,1\n\
                    s,2025-01-01T00:01:00,abc,1\n";
        let err = CsvLoader::new().read(data.as_bytes(), "x").unwrap_err();

        assert_eq!(err.row(), Some(3));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_wrong_field_count_reports_row() {
        let data = "sensor_id,recorded_at,value,expected\n\
                    s,2025-01-01T00:00:00,1,1\n\
                    s,2025-01-01T00:01:00,1,1\n\
                    s,2025-01-01T00:02:00,1\n";
        let err = CsvLoader::new().read(data.as_bytes(), "x").unwrap_err();

        assert_eq!(err.row(), Some(4));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_bad_timestamp_reports_row() {
        let data = "sensor_id,recorded_at,value,expected\ns,yesterday,1,1\n";
        let err = CsvLoader::new().read(data.as_bytes(), "x").unwrap_err();
        assert_eq!(err.row(), Some(2));
    }

    #[test]
    fn test_empty_sensor_id_is_source_error() {
        let data = "sensor_id,recorded_at,value,expected\n,2025-01-01,1,1\n";
        let err = CsvLoader::new().read(data.as_bytes(), "x").unwrap_err();
        assert!(matches!(err, EngineError::SourceData { row: 2, .. }));
    }

    #[test]
    fn test_missing_column_is_header_error() {
        let data = "sensor_id,recorded_at,value\ns,2025-01-01,1\n";
        let err = CsvLoader::new().read(data.as_bytes(), "x").unwrap_err();
        assert_eq!(err.row(), Some(1));
        assert!(err.to_string().contains("expected"));
    }

    #[test]
    fn test_missing_file() {
        let err = CsvLoader::new()
            .load("/definitely/not/here.csv")
            .unwrap_err();
        assert!(matches!(err, EngineError::ResourceUnavailable { .. }));
    }

    #[test]
    fn test_load_file_uses_file_name() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(GOOD.as_bytes()).unwrap();

        let observer = Arc::new(MemoryObserver::new());
        let batch = CsvLoader::new()
            .with_observer(observer.clone())
            .load(file.path())
            .unwrap();

        let name = file.path().file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(batch.source(), name);
        assert_eq!(
            observer.events(),
            vec![PipelineEvent::BatchLoaded {
                source: name,
                count: 3
            }]
        );
    }

    #[test]
    fn test_parse_timestamp_forms() {
        let expected = Utc.with_ymd_and_hms(2025, 1, 1, 6, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2025-01-01T06:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2025-01-01T06:00:00+00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2025-01-01T08:00:00+02:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2025-01-01 06:00:00").unwrap(), expected);
        assert!(parse_timestamp("01/01/2025").is_err());
    }
}
