//! End-to-end tests: load or generate, filter, aggregate, render.

use approx::assert_relative_eq;
use chrono::{DateTime, Duration, TimeZone, Utc};
use solid_engine::*;
use std::io::Write;
use std::sync::Arc;
use tempfile::{tempdir, NamedTempFile};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

fn batch_with_deltas(source: &str, deltas: &[f64]) -> ReadingBatch {
    ReadingBatch::from_readings(
        source,
        deltas.iter().enumerate().map(|(i, d)| {
            Reading::new("sensor-1", start() + Duration::minutes(i as i64), 10.0 + d, 10.0).unwrap()
        }),
    )
}

#[test]
fn test_reference_example() {
    let batch = batch_with_deltas("ref", &[-0.5, 0.1, 5.1]);
    let metrics = batch.metrics(5.0).unwrap();

    assert_eq!(metrics.count, 3);
    assert_relative_eq!(metrics.outlier_ratio, 1.0 / 3.0);
    assert_relative_eq!(metrics.average_delta, 1.6, epsilon = 1e-12);
    assert_relative_eq!(metrics.max_delta, 5.1, epsilon = 1e-12);
}

#[test]
fn test_population_std_dev_matches_two_pass() {
    let deltas = [1.25, -3.0, 0.5, 7.75, -0.25, 2.0];
    let batch = batch_with_deltas("pop", &deltas);
    let metrics = batch.metrics(DEFAULT_OUTLIER_THRESHOLD).unwrap();

    let actual: Vec<f64> = batch.readings().iter().map(Reading::delta).collect();
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let variance = actual.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / actual.len() as f64;

    assert_relative_eq!(metrics.average_delta, mean, epsilon = 1e-9);
    assert_relative_eq!(metrics.std_dev, variance.sqrt(), epsilon = 1e-9);
}

#[test]
fn test_zero_threshold_flags_every_nonzero_delta() {
    let batch = batch_with_deltas("zero", &[0.0, 0.2, -0.1, 0.0]);
    let metrics = batch.metrics(0.0).unwrap();
    // |0| >= 0 holds too, so exact readings count as well
    assert_eq!(metrics.outlier_ratio, 1.0);

    let nonzero = batch.filter(|r| r.delta() != 0.0);
    assert!(nonzero.readings().iter().all(|r| r.is_outlier(0.0)));
}

#[test]
fn test_empty_batch_metrics() {
    let metrics = ReadingBatch::new("empty", Vec::new()).metrics(5.0).unwrap();
    assert_eq!(metrics, ReliabilityMetrics::default());
    assert_eq!(metrics.max_delta, 0.0);
}

#[test]
fn test_outlier_boundary() {
    let batch = batch_with_deltas("edge", &[5.0, -5.0, 4.999, 0.0]);

    let flagged = batch.readings().iter().filter(|r| r.is_outlier(5.0)).count();
    assert_eq!(flagged, 2);

    let kept = batch.without_outliers(5.0);
    assert_eq!(kept.count(), 2);
    assert!(kept.readings().iter().all(|r| !r.is_outlier(5.0)));
    assert_eq!(kept.metrics(5.0).unwrap().outlier_ratio, 0.0);
}

#[test]
fn test_filters_are_idempotent() {
    let mut simulator = ScenarioSimulator::new(3, NoiseModel::gaussian(8.0)).unwrap();
    let request = ScenarioRequest::new("s", 0.0).with_count(40).with_start_time(start());
    let batch = simulator.generate(&request).unwrap();

    let once = batch.without_outliers(4.0);
    assert_eq!(once.without_outliers(4.0), once);

    let window_end = start() + Duration::minutes(10);
    let windowed = batch.filter_by_time_range(Some(start()), Some(window_end));
    assert_eq!(windowed.count(), 11);
    assert_eq!(
        windowed.filter_by_time_range(Some(start()), Some(window_end)),
        windowed
    );
}

#[test]
fn test_generation_is_reproducible() {
    let request = ScenarioRequest::new("probe", 12.0)
        .with_count(8)
        .with_start_time(start())
        .with_spacing_secs(30);

    let a = ScenarioSimulator::new(99, NoiseModel::default())
        .unwrap()
        .generate(&request)
        .unwrap();
    let b = ScenarioSimulator::new(99, NoiseModel::default())
        .unwrap()
        .generate(&request)
        .unwrap();

    assert_eq!(a, b);
    for (i, r) in a.readings().iter().enumerate() {
        assert_eq!(r.recorded_at(), start() + Duration::seconds(30 * i as i64));
    }
}

#[test]
fn test_csv_load_filter_report_export() {
    let mut input = NamedTempFile::new().unwrap();
    write!(
        input,
        "sensor_id,recorded_at,value,expected\n\
         a,2025-03-01T12:00:00Z,10.2,10\n\
         b,2025-03-01T12:00:10Z,30.0,20\n\
         a,2025-03-01T12:01:00Z,9.6,10\n\
         a,2025-03-01T12:02:00Z,16.0,10\n"
    )
    .unwrap();

    let observer = Arc::new(MemoryObserver::new());
    let loaded = CsvLoader::new()
        .with_observer(observer.clone())
        .load(input.path())
        .unwrap();
    assert_eq!(loaded.count(), 4);

    let sensor_a = loaded.filter_by_sensor("a");
    let cleaned = sensor_a.without_outliers(DEFAULT_OUTLIER_THRESHOLD);
    assert_eq!(sensor_a.count(), 3);
    assert_eq!(cleaned.count(), 2);

    let builder = ReportBuilder::new().with_observer(observer.clone());
    let batches = [sensor_a, cleaned];
    let records = builder.export_records(&batches).unwrap();
    assert_relative_eq!(records[0].outlier_ratio, 0.3333);
    assert_eq!(records[1].outlier_ratio, 0.0);

    let dir = tempdir().unwrap();
    let out = dir.path().join("report.csv");
    builder.export_csv(&batches, &out).unwrap();
    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(written.lines().count(), 3);

    let names: Vec<_> = observer.events().iter().map(PipelineEvent::name).collect();
    assert_eq!(names, vec!["batch_loaded", "report_built", "report_built"]);
}

#[test]
fn test_merge_and_chunk_reports() {
    let mut simulator = ScenarioSimulator::new(DEFAULT_SEED, NoiseModel::default()).unwrap();
    let batches: Vec<_> = (0..5)
        .map(|i| {
            let request = ScenarioRequest::new(format!("s{}", i), 10.0)
                .with_count(4)
                .with_start_time(start());
            simulator.generate(&request).unwrap()
        })
        .collect();

    let merged = merge_batches(&batches, "all");
    assert_eq!(merged.count(), 20);

    let builder = ReportBuilder::new();
    let lines: usize = chunk_batches(&batches, 2)
        .unwrap()
        .map(|chunk| builder.build(chunk).unwrap().len())
        .sum();
    assert_eq!(lines, 5);
}

#[test]
fn test_numeric_helpers() {
    assert_eq!(clamp(5.0, 0.0, 3.0).unwrap(), 3.0);
    assert_eq!(clamp(-1.0, 0.0, 3.0).unwrap(), 0.0);
    assert!(matches!(
        clamp(1.0, 5.0, 1.0),
        Err(EngineError::InvalidArgument(_))
    ));

    assert_eq!(normalize(5.0, 0.0, 10.0), 0.5);
    assert_eq!(normalize(42.0, 7.0, 7.0), 0.0);
}
