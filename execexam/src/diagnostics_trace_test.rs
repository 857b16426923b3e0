use std::path::Path;
use std::time::{Duration, Instant, UNIX_EPOCH};

use crate::config::ExtractSettings;
use crate::diagnostics_trace::{RunCounts, RunStart, write_run_trace};

#[test]
fn run_trace_records_settings_and_counts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let trace_dir = dir.path().join("diag");
    let counts = RunCounts {
        tests: 3,
        failing_tests: 1,
        tracebacks: 1,
        events_dispatched: 7,
        events_malformed: 0,
    };
    write_run_trace(
        &trace_dir,
        Path::new("/exam"),
        Path::new("/exam/report.json"),
        &ExtractSettings::default(),
        counts,
        None,
        serde_json::json!({ "return_code": 1 }),
    );

    let raw = std::fs::read_to_string(trace_dir.join("run_trace.json")).expect("trace written");
    let trace: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(trace["schema_version"], 1);
    assert_eq!(trace["report_path"], "/exam/report.json");
    assert_eq!(trace["counts"]["events_dispatched"], 7);
    assert_eq!(trace["settings"]["path_levels"], 4);
    assert_eq!(trace["started_at_unix_ms"], serde_json::Value::Null);
    assert_eq!(trace["elapsed_ms"], serde_json::Value::Null);
    assert_eq!(trace["extra"]["return_code"], 1);
}

#[test]
fn run_trace_start_time_is_taken_from_the_run_start() {
    let dir = tempfile::tempdir().expect("tempdir");
    let start = RunStart {
        wall: UNIX_EPOCH + Duration::from_millis(1_700_000_000_123),
        instant: Instant::now(),
    };
    write_run_trace(
        dir.path(),
        Path::new("/exam"),
        Path::new("/exam/report.json"),
        &ExtractSettings::default(),
        RunCounts::default(),
        Some(start),
        serde_json::Value::Null,
    );

    let raw = std::fs::read_to_string(dir.path().join("run_trace.json")).expect("trace written");
    let trace: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(trace["started_at_unix_ms"], 1_700_000_000_123u64);
    assert!(trace["elapsed_ms"].is_u64());
}
