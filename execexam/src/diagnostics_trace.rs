use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};

use serde::Serialize;

use crate::config::ExtractSettings;

pub const DIAGNOSTICS_DIR_ENV: &str = "EXECEXAM_DIAGNOSTICS_DIR";

#[derive(Debug, Clone, Serialize)]
pub struct RunTrace {
    pub schema_version: u32,
    pub report_path: String,
    pub repo_root: String,
    pub started_at_unix_ms: Option<u128>,
    pub elapsed_ms: Option<u128>,
    pub settings: SettingsSummary,
    pub counts: RunCounts,
    pub extra: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsSummary {
    pub verbose: bool,
    pub path_levels: usize,
    pub framework_modules: Vec<String>,
    pub helper_prefixes: Vec<String>,
    pub source_roots: Vec<String>,
    pub console_labels: Vec<String>,
}

impl SettingsSummary {
    fn from_settings(settings: &ExtractSettings) -> Self {
        Self {
            verbose: settings.verbose,
            path_levels: settings.path_levels,
            framework_modules: settings.framework_modules.clone(),
            helper_prefixes: settings.helper_prefixes.clone(),
            source_roots: settings
                .source_roots
                .iter()
                .map(|p| p.to_string_lossy().to_string())
                .collect(),
            console_labels: settings.console_labels.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RunCounts {
    pub tests: usize,
    pub failing_tests: usize,
    pub tracebacks: usize,
    pub events_dispatched: usize,
    pub events_malformed: usize,
}

/// Wall-clock and monotonic readings taken when a run begins.
#[derive(Debug, Clone, Copy)]
pub struct RunStart {
    pub wall: SystemTime,
    pub instant: Instant,
}

impl RunStart {
    pub fn now() -> Self {
        Self {
            wall: SystemTime::now(),
            instant: Instant::now(),
        }
    }
}

fn diagnostics_dir() -> Option<PathBuf> {
    std::env::var(DIAGNOSTICS_DIR_ENV)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

/// Writes `run_trace.json` into the diagnostics dir; a no-op when the dir is not configured.
pub fn maybe_write_run_trace(
    repo_root: &Path,
    report_path: &Path,
    settings: &ExtractSettings,
    counts: RunCounts,
    started_at: Option<RunStart>,
    extra: serde_json::Value,
) {
    let Some(dir) = diagnostics_dir() else {
        return;
    };
    write_run_trace(&dir, repo_root, report_path, settings, counts, started_at, extra);
}

pub fn write_run_trace(
    dir: &Path,
    repo_root: &Path,
    report_path: &Path,
    settings: &ExtractSettings,
    counts: RunCounts,
    started_at: Option<RunStart>,
    extra: serde_json::Value,
) {
    let _ = std::fs::create_dir_all(dir);
    let trace_path = dir.join("run_trace.json");

    let started_at_unix_ms = started_at
        .and_then(|start| start.wall.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_millis());
    let elapsed_ms = started_at.map(|start| start.instant.elapsed().as_millis());

    let trace = RunTrace {
        schema_version: 1,
        report_path: report_path.to_string_lossy().to_string(),
        repo_root: repo_root.to_string_lossy().to_string(),
        started_at_unix_ms,
        elapsed_ms,
        settings: SettingsSummary::from_settings(settings),
        counts,
        extra,
    };

    if let Ok(file) = std::fs::File::create(trace_path) {
        let _ = serde_json::to_writer_pretty(file, &trace);
    }
}
