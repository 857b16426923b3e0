//! Normalized failure records for every failed or errored test of a run report.

mod flat;
mod structured;

use std::path::{Path, PathBuf};

use path_slash::PathExt;
use serde::Serialize;

pub use self::flat::{FlatTraceback, parse_flat_traceback};
pub use self::structured::{StructuredTraceback, entry_locations, parse_structured_traceback};

use crate::py_parse::PyLiteral;
use crate::report::{CallRecord, LongRepr, NodeId, RunReport, TestResult, test_file_path};
use crate::resolve::{Attribution, Attributor, SourceStrategy};
use crate::snippet::extract_function_source;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TracebackInfo {
    pub test_path: String,
    pub source_file: Option<PathBuf>,
    pub tested_function: Option<String>,
    pub error_location: String,
    pub test_location: String,
    pub full_traceback: String,
    pub error_type: String,
    pub error_message: String,
    pub stack_trace: Vec<String>,
    pub assertion_detail: String,
    pub expected_value: Option<PyLiteral>,
    pub actual_value: Option<PyLiteral>,
    pub source_file_strategy: Option<SourceStrategy>,
}

impl TracebackInfo {
    fn has_content(&self) -> bool {
        !self.full_traceback.is_empty()
            || !self.error_message.is_empty()
            || !self.stack_trace.is_empty()
    }

    fn apply_attribution(&mut self, attribution: Attribution) {
        self.tested_function = attribution.tested_function;
        if let Some(located) = attribution.source {
            if let Some(line) = located.line {
                self.error_location = format_location(&located.path.to_slash_lossy(), line);
            }
            self.source_file_strategy = Some(located.strategy);
            self.source_file = Some(located.path);
        }
    }
}

pub(crate) fn format_location(path: &str, line: u64) -> String {
    format!("File {path}, line {line}")
}

/// `"Type: message"` into its parts; text without the separator is all message.
pub fn split_error_message(message: &str) -> (String, String) {
    match message.split_once(": ") {
        Some((error_type, error_message)) => (error_type.to_string(), error_message.to_string()),
        None => (String::new(), message.to_string()),
    }
}

/// Whether `frame_path` names `source_file`, compared by whole trailing components.
fn is_source_frame(frame_path: &str, source_file: &Path) -> bool {
    let frame = Path::new(frame_path.trim());
    if frame.as_os_str().is_empty() || source_file.as_os_str().is_empty() {
        return false;
    }
    frame.ends_with(source_file) || source_file.ends_with(frame)
}

/// One record per failed or errored test that has something to show, in report order.
///
/// `failing_test_source` overrides the test body used for attribution; without it each
/// test's own definition is read from its file.
pub fn normalize_tracebacks(
    report: &RunReport,
    failing_test_source: Option<&str>,
    attributor: &Attributor,
) -> Vec<TracebackInfo> {
    report
        .tests
        .iter()
        .filter(|test| test.outcome.is_failure())
        .filter_map(|test| normalize_test(report, test, failing_test_source, attributor))
        .collect()
}

fn normalize_test(
    report: &RunReport,
    test: &TestResult,
    failing_test_source: Option<&str>,
    attributor: &Attributor,
) -> Option<TracebackInfo> {
    let test_file = test_file_path(&report.root, &test.nodeid);
    let test_name = NodeId::parse(&test.nodeid).function_name();
    let attribute = |frame_hints: &[String]| {
        let test_source = match failing_test_source {
            Some(source) => source.to_string(),
            None => extract_function_source(&test_file, test_name).unwrap_or_default(),
        };
        attributor.attribute(&test_file, test_name, &test_source, frame_hints)
    };

    let mut info = TracebackInfo {
        test_path: test.nodeid.clone(),
        ..TracebackInfo::default()
    };
    let call = test.call.as_ref();
    match call.and_then(|c| c.longrepr.as_ref()) {
        Some(LongRepr::Flat(text)) => {
            info.full_traceback = text.clone();
            let frame_hints = text.lines().map(str::to_string).collect::<Vec<_>>();
            info.apply_attribution(attribute(&frame_hints));
            let parsed = parse_flat_traceback(text, info.source_file.as_deref());
            apply_flat(&mut info, parsed);
        }
        Some(LongRepr::Structured(repr)) => {
            info.apply_attribution(attribute(&entry_locations(repr)));
            let parsed = parse_structured_traceback(repr, info.source_file.as_deref());
            apply_structured(&mut info, parsed);
        }
        None => {}
    }

    if info.full_traceback.is_empty()
        && let Some(log) = call.and_then(CallRecord::log_text)
    {
        info.full_traceback = log;
    }
    if info.error_location.is_empty() {
        locate_assertion_in_source(&mut info);
    }
    info.has_content().then_some(info)
}

fn apply_flat(info: &mut TracebackInfo, parsed: FlatTraceback) {
    info.stack_trace = parsed.stack_trace;
    if let Some(location) = parsed.test_location {
        info.test_location = location;
    }
    if let Some(location) = parsed.error_location {
        info.error_location = location;
    }
    if let Some(error_type) = parsed.error_type {
        info.error_type = error_type;
    }
    if let Some(error_message) = parsed.error_message {
        info.error_message = error_message;
    }
    if let Some(detail) = parsed.assertion_detail {
        info.assertion_detail = detail;
    }
    info.actual_value = parsed.actual_value;
    info.expected_value = parsed.expected_value;
}

fn apply_structured(info: &mut TracebackInfo, parsed: StructuredTraceback) {
    info.stack_trace = parsed.stack_trace;
    if let Some(location) = parsed.test_location {
        info.test_location = location;
    }
    if let Some(location) = parsed.error_location {
        info.error_location = location;
    }
    info.error_type = parsed.error_type;
    info.error_message = parsed.error_message;
}

/// Points the error location at the first source line containing the assertion text.
fn locate_assertion_in_source(info: &mut TracebackInfo) {
    let detail = info.assertion_detail.trim();
    let Some(source_file) = info.source_file.as_deref() else {
        return;
    };
    if detail.is_empty() {
        return;
    }
    let Ok(source) = std::fs::read_to_string(source_file) else {
        return;
    };
    if let Some(index) = source.lines().position(|line| line.contains(detail)) {
        info.error_location = format_location(&source_file.to_slash_lossy(), index as u64 + 1);
    }
}
