//! End-to-end diagnosis of one finished run.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::collector::DiagnosticsContext;
use crate::config::ExtractSettings;
use crate::error::ExecExamError;
use crate::exit_code::{PytestExitCode, execexam_return_code};
use crate::failing::{FailingTestPath, locate_failing_tests};
use crate::pythonpath::python_import_roots;
use crate::report::{NodeId, Outcome, RunReport};
use crate::resolve::{Attributor, SourceFileLocator};
use crate::snippet::{extract_function_code_from_tracebacks, extract_function_source};
use crate::summary::summarize_run;
use crate::text::filter_output_by_labels;
use crate::traceback::{TracebackInfo, normalize_tracebacks};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snippet {
    pub test_path: String,
    pub function: Option<String>,
    pub lines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Definition of one failing test, read from its file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailingTestSource {
    pub test_name: String,
    pub test_path: PathBuf,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    pub summary: String,
    pub console_output: String,
    pub assertion_history: String,
    pub failing_details: String,
    pub failing_tests: Vec<FailingTestPath>,
    pub failing_test_sources: Vec<FailingTestSource>,
    /// Every extracted failing test definition, each ending in one newline.
    pub failing_test_code_overall: String,
    pub tracebacks: Vec<TracebackInfo>,
    pub snippets: Vec<Snippet>,
    pub return_code: i32,
}

pub fn attributor_for(project_root: &Path, settings: &ExtractSettings) -> Attributor {
    let import_roots = python_import_roots(project_root, &settings.source_roots);
    let locator = SourceFileLocator::new(import_roots)
        .with_framework_modules(settings.framework_modules.clone());
    Attributor::new(locator).with_helper_prefixes(settings.helper_prefixes.clone())
}

/// pytest's own exit status when recorded, otherwise inferred from the outcomes.
pub fn pytest_exit_code(report: &RunReport) -> PytestExitCode {
    if let Some(code) = report.exitcode {
        return PytestExitCode::from_code(code);
    }
    if report.tests.is_empty() {
        PytestExitCode::NoTestsCollected
    } else if report.tests.iter().any(|t| t.outcome.is_failure()) {
        PytestExitCode::TestsFailed
    } else {
        PytestExitCode::Ok
    }
}

pub fn diagnose(
    report: &RunReport,
    context: &DiagnosticsContext,
    console_output: &str,
    settings: &ExtractSettings,
) -> Result<Diagnosis, ExecExamError> {
    let (failing_details, failing_tests) = locate_failing_tests(report, settings.path_levels)?;
    let failing_test_sources = read_failing_test_sources(&failing_tests);
    let failing_test_code_overall: String = failing_test_sources
        .iter()
        .filter_map(|f| f.source.as_deref())
        .map(|source| format!("{}\n", source.trim_end()))
        .collect();

    let attributor = attributor_for(&report.root, settings);
    let tracebacks = normalize_tracebacks(report, None, &attributor);
    if settings.verbose {
        for info in tracebacks.iter().filter(|i| i.source_file.is_none()) {
            eprintln!("execexam: no source file attributed for {}", info.test_path);
        }
        let errored = report
            .tests
            .iter()
            .filter(|t| t.outcome == Outcome::Error)
            .count();
        if errored > 0 {
            eprintln!("execexam: {errored} test(s) errored outside the test body");
        }
    }

    let snippets = tracebacks
        .iter()
        .zip(extract_function_code_from_tracebacks(&tracebacks))
        .map(|(info, lines)| Snippet {
            test_path: info.test_path.clone(),
            function: info.tested_function.clone(),
            error: lines.as_ref().err().map(|e| e.to_string()),
            lines: lines.unwrap_or_default(),
        })
        .collect();

    Ok(Diagnosis {
        summary: summarize_run(report),
        console_output: filter_output_by_labels(&settings.console_labels, console_output),
        assertion_history: context.assertion_history(),
        failing_details,
        failing_tests,
        failing_test_sources,
        failing_test_code_overall,
        tracebacks,
        snippets,
        return_code: execexam_return_code(pytest_exit_code(report)),
    })
}

fn read_failing_test_sources(failing_tests: &[FailingTestPath]) -> Vec<FailingTestSource> {
    failing_tests
        .iter()
        .map(|f| FailingTestSource {
            test_name: f.test_name.clone(),
            test_path: f.test_path.clone(),
            source: extract_function_source(&f.test_path, NodeId::parse(&f.test_name).function_name())
                .ok(),
        })
        .collect()
}

impl Diagnosis {
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        if !self.summary.is_empty() {
            out.push_str(&self.summary);
            out.push('\n');
        }
        if !self.console_output.is_empty() {
            out.push('\n');
            out.push_str(&self.console_output);
        }
        if !self.assertion_history.is_empty() {
            out.push_str("\nAssertions:");
            out.push_str(&self.assertion_history);
        }
        if !crate::summary::is_failing_details_empty(&self.failing_details) {
            out.push_str("\nFailing tests:");
            out.push_str(&self.failing_details);
        }
        for failing in &self.failing_test_sources {
            if let Some(source) = &failing.source {
                out.push_str(&format!("\nFailing test {}:\n{}\n", failing.test_name, source.trim_end()));
            }
        }
        for (info, snippet) in self.tracebacks.iter().zip(&self.snippets) {
            out.push_str(&render_traceback(info, snippet));
        }
        out.push_str(&format!(
            "\n{}\n",
            if self.return_code == 0 {
                "\u{2714} All checks passed."
            } else {
                "\u{2718} One or more checks failed."
            }
        ));
        out
    }
}

fn render_traceback(info: &TracebackInfo, snippet: &Snippet) -> String {
    let mut out = format!("\n{}\n", info.test_path);
    if let Some(function) = &info.tested_function {
        out.push_str(&format!("  Function: {function}\n"));
    }
    if let Some(source_file) = &info.source_file {
        out.push_str(&format!("  Source: {}\n", source_file.display()));
    }
    if let Some(strategy) = info.source_file_strategy {
        out.push_str(&format!("  Strategy: {}\n", strategy.describe()));
    }
    if !info.error_location.is_empty() {
        out.push_str(&format!("  Error location: {}\n", info.error_location));
    }
    if !info.test_location.is_empty() {
        out.push_str(&format!("  Test location: {}\n", info.test_location));
    }
    match (info.error_type.is_empty(), info.error_message.is_empty()) {
        (false, _) => out.push_str(&format!("  Error: {}: {}\n", info.error_type, info.error_message)),
        (true, false) => out.push_str(&format!("  Error: {}\n", info.error_message)),
        (true, true) => {}
    }
    if !info.assertion_detail.is_empty() {
        out.push_str(&format!("  Assertion: {}\n", info.assertion_detail));
    }
    if let (Some(actual), Some(expected)) = (&info.actual_value, &info.expected_value) {
        out.push_str(&format!("  Actual: {actual}\n  Expected: {expected}\n"));
    }
    if !snippet.lines.is_empty() {
        out.push_str("  Code:\n");
        for line in &snippet.lines {
            out.push_str(&format!("    {line}\n"));
        }
    }
    out
}
