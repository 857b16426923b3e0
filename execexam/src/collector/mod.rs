//! Live side channel: per-test assertion histories built from lifecycle events.

mod exception;
mod render;

use serde::Serialize;

pub use self::exception::{ExceptionDetail, ExceptionPayload, extract_exception_detail};
pub use self::render::{render_assertion_history, render_entry};

use crate::text::single_line;

/// Callbacks fired synchronously by the test runner while a suite executes.
pub trait TestLifecycleListener {
    fn on_test_start(&mut self, node_id: &str);

    fn on_assertion_evaluated(
        &mut self,
        node_id: &str,
        line: u32,
        code: &str,
        explanation: &str,
        passed: bool,
    );

    fn on_uncaught_exception(&mut self, node_id: &str, payload: &ExceptionPayload);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssertionStatus {
    Passed,
    Failed,
}

impl AssertionStatus {
    pub fn label(self) -> &'static str {
        match self {
            AssertionStatus::Passed => "Passed",
            AssertionStatus::Failed => "Failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionRecord {
    pub status: AssertionStatus,
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub exact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestReportEntry {
    pub nodeid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertions: Option<Vec<AssertionRecord>>,
}

impl TestReportEntry {
    fn new(nodeid: &str) -> Self {
        Self {
            nodeid: nodeid.to_string(),
            assertions: None,
        }
    }

    fn push(&mut self, record: AssertionRecord) {
        self.assertions.get_or_insert_with(Vec::new).push(record);
    }
}

/// Accumulator owned by one suite run; dropped with the run, never shared globally.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsContext {
    entries: Vec<TestReportEntry>,
}

impl DiagnosticsContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TestReportEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<TestReportEntry> {
        self.entries
    }

    pub fn assertion_history(&self) -> String {
        render_assertion_history(&self.entries)
    }

    fn entry_mut(&mut self, node_id: &str) -> Option<&mut TestReportEntry> {
        self.entries.iter_mut().find(|e| e.nodeid == node_id)
    }
}

impl TestLifecycleListener for DiagnosticsContext {
    fn on_test_start(&mut self, node_id: &str) {
        self.entries.push(TestReportEntry::new(node_id));
    }

    fn on_assertion_evaluated(
        &mut self,
        node_id: &str,
        line: u32,
        code: &str,
        explanation: &str,
        passed: bool,
    ) {
        let Some(entry) = self.entry_mut(node_id) else {
            return;
        };
        entry.push(AssertionRecord {
            status: if passed {
                AssertionStatus::Passed
            } else {
                AssertionStatus::Failed
            },
            line,
            code: Some(code.to_string()),
            message: None,
            exact: single_line(explanation),
        });
    }

    fn on_uncaught_exception(&mut self, node_id: &str, payload: &ExceptionPayload) {
        let detail = extract_exception_detail(payload);
        match self.entry_mut(node_id) {
            Some(entry) => entry.push(AssertionRecord {
                status: AssertionStatus::Failed,
                line: detail.line,
                code: None,
                message: Some(detail.message),
                exact: detail.exact,
            }),
            None => {
                // No test-start event fired (collection/setup failure).
                let mut entry = TestReportEntry::new(node_id);
                entry.push(AssertionRecord {
                    status: AssertionStatus::Failed,
                    line: detail.line,
                    code: None,
                    message: Some(payload.text.clone()),
                    exact: single_line(&payload.type_name),
                });
                self.entries.push(entry);
            }
        }
    }
}
