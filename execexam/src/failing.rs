use std::path::PathBuf;

use serde::Serialize;

use crate::error::ExecExamError;
use crate::report::{NodeId, Outcome, RunReport};
use crate::summary::NO_FAILING_DETAILS;
use crate::text::elide_path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailingTestPath {
    pub test_name: String,
    pub test_path: PathBuf,
}

/// Formats every failed test of `report` and pairs each test name with its file.
///
/// The text always starts with a newline, so a run without failures yields exactly
/// [`NO_FAILING_DETAILS`].
pub fn locate_failing_tests(
    report: &RunReport,
    path_levels: usize,
) -> Result<(String, Vec<FailingTestPath>), ExecExamError> {
    let mut details = String::from(NO_FAILING_DETAILS);
    let mut paths: Vec<FailingTestPath> = vec![];
    for test in report.tests.iter().filter(|t| t.outcome == Outcome::Failed) {
        let crash = test
            .call
            .as_ref()
            .and_then(|call| call.crash.as_ref())
            .ok_or_else(|| ExecExamError::MissingCrashData {
                node_id: test.nodeid.clone(),
            })?;
        let node = NodeId::parse(&test.nodeid);
        let test_path = report.root.join(node.file);
        details.push_str(&format!("  Name: {}\n", test.nodeid));
        details.push_str(&format!("  Path: {}\n", elide_path(&test_path, path_levels)));
        details.push_str(&format!("  Line number: {}\n", crash.lineno));
        details.push_str(&format!("  Message: {}\n", crash.message));
        paths.push(FailingTestPath {
            test_name: node.name.to_string(),
            test_path,
        });
    }
    Ok((details, paths))
}
