use indexmap::IndexMap;

use crate::report::RunReport;

/// Sentinel returned by the failing-test locator when nothing failed.
pub const NO_FAILING_DETAILS: &str = "\n";

pub fn is_failing_details_empty(details: &str) -> bool {
    details == NO_FAILING_DETAILS
}

pub fn summarize(summary: &IndexMap<String, u64>) -> String {
    if summary.is_empty() {
        return String::new();
    }
    let parts = summary
        .iter()
        .map(|(label, count)| format!("{count} {label}"))
        .collect::<Vec<_>>();
    format!("Details: {}", parts.join(", "))
}

pub fn summarize_run(report: &RunReport) -> String {
    summarize(&report.summary)
}
