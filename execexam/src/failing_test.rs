use std::path::PathBuf;

use crate::error::ExecExamError;
use crate::failing::locate_failing_tests;
use crate::report::parse_run_report;
use crate::text::DEFAULT_PATH_LEVELS;

#[test]
fn no_failures_yield_sentinel_and_empty_list() {
    let report = parse_run_report(
        r#"{"root": "/repo", "tests": [{"nodeid": "tests/test_a.py::test_ok", "outcome": "passed"}]}"#,
    )
    .unwrap();
    let (details, paths) = locate_failing_tests(&report, DEFAULT_PATH_LEVELS).unwrap();
    assert_eq!(details, "\n");
    assert!(paths.is_empty());
}

#[test]
fn failures_are_listed_in_report_order() {
    let report = parse_run_report(
        r#"{
        "root": "/repo",
        "tests": [
            {"nodeid": "tests/test_a.py::test_one", "outcome": "failed",
             "call": {"crash": {"path": "/repo/tests/test_a.py", "lineno": 5, "message": "AssertionError: one"}}},
            {"nodeid": "tests/test_a.py::test_two", "outcome": "passed"},
            {"nodeid": "tests/test_b.py::TestGroup::test_three[1-2]", "outcome": "failed",
             "call": {"crash": {"path": "/repo/tests/test_b.py", "lineno": 9, "message": "assert 1 == 2"}}},
            {"nodeid": "tests/test_c.py::test_setup", "outcome": "error"}
        ]
    }"#,
    )
    .unwrap();
    let (details, paths) = locate_failing_tests(&report, DEFAULT_PATH_LEVELS).unwrap();

    similar_asserts::assert_eq!(
        details,
        concat!(
            "\n",
            "  Name: tests/test_a.py::test_one\n",
            "  Path: /repo/tests/test_a.py\n",
            "  Line number: 5\n",
            "  Message: AssertionError: one\n",
            "  Name: tests/test_b.py::TestGroup::test_three[1-2]\n",
            "  Path: /repo/tests/test_b.py\n",
            "  Line number: 9\n",
            "  Message: assert 1 == 2\n",
        )
    );
    let names = paths.iter().map(|p| p.test_name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["test_one", "test_three[1-2]"]);
    assert_eq!(paths[1].test_path, PathBuf::from("/repo/tests/test_b.py"));
}

#[test]
fn deep_paths_are_elided() {
    let report = parse_run_report(
        r#"{"root": "/home/student/courses/cs101/exam", "tests": [
            {"nodeid": "tests/test_a.py::test_one", "outcome": "failed",
             "call": {"crash": {"path": "x", "lineno": 1, "message": "m"}}}
        ]}"#,
    )
    .unwrap();
    let (details, _) = locate_failing_tests(&report, 4).unwrap();
    assert!(details.contains("  Path: <...>/cs101/exam/tests/test_a.py\n"), "{details}");
}

#[test]
fn failing_test_without_crash_is_malformed_input() {
    let report = parse_run_report(
        r#"{"root": "/repo", "tests": [{"nodeid": "tests/test_a.py::test_one", "outcome": "failed", "call": {}}]}"#,
    )
    .unwrap();
    let err = locate_failing_tests(&report, DEFAULT_PATH_LEVELS).unwrap_err();
    assert!(matches!(
        err,
        ExecExamError::MissingCrashData { ref node_id } if node_id == "tests/test_a.py::test_one"
    ));
}
