use std::path::{Path, PathBuf};

use crate::py_parse::PyLiteral;
use crate::report::{RunReport, StructuredRepr, parse_run_report};
use crate::resolve::{Attributor, SourceFileLocator, SourceStrategy};
use crate::snippet::extract_function_code_from_tracebacks;
use crate::traceback::{
    normalize_tracebacks, parse_flat_traceback, parse_structured_traceback, split_error_message,
};

fn attributor_for(root: &Path) -> Attributor {
    Attributor::new(SourceFileLocator::new(vec![root.to_path_buf()]))
}

fn report_with_tests(root: &Path, tests: serde_json::Value) -> RunReport {
    let raw = serde_json::json!({ "root": root, "tests": tests }).to_string();
    parse_run_report(&raw).unwrap()
}

fn flat_failure(nodeid: &str, longrepr: &str) -> serde_json::Value {
    serde_json::json!({
        "nodeid": nodeid,
        "outcome": "failed",
        "call": {
            "crash": {"path": "x", "lineno": 1, "message": "m"},
            "longrepr": longrepr
        }
    })
}

fn write_text_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create_dir_all");
    }
    std::fs::write(path, contents).expect("write");
}

#[test]
fn split_error_message_separates_type() {
    assert_eq!(
        split_error_message("AssertionError: message here"),
        ("AssertionError".to_string(), "message here".to_string())
    );
    assert_eq!(
        split_error_message("assert 1 == 2"),
        (String::new(), "assert 1 == 2".to_string())
    );
}

#[test]
fn flat_error_line_round_trips_type_and_message() {
    let parsed = parse_flat_traceback("E   AssertionError: message here", None);
    assert_eq!(parsed.error_type.as_deref(), Some("AssertionError"));
    assert_eq!(parsed.error_message.as_deref(), Some("message here"));
}

#[test]
fn flat_parser_keeps_first_error_line_and_last_assertion() {
    let text = concat!(
        "    def test_add():\n",
        ">       assert add(2, 2) == 5\n",
        "E       assert 4 == 5\n",
        "E        +  where 4 = add(2, 2)\n",
        "\n",
        "tests/test_calc.py:5: AssertionError",
    );
    let parsed = parse_flat_traceback(text, None);
    assert_eq!(parsed.error_type, None);
    assert_eq!(parsed.error_message.as_deref(), Some("assert 4 == 5"));
    assert_eq!(parsed.assertion_detail.as_deref(), Some("E       assert 4 == 5"));
    assert_eq!(parsed.actual_value, Some(PyLiteral::Int(4)));
    assert_eq!(parsed.expected_value, Some(PyLiteral::Int(5)));
    assert!(parsed.stack_trace.is_empty());
}

#[test]
fn flat_parser_leaves_values_when_actual_side_is_not_literal() {
    let parsed = parse_flat_traceback("E   assert result == [1, 2]", None);
    assert_eq!(parsed.actual_value, None);
    assert_eq!(parsed.expected_value, None);
    assert_eq!(parsed.assertion_detail.as_deref(), Some("E   assert result == [1, 2]"));
}

#[test]
fn flat_parser_classifies_stack_locations() {
    let text = concat!(
        "Traceback (most recent call last):\n",
        "  File \"/exam/test_calc.py\", line 5, in test_add\n",
        "  File \"/exam/calc.py\", line 2, in add\n",
        "ZeroDivisionError: division by zero",
    );
    let parsed = parse_flat_traceback(text, Some(Path::new("/exam/calc.py")));
    assert_eq!(
        parsed.stack_trace,
        vec![
            "File \"/exam/test_calc.py\", line 5, in test_add".to_string(),
            "File \"/exam/calc.py\", line 2, in add".to_string(),
        ]
    );
    assert_eq!(
        parsed.test_location.as_deref(),
        Some("File \"/exam/test_calc.py\", line 5, in test_add")
    );
    assert_eq!(
        parsed.error_location.as_deref(),
        Some("File \"/exam/calc.py\", line 2, in add")
    );
}

#[test]
fn frames_in_similarly_named_files_are_not_the_error_location() {
    let text = "  File \"/x/mycalc.py\", line 9, in other\nE   ValueError: boom";
    let parsed = parse_flat_traceback(text, Some(Path::new("/exam/calc.py")));
    assert_eq!(parsed.error_location, None);
    assert_eq!(parsed.stack_trace, vec!["File \"/x/mycalc.py\", line 9, in other".to_string()]);

    let relative = parse_flat_traceback(
        "  File \"questions/calc.py\", line 2, in add",
        Some(Path::new("/exam/questions/calc.py")),
    );
    assert_eq!(
        relative.error_location.as_deref(),
        Some("File \"questions/calc.py\", line 2, in add")
    );
}

#[test]
fn structured_crash_matches_source_file_by_path_components() {
    let repr = |crash_path: &str| -> StructuredRepr {
        serde_json::from_value(serde_json::json!({
            "reprcrash": {"path": crash_path, "lineno": 2, "message": "ValueError: boom"}
        }))
        .unwrap()
    };
    let source = Path::new("/exam/calc.py");

    let unrelated = parse_structured_traceback(&repr("/x/mycalc.py"), Some(source));
    assert_eq!(unrelated.error_location, None);
    assert_eq!(unrelated.error_type, "ValueError");

    let matching = parse_structured_traceback(&repr("calc.py"), Some(source));
    assert_eq!(matching.error_location.as_deref(), Some("File calc.py, line 2"));
}

#[test]
fn single_flat_failure_without_frames_has_empty_stack_trace() {
    let report = report_with_tests(
        Path::new("/nonexistent-exam"),
        serde_json::json!([flat_failure("test_x.py::test_x", "E   AssertionError: test failed")]),
    );
    let infos = normalize_tracebacks(&report, None, &attributor_for(Path::new("/nonexistent-exam")));

    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].test_path, "test_x.py::test_x");
    assert_eq!(infos[0].error_type, "AssertionError");
    assert_eq!(infos[0].error_message, "test failed");
    assert!(infos[0].stack_trace.is_empty());
    assert_eq!(infos[0].full_traceback, "E   AssertionError: test failed");
    assert_eq!(infos[0].source_file, None);
    assert_eq!(infos[0].tested_function, None);
}

#[test]
fn structured_failures_use_crash_and_entries() {
    let report = report_with_tests(
        Path::new("/repo"),
        serde_json::json!([{
            "nodeid": "tests/test_calc.py::test_add",
            "outcome": "failed",
            "call": {
                "longrepr": {
                    "reprcrash": {"path": "/repo/tests/test_calc.py", "lineno": 5, "message": "AssertionError: assert 4 == 5"},
                    "reprtraceback": {"reprentries": [
                        {"type": "ReprEntry", "data": {"reprfileloc": {"path": "tests/test_calc.py", "lineno": 5, "message": "AssertionError"}}},
                        {"reprfileloc": {"path": "calc.py", "lineno": 2}},
                        {"type": "ReprEntryNative", "data": {"lines": ["raw"]}}
                    ]}
                }
            }
        }]),
    );
    let infos = normalize_tracebacks(&report, None, &attributor_for(Path::new("/repo")));

    assert_eq!(infos.len(), 1);
    let info = &infos[0];
    assert_eq!(
        info.stack_trace,
        vec![
            "File tests/test_calc.py, line 5".to_string(),
            "File calc.py, line 2".to_string(),
        ]
    );
    assert_eq!(info.test_location, "File /repo/tests/test_calc.py, line 5");
    assert_eq!(info.error_type, "AssertionError");
    assert_eq!(info.error_message, "assert 4 == 5");
    assert_eq!(info.full_traceback, "");
}

#[test]
fn log_becomes_traceback_and_empty_records_are_dropped() {
    let report = report_with_tests(
        Path::new("/repo"),
        serde_json::json!([
            {"nodeid": "test_a.py::test_logged", "outcome": "error", "call": {"log": "setup exploded"}},
            {"nodeid": "test_a.py::test_silent", "outcome": "failed", "call": {}},
            {"nodeid": "test_a.py::test_passed", "outcome": "passed", "call": {"longrepr": "ignored"}}
        ]),
    );
    let infos = normalize_tracebacks(&report, None, &attributor_for(Path::new("/repo")));

    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].test_path, "test_a.py::test_logged");
    assert_eq!(infos[0].full_traceback, "setup exploded");
}

fn exam_project() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let calc = dir.path().join("calc.py");
    write_text_file(
        &calc,
        "def add(a, b):\n    assert a >= 0\n    return a - b\n",
    );
    write_text_file(
        &dir.path().join("test_calc.py"),
        "from calc import add\n\n\ndef test_add():\n    assert add(2, 2) == 4\n\n\ndef test_negative():\n    add(-1, 2)\n",
    );
    (dir, calc)
}

#[test]
fn failures_are_attributed_to_the_tested_function() {
    let (dir, calc) = exam_project();
    let longrepr = concat!(
        "    def test_add():\n",
        ">       assert add(2, 2) == 4\n",
        "E       assert 0 == 4\n",
        "E        +  where 0 = add(2, 2)\n",
    );
    let report = report_with_tests(
        dir.path(),
        serde_json::json!([flat_failure("test_calc.py::test_add", longrepr)]),
    );
    let infos = normalize_tracebacks(&report, None, &attributor_for(dir.path()));

    let info = &infos[0];
    assert_eq!(info.tested_function.as_deref(), Some("add"));
    assert_eq!(info.source_file.as_deref(), Some(calc.as_path()));
    assert_eq!(info.source_file_strategy, Some(SourceStrategy::TestFileImports));
    assert_eq!(info.actual_value, Some(PyLiteral::Int(0)));
    assert_eq!(info.expected_value, Some(PyLiteral::Int(4)));

    let snippets = extract_function_code_from_tracebacks(&infos);
    assert_eq!(
        snippets[0].as_ref().unwrap(),
        &vec![
            "def add(a, b):".to_string(),
            "assert a >= 0".to_string(),
            "return a - b".to_string(),
        ]
    );
}

#[test]
fn assertion_inside_source_sets_error_location() {
    let (dir, calc) = exam_project();
    let longrepr = concat!(
        "    def add(a, b):\n",
        "        assert a >= 0\n",
        "E       AssertionError\n",
    );
    let report = report_with_tests(
        dir.path(),
        serde_json::json!([flat_failure("test_calc.py::test_negative", longrepr)]),
    );
    let infos = normalize_tracebacks(&report, None, &attributor_for(dir.path()));

    assert_eq!(infos[0].assertion_detail, "assert a >= 0");
    assert_eq!(
        infos[0].error_location,
        format!("File {}, line 2", calc.display())
    );
}

#[test]
fn normalizing_twice_gives_identical_records() {
    let (dir, _calc) = exam_project();
    let report = report_with_tests(
        dir.path(),
        serde_json::json!([
            flat_failure("test_calc.py::test_add", "E       assert 0 == 4"),
            flat_failure("test_calc.py::test_negative", "E   AssertionError: boom"),
        ]),
    );
    let attributor = attributor_for(dir.path());
    let first = normalize_tracebacks(&report, None, &attributor);
    let second = normalize_tracebacks(&report, None, &attributor);
    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}
