use std::path::Path;

use crate::text::{
    DEFAULT_CONSOLE_LABELS, elide_path, filter_output_by_label, filter_output_by_labels,
    single_line,
};

#[test]
fn single_line_keeps_text_without_newline() {
    assert_eq!(single_line("assert 1 == 2"), "assert 1 == 2");
    assert_eq!(single_line(""), "");
}

#[test]
fn single_line_collapses_multi_line_text() {
    insta::assert_snapshot!(single_line("assert 1 == 2  \n +  where 1 = f()"), @"assert 1 == 2 ...");
}

#[test]
fn single_line_of_trailing_newline_still_marks_ellipsis() {
    assert_eq!(single_line("only\n"), "only ...");
}

#[test]
fn filter_output_by_label_keeps_matching_lines_with_newlines() {
    let output = "collected 2 items\nFAILED tests/test_a.py::test_one\nPASSED tests/test_a.py::test_two\n";
    assert_eq!(
        filter_output_by_label("FAILED", output),
        "FAILED tests/test_a.py::test_one\n"
    );
}

#[test]
fn filter_output_by_labels_matches_any_label_and_ignores_ansi() {
    let output = "\u{1b}[31mFAILED\u{1b}[0m tests/test_a.py::test_one\nsomething\nERROR collecting tests/test_b.py\nWARNING deprecated\n";
    let filtered = filter_output_by_labels(&DEFAULT_CONSOLE_LABELS, output);
    similar_asserts::assert_eq!(
        filtered,
        "\u{1b}[31mFAILED\u{1b}[0m tests/test_a.py::test_one\nERROR collecting tests/test_b.py\nWARNING deprecated\n"
    );
}

#[test]
fn filter_output_by_labels_without_labels_is_empty() {
    let labels: [&str; 0] = [];
    assert_eq!(filter_output_by_labels(&labels, "FAILED x\n"), "");
}

#[test]
fn elide_path_keeps_short_paths() {
    assert_eq!(elide_path(Path::new("tests/test_a.py"), 4), "tests/test_a.py");
}

#[test]
fn elide_path_keeps_last_levels_components() {
    let path = Path::new("/home/user/documents/work/project/file.txt");
    assert_eq!(elide_path(path, 4), "<...>/documents/work/project/file.txt");
}

#[test]
fn elide_path_with_two_levels() {
    let path = Path::new("/home/user/documents/work/project/file.txt");
    insta::assert_snapshot!(elide_path(path, 2), @"<...>/project/file.txt");
}
