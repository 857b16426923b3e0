use std::path::Path;

use crate::py_parse::{self, PyLiteral};
use crate::resolve::parse_frame_hint;

use super::{is_source_frame, split_error_message};

const ERROR_LINE_PREFIX: &str = "E   ";

/// Everything recoverable from pytest's plain-text failure representation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatTraceback {
    pub stack_trace: Vec<String>,
    pub test_location: Option<String>,
    pub error_location: Option<String>,
    pub error_type: Option<String>,
    pub error_message: Option<String>,
    pub assertion_detail: Option<String>,
    pub actual_value: Option<PyLiteral>,
    pub expected_value: Option<PyLiteral>,
}

fn is_stack_location(line: &str) -> bool {
    line.contains("File ") && line.contains(", line ")
}

/// Line-oriented scan of a flat traceback.
///
/// `source_file` lets frames inside the attributed source file become the error location.
pub fn parse_flat_traceback(text: &str, source_file: Option<&Path>) -> FlatTraceback {
    let mut parsed = FlatTraceback::default();
    for line in text.lines() {
        if is_stack_location(line) {
            let location = line.trim().to_string();
            if line.contains("test_") {
                parsed.test_location = Some(location.clone());
            } else if let Some(source) = source_file
                && parse_frame_hint(line).is_some_and(|hint| is_source_frame(&hint.path, source))
            {
                parsed.error_location = Some(location.clone());
            }
            parsed.stack_trace.push(location);
        } else if let Some(rest) = line.strip_prefix(ERROR_LINE_PREFIX)
            && parsed.error_message.as_deref().is_none_or(str::is_empty)
        {
            let (error_type, error_message) = split_error_message(rest.trim());
            if !error_type.is_empty() {
                parsed.error_type = Some(error_type);
            }
            parsed.error_message = Some(error_message);
        }
        if line.contains("assert") {
            parsed.assertion_detail = Some(line.trim().to_string());
            if line.contains("==") {
                evaluate_comparison(line, &mut parsed);
            }
        }
    }
    parsed
}

/// `assert <actual> == <expected>`; an unevaluable actual side leaves both values alone.
fn evaluate_comparison(line: &str, parsed: &mut FlatTraceback) {
    let Some((_, expression)) = line.rsplit_once("assert") else {
        return;
    };
    let Some((actual, expected)) = expression.trim().split_once("==") else {
        return;
    };
    let strip = |side: &str| {
        side.trim_matches(|c: char| c == '(' || c == ')' || c == ' ')
            .to_string()
    };
    let Some(actual) = py_parse::evaluate_literal(&strip(actual)) else {
        return;
    };
    parsed.actual_value = Some(actual);
    if let Some(expected) = py_parse::evaluate_literal(&strip(expected)) {
        parsed.expected_value = Some(expected);
    }
}
