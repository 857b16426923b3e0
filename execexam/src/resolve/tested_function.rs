use std::path::Path;

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::py_parse;

static CALL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)\(").unwrap());

pub const DEFAULT_HELPER_PREFIXES: [&str; 2] = ["assert", "test_"];

/// Names the failing test's source calls, or the source itself when nothing qualifies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestedFunctions {
    Candidates(IndexSet<String>),
    Fallback(String),
}

impl TestedFunctions {
    pub fn candidates(&self) -> Option<&IndexSet<String>> {
        match self {
            TestedFunctions::Candidates(names) => Some(names),
            TestedFunctions::Fallback(_) => None,
        }
    }
}

pub fn extract_tested_functions(source: &str) -> TestedFunctions {
    extract_tested_functions_with(source, &DEFAULT_HELPER_PREFIXES)
}

pub fn extract_tested_functions_with<S: AsRef<str>>(
    source: &str,
    helper_prefixes: &[S],
) -> TestedFunctions {
    let names = CALL_RE
        .captures_iter(source)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| {
            !helper_prefixes
                .iter()
                .any(|prefix| name.starts_with(prefix.as_ref()))
        })
        .map(str::to_string)
        .collect::<IndexSet<_>>();
    if names.is_empty() {
        TestedFunctions::Fallback(source.to_string())
    } else {
        TestedFunctions::Candidates(names)
    }
}

/// Calls made by the test function itself, read statically from its file.
///
/// `None` when the file cannot be read or the function is not defined in it.
pub fn test_call_list(test_file: &Path, test_name: &str) -> Option<Vec<String>> {
    let source = std::fs::read_to_string(test_file).ok()?;
    py_parse::called_functions(&source, test_name)
}

/// First candidate, in discovery order, that the test really calls.
pub fn resolve_tested_function(tested: &TestedFunctions, ground_truth: &[String]) -> Option<String> {
    tested
        .candidates()?
        .iter()
        .find(|name| ground_truth.iter().any(|g| g == *name))
        .cloned()
}
