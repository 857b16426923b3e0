use std::path::Path;

use crate::report::StructuredRepr;

use super::{format_location, is_source_frame, split_error_message};

/// `File <path>, line <n>` for every entry that carries a file location.
pub fn entry_locations(repr: &StructuredRepr) -> Vec<String> {
    repr.entries()
        .iter()
        .filter_map(|entry| entry.file_location())
        .map(|loc| format_location(&loc.path, loc.lineno))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredTraceback {
    pub stack_trace: Vec<String>,
    pub test_location: Option<String>,
    pub error_location: Option<String>,
    pub error_type: String,
    pub error_message: String,
}

pub fn parse_structured_traceback(repr: &StructuredRepr, source_file: Option<&Path>) -> StructuredTraceback {
    let mut parsed = StructuredTraceback {
        stack_trace: entry_locations(repr),
        ..StructuredTraceback::default()
    };
    let Some(crash) = repr.reprcrash.as_ref() else {
        return parsed;
    };
    if !crash.path.is_empty() && crash.lineno != 0 {
        let location = format_location(&crash.path, crash.lineno);
        if crash.path.contains("test_") {
            parsed.test_location = Some(location);
        } else if source_file.is_some_and(|source| is_source_frame(&crash.path, source)) {
            parsed.error_location = Some(location);
        }
    }
    (parsed.error_type, parsed.error_message) = split_error_message(&crash.message);
    parsed
}
