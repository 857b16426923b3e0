//! Static scanning of Python sources: no code is imported or executed.

mod calls;
mod defs;
mod imports;
mod literal;
mod tree;

use std::path::Path;

pub use self::defs::FunctionSpan;
pub use self::imports::ImportSpec;
pub use self::literal::PyLiteral;

pub fn find_function_span(source: &str, function: &str) -> Option<FunctionSpan> {
    defs::find_function_span(source, function)
}

pub fn defines_function(source: &str, function: &str) -> bool {
    defs::find_function_span(source, function).is_some()
}

pub fn file_defines_function(path: &Path, function: &str) -> bool {
    std::fs::read_to_string(path)
        .ok()
        .is_some_and(|source| defines_function(&source, function))
}

/// Ordered, de-duplicated names of every call made inside `function`'s body.
pub fn called_functions(source: &str, function: &str) -> Option<Vec<String>> {
    calls::called_functions(source, function)
}

pub fn extract_import_specs_from_source(source: &str) -> Vec<ImportSpec> {
    imports::extract_import_specs_from_source(source)
}

pub fn evaluate_literal(text: &str) -> Option<PyLiteral> {
    literal::evaluate_literal(text)
}
