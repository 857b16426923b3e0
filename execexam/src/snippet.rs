use std::path::Path;

use crate::error::ExecExamError;
use crate::py_parse;
use crate::traceback::TracebackInfo;

fn function_not_found(path: &Path, function: &str) -> ExecExamError {
    ExecExamError::FunctionNotFound {
        path: path.display().to_string(),
        function: function.to_string(),
    }
}

/// Source text of `function`'s definition in `source_file`, indentation kept.
pub fn extract_function_source(source_file: &Path, function: &str) -> Result<String, ExecExamError> {
    let lines = definition_lines(source_file, function)?;
    Ok(lines.join("\n"))
}

/// Lines of `function`'s definition, each trimmed.
pub fn extract_function_lines(source_file: &Path, function: &str) -> Result<Vec<String>, ExecExamError> {
    Ok(definition_lines(source_file, function)?
        .into_iter()
        .map(|line| line.trim().to_string())
        .collect())
}

fn definition_lines(source_file: &Path, function: &str) -> Result<Vec<String>, ExecExamError> {
    if function.is_empty() || source_file.as_os_str().is_empty() {
        return Err(function_not_found(source_file, function));
    }
    let source = std::fs::read_to_string(source_file)
        .map_err(|_| function_not_found(source_file, function))?;
    let span = py_parse::find_function_span(&source, function)
        .ok_or_else(|| function_not_found(source_file, function))?;
    Ok(source
        .lines()
        .skip(span.start_line)
        .take(span.end_line + 1 - span.start_line)
        .map(str::to_string)
        .collect())
}

/// One snippet per traceback record; records without an attributed function or file
/// yield an error entry.
pub fn extract_function_code_from_tracebacks(
    tracebacks: &[TracebackInfo],
) -> Vec<Result<Vec<String>, ExecExamError>> {
    tracebacks
        .iter()
        .map(|info| match (&info.source_file, &info.tested_function) {
            (Some(source_file), Some(function)) => extract_function_lines(source_file, function),
            (source_file, function) => Err(ExecExamError::FunctionNotFound {
                path: source_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
                function: function.clone().unwrap_or_default(),
            }),
        })
        .collect()
}
