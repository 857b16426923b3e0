use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecExamError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("failed to parse test report at {path}: {message}")]
    ReportParse { path: PathBuf, message: String },

    /// A failing test without `call.crash` means the report plugin dropped data.
    #[error("failing test {node_id} has no crash data in the report")]
    MissingCrashData { node_id: String },

    #[error("function {function:?} not found in {path:?}")]
    FunctionNotFound { path: String, function: String },
}
