pub mod args;
pub mod collector;
pub mod config;
pub mod debug;
pub mod diagnostics_trace;
pub mod error;
pub mod events;
pub mod exit_code;
pub mod failing;
pub mod pipeline;
pub mod py_parse;
pub(crate) mod pythonpath;
pub mod report;
pub mod resolve;
pub mod snippet;
pub mod summary;
pub mod text;
pub mod traceback;

#[cfg(test)]
mod config_test;
#[cfg(test)]
mod diagnostics_trace_test;
#[cfg(test)]
mod failing_test;
#[cfg(test)]
mod text_test;
#[cfg(test)]
mod traceback_test;
