use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ExecExamError;

/// Batch output of one pytest run, in the pytest-json-report layout.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RunReport {
    #[serde(default)]
    pub root: PathBuf,
    #[serde(default)]
    pub exitcode: Option<i32>,
    #[serde(default)]
    pub summary: IndexMap<String, u64>,
    #[serde(default)]
    pub tests: Vec<TestResult>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TestResult {
    pub nodeid: String,
    pub outcome: Outcome,
    #[serde(default)]
    pub call: Option<CallRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed,
    Error,
    Skipped,
    Xfailed,
    Xpassed,
    #[serde(other)]
    Other,
}

impl Outcome {
    pub fn is_failure(self) -> bool {
        matches!(self, Outcome::Failed | Outcome::Error)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CallRecord {
    #[serde(default)]
    pub crash: Option<CrashRecord>,
    #[serde(default)]
    pub longrepr: Option<LongRepr>,
    #[serde(default)]
    pub log: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CrashRecord {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub lineno: u64,
    #[serde(default)]
    pub message: String,
}

/// The two serialized shapes pytest uses for a failure representation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LongRepr {
    Flat(String),
    Structured(StructuredRepr),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StructuredRepr {
    #[serde(default)]
    pub reprcrash: Option<CrashRecord>,
    #[serde(default)]
    pub reprtraceback: Option<ReprTraceback>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReprTraceback {
    #[serde(default)]
    pub reprentries: Vec<ReprEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ReprEntry {
    Located(LocatedEntry),
    Opaque(serde_json::Value),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LocatedEntry {
    #[serde(default)]
    pub reprfileloc: Option<ReprFileLoc>,
    #[serde(default)]
    pub data: Option<LocatedEntryData>,
}

/// pytest's `_to_json` wraps entry fields as `{"type": ..., "data": {...}}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LocatedEntryData {
    #[serde(default)]
    pub reprfileloc: Option<ReprFileLoc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReprFileLoc {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub lineno: u64,
    #[serde(default)]
    pub message: Option<String>,
}

impl ReprEntry {
    pub fn file_location(&self) -> Option<&ReprFileLoc> {
        match self {
            ReprEntry::Located(entry) => entry
                .reprfileloc
                .as_ref()
                .or_else(|| entry.data.as_ref().and_then(|d| d.reprfileloc.as_ref())),
            ReprEntry::Opaque(_) => None,
        }
    }
}

impl StructuredRepr {
    pub fn entries(&self) -> &[ReprEntry] {
        self.reprtraceback
            .as_ref()
            .map(|t| t.reprentries.as_slice())
            .unwrap_or(&[])
    }
}

impl CallRecord {
    /// Renders `call.log` as text; pytest-json-report stores it as a list of records.
    pub fn log_text(&self) -> Option<String> {
        match self.log.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Array(items) if items.is_empty() => None,
            other => serde_json::to_string_pretty(other).ok(),
        }
    }
}

/// Splits a `file::[class::]name[params]` node identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeId<'a> {
    pub file: &'a str,
    pub name: &'a str,
}

impl<'a> NodeId<'a> {
    pub fn parse(raw: &'a str) -> Self {
        let file = raw.split("::").next().unwrap_or(raw);
        let name = raw.split("::").last().unwrap_or(raw);
        Self { file, name }
    }

    /// Test function name without a parametrization suffix.
    pub fn function_name(&self) -> &'a str {
        self.name.split('[').next().unwrap_or(self.name)
    }
}

pub fn test_file_path(root: &Path, node_id: &str) -> PathBuf {
    root.join(NodeId::parse(node_id).file)
}

pub fn load_run_report(path: &Path) -> Result<RunReport, ExecExamError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ExecExamError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_run_report(&raw).map_err(|message| ExecExamError::ReportParse {
        path: path.to_path_buf(),
        message,
    })
}

pub fn parse_run_report(raw: &str) -> Result<RunReport, String> {
    serde_json::from_str::<RunReport>(raw).map_err(|err| err.to_string())
}
