use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::ExecExamError;
use crate::resolve::{DEFAULT_FRAMEWORK_MODULES, DEFAULT_HELPER_PREFIXES};
use crate::text::{DEFAULT_CONSOLE_LABELS, DEFAULT_PATH_LEVELS};

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExecExamConfig {
    pub framework_modules: Option<Vec<String>>,
    pub helper_prefixes: Option<Vec<String>>,
    pub source_roots: Option<Vec<String>>,
    pub path_levels: Option<usize>,
    pub console_labels: Option<Vec<String>>,
    pub verbose: Option<bool>,
}

/// Resolved knobs for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractSettings {
    pub framework_modules: Vec<String>,
    pub helper_prefixes: Vec<String>,
    pub source_roots: Vec<PathBuf>,
    pub path_levels: usize,
    pub console_labels: Vec<String>,
    pub verbose: bool,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            framework_modules: owned(&DEFAULT_FRAMEWORK_MODULES),
            helper_prefixes: owned(&DEFAULT_HELPER_PREFIXES),
            source_roots: vec![],
            path_levels: DEFAULT_PATH_LEVELS,
            console_labels: owned(&DEFAULT_CONSOLE_LABELS),
            verbose: false,
        }
    }
}

impl ExtractSettings {
    pub fn from_config(config: &ExecExamConfig) -> Self {
        let defaults = Self::default();
        Self {
            framework_modules: config
                .framework_modules
                .clone()
                .unwrap_or(defaults.framework_modules),
            helper_prefixes: config
                .helper_prefixes
                .clone()
                .unwrap_or(defaults.helper_prefixes),
            source_roots: config
                .source_roots
                .iter()
                .flatten()
                .map(PathBuf::from)
                .collect(),
            path_levels: config.path_levels.unwrap_or(defaults.path_levels),
            console_labels: config
                .console_labels
                .clone()
                .unwrap_or(defaults.console_labels),
            verbose: config.verbose.unwrap_or(defaults.verbose),
        }
    }
}

pub fn find_repo_root(start: &Path) -> PathBuf {
    git2::Repository::discover(start)
        .ok()
        .and_then(|repo| repo.workdir().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| start.to_path_buf())
}

pub fn discover_config_path(repo_root: &Path) -> Option<PathBuf> {
    let names = [
        "execexam.toml",
        "execexam.config.json",
        "execexam.config.json5",
        "execexam.config.jsonc",
        "execexam.config.yaml",
        "execexam.config.yml",
        ".execexamrc",
        ".execexamrc.json",
        ".execexamrc.json5",
        ".execexamrc.jsonc",
        ".execexamrc.yaml",
        ".execexamrc.yml",
    ];
    names
        .into_iter()
        .map(|name| repo_root.join(name))
        .find(|p| p.exists())
}

pub fn load_execexam_config(repo_root: &Path) -> Result<ExecExamConfig, ExecExamError> {
    if let Some(path) = discover_config_path(repo_root) {
        return load_execexam_config_from_path(&path);
    }
    let pyproject_path = repo_root.join("pyproject.toml");
    if pyproject_path.exists()
        && let Some(config) = load_toml_config(&pyproject_path, TomlConfigSource::PyProjectToolExecExam)?
    {
        return Ok(config);
    }
    Ok(ExecExamConfig::default())
}

pub fn load_execexam_config_from_path(path: &Path) -> Result<ExecExamConfig, ExecExamError> {
    let ext = path
        .extension()
        .and_then(|x| x.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        // Bare `.execexamrc` is JSON5, which also covers plain JSON.
        "json" | "json5" | "jsonc" | "" => load_json_config(path),
        "yaml" | "yml" => load_yaml_config(path),
        "toml" => load_toml_config(path, TomlConfigSource::FullFile).map(|v| v.unwrap_or_default()),
        _ => Ok(ExecExamConfig::default()),
    }
}

fn read_config_text(path: &Path) -> Result<String, ExecExamError> {
    std::fs::read_to_string(path).map_err(|source| ExecExamError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn config_parse_error(path: &Path, err: impl ToString) -> ExecExamError {
    ExecExamError::ConfigParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn load_json_config(path: &Path) -> Result<ExecExamConfig, ExecExamError> {
    let raw = read_config_text(path)?;
    if raw.trim().is_empty() {
        return Ok(ExecExamConfig::default());
    }
    json5::from_str::<ExecExamConfig>(&raw)
        .or_else(|_| serde_json::from_str::<ExecExamConfig>(&raw))
        .map_err(|err| config_parse_error(path, err))
}

fn load_yaml_config(path: &Path) -> Result<ExecExamConfig, ExecExamError> {
    let raw = read_config_text(path)?;
    serde_yaml::from_str::<Option<ExecExamConfig>>(&raw)
        .map(Option::unwrap_or_default)
        .map_err(|err| config_parse_error(path, err))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TomlConfigSource {
    FullFile,
    PyProjectToolExecExam,
}

fn load_toml_config(
    path: &Path,
    source: TomlConfigSource,
) -> Result<Option<ExecExamConfig>, ExecExamError> {
    let raw = read_config_text(path)?;
    let toml_value = toml::from_str::<toml::Value>(&raw).map_err(|err| config_parse_error(path, err))?;

    let maybe_table_value = match source {
        TomlConfigSource::FullFile => Some(toml_value),
        TomlConfigSource::PyProjectToolExecExam => toml_value
            .get("tool")
            .and_then(|tool| tool.get("execexam"))
            .cloned(),
    };
    let Some(table_value) = maybe_table_value else {
        return Ok(None);
    };

    let json_value = serde_json::to_value(table_value).map_err(|err| config_parse_error(path, err))?;
    serde_json::from_value::<ExecExamConfig>(normalize_keys_to_camel_case(&json_value))
        .map(Some)
        .map_err(|err| config_parse_error(path, err))
}

fn normalize_keys_to_camel_case(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(object) => JsonValue::Object(
            object
                .iter()
                .map(|(key, value)| (camel_case_key(key), normalize_keys_to_camel_case(value)))
                .collect(),
        ),
        JsonValue::Array(array) => {
            JsonValue::Array(array.iter().map(normalize_keys_to_camel_case).collect())
        }
        other => other.clone(),
    }
}

/// `path_levels` and `path-levels` both become `pathLevels`.
fn camel_case_key(key: &str) -> String {
    let mut segments = key.split(['_', '-']).filter(|segment| !segment.is_empty());
    let Some(first) = segments.next() else {
        return key.to_string();
    };
    segments.fold(first.to_string(), |mut out, segment| {
        let mut chars = segment.chars();
        if let Some(c) = chars.next() {
            out.push(c.to_ascii_uppercase());
            out.extend(chars);
        }
        out
    })
}
