use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::py_parse::{self, ImportSpec};
use crate::pythonpath::search_roots_for_test;

static FRAME_HINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"File\s+["']?([^"',]+?)["']?,\s+line\s+(\d+)"#).unwrap());

pub const DEFAULT_FRAMEWORK_MODULES: [&str; 3] = ["pytest", "unittest", "hypothesis"];

const SKIPPED_FRAME_MARKERS: [&str; 3] = ["__pycache__", "site-packages", ".pytest"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStrategy {
    TestFileImports,
    TracebackFrames,
}

impl SourceStrategy {
    pub fn describe(self) -> &'static str {
        match self {
            SourceStrategy::TestFileImports => "Found in test file imports",
            SourceStrategy::TracebackFrames => "Found in traceback frames",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedSource {
    pub path: PathBuf,
    pub strategy: SourceStrategy,
    /// Frame line inside `path`, known only for the traceback-frames strategy.
    pub line: Option<u64>,
}

/// `File <path>, line <n>` location taken from a traceback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHint {
    pub path: String,
    pub line: u64,
}

pub fn parse_frame_hint(line: &str) -> Option<FrameHint> {
    let caps = FRAME_HINT_RE.captures(line)?;
    let path = caps.get(1)?.as_str().trim().to_string();
    let line = caps.get(2)?.as_str().parse().ok()?;
    (!path.is_empty()).then_some(FrameHint { path, line })
}

/// Finds the file that defines the function under test.
#[derive(Debug, Clone)]
pub struct SourceFileLocator {
    search_roots: Vec<PathBuf>,
    framework_modules: Vec<String>,
    extension: String,
}

impl SourceFileLocator {
    pub fn new(search_roots: Vec<PathBuf>) -> Self {
        Self {
            search_roots,
            framework_modules: DEFAULT_FRAMEWORK_MODULES
                .iter()
                .map(|m| m.to_string())
                .collect(),
            extension: "py".to_string(),
        }
    }

    pub fn with_framework_modules(mut self, framework_modules: Vec<String>) -> Self {
        self.framework_modules = framework_modules;
        self
    }

    pub fn is_framework_module(&self, spec: &ImportSpec) -> bool {
        spec.level == 0
            && self
                .framework_modules
                .iter()
                .any(|m| m == spec.top_level_name())
    }

    pub fn locate(&self, test_file: &Path, function: &str, frame_hints: &[String]) -> Option<LocatedSource> {
        if function.is_empty() {
            return None;
        }
        self.locate_in_imports(test_file, function)
            .map(|path| LocatedSource {
                path,
                strategy: SourceStrategy::TestFileImports,
                line: None,
            })
            .or_else(|| {
                self.locate_in_frames(test_file, function, frame_hints)
                    .map(|(path, line)| LocatedSource {
                        path,
                        strategy: SourceStrategy::TracebackFrames,
                        line: Some(line),
                    })
            })
    }

    /// Candidate module files for every non-framework import of the test file, in import order.
    pub fn candidate_paths(&self, test_file: &Path, test_source: &str) -> Vec<PathBuf> {
        let roots = search_roots_for_test(test_file, &self.search_roots);
        py_parse::extract_import_specs_from_source(test_source)
            .iter()
            .filter(|spec| !self.is_framework_module(spec))
            .flat_map(|spec| self.import_candidates(test_file, &roots, spec))
            .collect()
    }

    fn locate_in_imports(&self, test_file: &Path, function: &str) -> Option<PathBuf> {
        let test_source = std::fs::read_to_string(test_file).ok()?;
        self.candidate_paths(test_file, &test_source)
            .into_iter()
            .find(|candidate| candidate.is_file() && py_parse::file_defines_function(candidate, function))
    }

    fn import_candidates(&self, test_file: &Path, roots: &[PathBuf], spec: &ImportSpec) -> Vec<PathBuf> {
        let bases = if spec.level > 0 {
            relative_import_base(test_file, spec.level).into_iter().collect::<Vec<_>>()
        } else {
            roots.to_vec()
        };
        let segments = spec
            .module
            .split('.')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();
        bases
            .iter()
            .flat_map(|base| {
                let module_dir = segments.iter().fold(base.clone(), |dir, seg| dir.join(seg));
                let module_files = (!segments.is_empty()).then(|| {
                    [
                        module_dir.with_extension(&self.extension),
                        module_dir.join(format!("__init__.{}", self.extension)),
                    ]
                });
                let submodules = spec
                    .names
                    .iter()
                    .map(|name| module_dir.join(format!("{name}.{}", self.extension)))
                    .collect::<Vec<_>>();
                module_files.into_iter().flatten().chain(submodules)
            })
            .collect()
    }

    fn locate_in_frames(
        &self,
        test_file: &Path,
        function: &str,
        frame_hints: &[String],
    ) -> Option<(PathBuf, u64)> {
        let roots = search_roots_for_test(test_file, &self.search_roots);
        frame_hints
            .iter()
            .filter_map(|line| parse_frame_hint(line))
            .filter(|hint| !is_skipped_frame(&hint.path, test_file))
            .flat_map(|hint| {
                frame_path_candidates(&hint.path, &roots)
                    .into_iter()
                    .map(move |candidate| (candidate, hint.line))
            })
            .find(|(candidate, _)| {
                candidate.is_file() && py_parse::file_defines_function(candidate, function)
            })
    }
}

fn relative_import_base(test_file: &Path, level: usize) -> Option<PathBuf> {
    let mut base = test_file.parent()?.to_path_buf();
    for _ in 1..level {
        base = base.parent()?.to_path_buf();
    }
    Some(base)
}

fn is_test_file_name(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.starts_with("test_") || name.ends_with("_test.py") || name == "conftest.py")
}

fn is_skipped_frame(frame_path: &str, test_file: &Path) -> bool {
    let path = Path::new(frame_path);
    SKIPPED_FRAME_MARKERS.iter().any(|m| frame_path.contains(m))
        || is_test_file_name(path)
        || test_file.ends_with(path)
        || path.ends_with(test_file)
}

fn frame_path_candidates(frame_path: &str, roots: &[PathBuf]) -> Vec<PathBuf> {
    let path = PathBuf::from(frame_path);
    if path.is_absolute() {
        return vec![path];
    }
    std::iter::once(path.clone())
        .chain(roots.iter().map(|root| root.join(&path)))
        .collect()
}
