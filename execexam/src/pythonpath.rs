//! Directories a test file's imports are resolved against, mirroring what pytest puts on
//! `sys.path` for a project.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;

/// Project root first, then package roots declared in `pyproject.toml`, then `src/`.
pub fn python_import_roots(project_root: &Path, configured: &[PathBuf]) -> Vec<PathBuf> {
    let declared = configured
        .iter()
        .map(|dir| resolve_project_relative(project_root, dir))
        .chain(read_pyproject_package_roots(project_root))
        .chain(src_layout_root(project_root))
        .filter(|dir| dir.is_dir());
    std::iter::once(project_root.to_path_buf())
        .chain(declared)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// pytest's `prepend` import mode puts the test file's own directory first.
pub fn search_roots_for_test(test_file: &Path, import_roots: &[PathBuf]) -> Vec<PathBuf> {
    test_file
        .parent()
        .map(Path::to_path_buf)
        .into_iter()
        .chain(import_roots.iter().cloned())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

fn src_layout_root(project_root: &Path) -> Option<PathBuf> {
    let src = project_root.join("src");
    src.is_dir().then_some(src)
}

fn resolve_project_relative(project_root: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        project_root.join(dir)
    }
}

fn read_pyproject_package_roots(project_root: &Path) -> Vec<PathBuf> {
    let Ok(raw) = std::fs::read_to_string(project_root.join("pyproject.toml")) else {
        return vec![];
    };
    let Ok(pyproject) = toml::from_str::<toml::Value>(&raw) else {
        return vec![];
    };
    pyproject_package_dirs(&pyproject)
        .into_iter()
        .map(|dir| resolve_project_relative(project_root, Path::new(&dir)))
        .collect()
}

fn pyproject_package_dirs(pyproject: &toml::Value) -> Vec<String> {
    let tool = pyproject.get("tool");
    let setuptools = tool.and_then(|t| t.get("setuptools"));

    let package_dir = setuptools
        .and_then(|s| s.get("package-dir"))
        .and_then(|v| v.as_table())
        .into_iter()
        .flat_map(|table| table.values())
        .filter_map(|v| v.as_str().map(str::to_string));

    let find_where = setuptools
        .and_then(|s| s.get("packages"))
        .and_then(|p| p.get("find"))
        .and_then(|f| f.get("where"))
        .and_then(|w| w.as_array())
        .into_iter()
        .flatten()
        .filter_map(|v| v.as_str().map(str::to_string));

    let poetry_from = tool
        .and_then(|t| t.get("poetry"))
        .and_then(|p| p.get("packages"))
        .and_then(|pkgs| pkgs.as_array())
        .into_iter()
        .flatten()
        .filter_map(|pkg| pkg.get("from").and_then(|v| v.as_str()).map(str::to_string));

    package_dir.chain(find_where).chain(poetry_from).collect()
}
