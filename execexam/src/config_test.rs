use std::path::{Path, PathBuf};

use crate::config::{
    ExecExamConfig, ExtractSettings, discover_config_path, find_repo_root, load_execexam_config,
    load_execexam_config_from_path,
};
use crate::error::ExecExamError;

fn write_text_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create_dir_all");
    }
    std::fs::write(path, contents).expect("write");
}

#[test]
fn missing_config_is_default() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert_eq!(discover_config_path(dir.path()), None);
    assert_eq!(
        load_execexam_config(dir.path()).unwrap(),
        ExecExamConfig::default()
    );
}

#[test]
fn toml_config_is_discovered_first() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_text_file(
        &dir.path().join("execexam.toml"),
        "pathLevels = 2\nframeworkModules = [\"pytest\", \"hypothesis\", \"mock\"]\n",
    );
    write_text_file(&dir.path().join(".execexamrc"), "{ verbose: true }");

    let cfg = load_execexam_config(dir.path()).unwrap();
    assert_eq!(cfg.path_levels, Some(2));
    assert_eq!(
        cfg.framework_modules,
        Some(vec!["pytest".to_string(), "hypothesis".to_string(), "mock".to_string()])
    );
    assert_eq!(cfg.verbose, None);
}

#[test]
fn json5_and_yaml_configs_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let json5_path = dir.path().join("execexam.config.json5");
    write_text_file(&json5_path, "{\n  // comment\n  helperPrefixes: ['assert', 'check_'],\n}\n");
    let yaml_path = dir.path().join("execexam.config.yaml");
    write_text_file(&yaml_path, "consoleLabels:\n  - FAILED\nsourceRoots:\n  - questions\n");

    let from_json5 = load_execexam_config_from_path(&json5_path).unwrap();
    assert_eq!(
        from_json5.helper_prefixes,
        Some(vec!["assert".to_string(), "check_".to_string()])
    );
    let from_yaml = load_execexam_config_from_path(&yaml_path).unwrap();
    assert_eq!(from_yaml.console_labels, Some(vec!["FAILED".to_string()]));
    assert_eq!(from_yaml.source_roots, Some(vec!["questions".to_string()]));
}

#[test]
fn pyproject_tool_section_accepts_snake_case_keys() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_text_file(
        &dir.path().join("pyproject.toml"),
        "[project]\nname = \"exam\"\n\n[tool.execexam]\npath_levels = 3\nsource-roots = [\"src\"]\n",
    );

    let cfg = load_execexam_config(dir.path()).unwrap();
    assert_eq!(cfg.path_levels, Some(3));
    assert_eq!(cfg.source_roots, Some(vec!["src".to_string()]));
}

#[test]
fn pyproject_without_tool_section_is_default() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_text_file(&dir.path().join("pyproject.toml"), "[project]\nname = \"exam\"\n");
    assert_eq!(
        load_execexam_config(dir.path()).unwrap(),
        ExecExamConfig::default()
    );
}

#[test]
fn malformed_config_reports_its_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("execexam.toml");
    write_text_file(&path, "pathLevels = [");

    match load_execexam_config(dir.path()) {
        Err(ExecExamError::ConfigParse { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected ConfigParse, got {other:?}"),
    }
}

#[test]
fn settings_fill_defaults_for_unset_fields() {
    let settings = ExtractSettings::from_config(&ExecExamConfig {
        path_levels: Some(6),
        source_roots: Some(vec!["questions".to_string()]),
        ..ExecExamConfig::default()
    });
    let defaults = ExtractSettings::default();
    assert_eq!(settings.path_levels, 6);
    assert_eq!(settings.source_roots, vec![PathBuf::from("questions")]);
    assert_eq!(settings.framework_modules, defaults.framework_modules);
    assert_eq!(settings.helper_prefixes, vec!["assert".to_string(), "test_".to_string()]);
    assert_eq!(
        settings.console_labels,
        vec!["FAILED", "ERROR", "WARNING", "COLLECTERROR"]
    );
    assert!(!settings.verbose);
}

#[test]
fn repo_root_is_the_git_workdir_above_the_start_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dunce::canonicalize(dir.path()).expect("canonicalize");
    git2::Repository::init(&root).expect("git init");
    let nested = root.join("tests").join("unit");
    std::fs::create_dir_all(&nested).expect("mkdir");

    let found = find_repo_root(&nested);
    assert_eq!(dunce::canonicalize(found).expect("canonicalize"), root);
}

#[test]
fn repo_root_falls_back_to_start_dir_outside_git() {
    let dir = tempfile::tempdir().expect("tempdir");
    let start = dir.path().join("exam");
    std::fs::create_dir_all(&start).expect("mkdir");
    if git2::Repository::discover(&start).is_ok() {
        return;
    }
    assert_eq!(find_repo_root(&start), start);
}
