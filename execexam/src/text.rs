use std::path::{Component, Path, PathBuf};

use aho_corasick::AhoCorasick;
use path_slash::PathExt;

pub const ELLIPSIS_MARKER: &str = " ...";

pub const DEFAULT_CONSOLE_LABELS: [&str; 4] = ["FAILED", "ERROR", "WARNING", "COLLECTERROR"];

pub const DEFAULT_PATH_LEVELS: usize = 4;

/// Collapses multi-line diagnostic text to its first line plus an ellipsis marker.
pub fn single_line(text: &str) -> String {
    match text.split_once('\n') {
        Some((first, _)) => format!("{}{ELLIPSIS_MARKER}", first.trim_end()),
        None => text.to_string(),
    }
}

pub fn strip_ansi_simple(text: &str) -> String {
    String::from_utf8_lossy(&strip_ansi_escapes::strip(text.as_bytes())).to_string()
}

pub fn filter_output_by_label(label: &str, output: &str) -> String {
    filter_output_by_labels(&[label], output)
}

/// Keeps the console lines mentioning any of `labels`, each terminated by a newline.
pub fn filter_output_by_labels<S: AsRef<str>>(labels: &[S], output: &str) -> String {
    let patterns = labels
        .iter()
        .map(|l| l.as_ref())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>();
    if patterns.is_empty() {
        return String::new();
    }
    let Ok(matcher) = AhoCorasick::new(&patterns) else {
        return String::new();
    };
    output
        .lines()
        .filter(|line| matcher.is_match(&strip_ansi_simple(line)))
        .fold(String::new(), |mut acc, line| {
            acc.push_str(line);
            acc.push('\n');
            acc
        })
}

/// Renders `path` with at most `levels` trailing components, eliding the rest as `<...>`.
pub fn elide_path(path: &Path, levels: usize) -> String {
    let parts = path.components().collect::<Vec<_>>();
    if parts.len().saturating_sub(1) <= levels {
        return path.to_slash_lossy().to_string();
    }
    let tail = parts[parts.len() - levels..]
        .iter()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            Component::ParentDir => Some("..".to_string()),
            Component::CurDir => Some(".".to_string()),
            _ => None,
        })
        .collect::<PathBuf>();
    format!("<...>/{}", tail.to_slash_lossy())
}
