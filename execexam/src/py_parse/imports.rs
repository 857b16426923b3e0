use once_cell::sync::Lazy;
use regex::Regex;

static FROM_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*from\s+(\.*)([A-Za-z_][\w.]*)?\s+import\s+(.+?)\s*$").unwrap()
});
static PLAIN_IMPORT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*import\s+(.+?)\s*$").unwrap());

/// One imported module as written in a test file.
///
/// `level` counts the leading dots of a relative import; `names` holds the symbols of a
/// `from ... import` form and is empty for `import a.b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub module: String,
    pub level: usize,
    pub names: Vec<String>,
}

impl ImportSpec {
    pub fn top_level_name(&self) -> &str {
        self.module.split('.').next().unwrap_or("")
    }
}

pub(super) fn extract_import_specs_from_source(source: &str) -> Vec<ImportSpec> {
    source
        .lines()
        .filter(|line| line.contains("import"))
        .flat_map(parse_import_line)
        .collect()
}

fn strip_comment(line: &str) -> &str {
    line.split_once('#').map(|(code, _)| code).unwrap_or(line)
}

fn split_names(raw: &str) -> Vec<String> {
    raw.trim_matches(|c: char| c == '(' || c == ')' || c == '\\' || c.is_whitespace())
        .split(',')
        .map(|item| item.split(" as ").next().unwrap_or(item).trim())
        .map(|item| item.trim_matches(|c: char| c == '(' || c == ')' || c == '\\'))
        .filter(|item| !item.is_empty())
        .map(|item| item.to_string())
        .collect()
}

fn parse_import_line(line: &str) -> Vec<ImportSpec> {
    let code = strip_comment(line);
    if let Some(caps) = FROM_IMPORT_RE.captures(code) {
        let level = caps.get(1).map(|m| m.as_str().len()).unwrap_or(0);
        let module = caps
            .get(2)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        if level == 0 && module.is_empty() {
            return vec![];
        }
        let names = caps
            .get(3)
            .map(|m| split_names(m.as_str()))
            .unwrap_or_default()
            .into_iter()
            .filter(|name| name != "*")
            .collect();
        return vec![ImportSpec {
            module,
            level,
            names,
        }];
    }
    let Some(caps) = PLAIN_IMPORT_RE.captures(code) else {
        return vec![];
    };
    caps.get(1)
        .map(|m| split_names(m.as_str()))
        .unwrap_or_default()
        .into_iter()
        .map(|module| ImportSpec {
            module,
            level: 0,
            names: vec![],
        })
        .collect()
}
