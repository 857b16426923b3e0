use super::{AssertionRecord, TestReportEntry};

fn record_fields(record: &AssertionRecord) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("Status", record.status.label().to_string()),
        ("Line", record.line.to_string()),
    ];
    if let Some(code) = &record.code {
        fields.push(("Code", code.clone()));
    }
    if let Some(message) = &record.message {
        fields.push(("Message", message.clone()));
    }
    fields.push(("Exact", record.exact.clone()));
    fields
}

fn render_record(record: &AssertionRecord) -> String {
    record_fields(record)
        .into_iter()
        .enumerate()
        .map(|(index, (key, value))| {
            let lead = if index == 0 { "  - " } else { "    " };
            format!("{lead}{key}: {value}\n")
        })
        .collect()
}

pub fn render_entry(entry: &TestReportEntry) -> String {
    let display_name = entry
        .nodeid
        .rsplit_once('/')
        .map(|(_, tail)| tail)
        .unwrap_or(entry.nodeid.as_str());
    let mut out = format!("\n{display_name}\n");
    entry
        .assertions
        .iter()
        .flatten()
        .for_each(|record| out.push_str(&render_record(record)));
    out
}

pub fn render_assertion_history(entries: &[TestReportEntry]) -> String {
    entries.iter().map(render_entry).collect()
}
