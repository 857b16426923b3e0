//! Per-run record of debugging checkpoints, printed on request at the end of a run.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugMessage {
    ParameterCheckPassed,
    ReportLoaded,
    EventsReplayed,
    ConfigLoaded,
    TracebacksNormalized,
    SnippetsExtracted,
}

impl DebugMessage {
    pub fn text(self) -> &'static str {
        match self {
            DebugMessage::ParameterCheckPassed => "\u{2714} Validity check passed for command-line arguments.",
            DebugMessage::ReportLoaded => "\u{2714} Correctly loaded the test run report.",
            DebugMessage::EventsReplayed => "\u{2714} Correctly replayed the assertion event stream.",
            DebugMessage::ConfigLoaded => "\u{2714} Correctly loaded the configuration.",
            DebugMessage::TracebacksNormalized => "\u{2714} Correctly normalized failure tracebacks.",
            DebugMessage::SnippetsExtracted => "\u{2714} Correctly extracted function snippets.",
        }
    }
}

/// Messages are only kept when the log was created enabled.
#[derive(Debug, Clone, Default)]
pub struct DebugLog {
    enabled: bool,
    messages: Vec<String>,
}

impl DebugLog {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            messages: vec![],
        }
    }

    pub fn record(&mut self, message: DebugMessage) {
        self.record_text(message.text());
    }

    pub fn record_text(&mut self, message: &str) {
        if self.enabled {
            self.messages.push(message.to_string());
        }
    }

    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Newline-framed block of every message, or `""` when nothing was recorded.
    pub fn render(&self) -> String {
        if self.messages.is_empty() {
            return String::new();
        }
        format!("\n{}\n", self.messages.join("\n"))
    }
}
