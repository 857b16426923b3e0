//! Line protocol spoken by the execexam pytest plugin.
//!
//! Each lifecycle callback is printed as `EXECEXAM_EVENT <json>` on the captured
//! console stream; everything else on that stream is ordinary test output.

use serde::Deserialize;

use crate::collector::{ExceptionPayload, TestLifecycleListener};

pub const EVENT_PREFIX: &str = "EXECEXAM_EVENT ";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    TestStart {
        nodeid: String,
    },
    Assertion {
        nodeid: String,
        lineno: u32,
        #[serde(default)]
        orig: String,
        #[serde(default)]
        expl: String,
        passed: bool,
    },
    Exception {
        nodeid: String,
        exc_type: String,
        #[serde(default)]
        exc_text: String,
        #[serde(default)]
        frame_lineno: Option<u32>,
    },
}

pub fn parse_event_line(line: &str) -> Option<Result<LifecycleEvent, serde_json::Error>> {
    let (_prefix, json) = line.split_once(EVENT_PREFIX)?;
    Some(serde_json::from_str::<LifecycleEvent>(json.trim()))
}

pub fn dispatch_event<L: TestLifecycleListener + ?Sized>(listener: &mut L, event: &LifecycleEvent) {
    match event {
        LifecycleEvent::TestStart { nodeid } => listener.on_test_start(nodeid),
        LifecycleEvent::Assertion {
            nodeid,
            lineno,
            orig,
            expl,
            passed,
        } => listener.on_assertion_evaluated(nodeid, *lineno, orig, expl, *passed),
        LifecycleEvent::Exception {
            nodeid,
            exc_type,
            exc_text,
            frame_lineno,
        } => {
            let payload = ExceptionPayload {
                type_name: exc_type.clone(),
                text: exc_text.clone(),
                frame_line: *frame_lineno,
            };
            listener.on_uncaught_exception(nodeid, &payload)
        }
    }
}

/// Splits a captured console stream into lifecycle events and plain output.
#[derive(Debug, Default)]
pub struct EventStreamAdapter {
    verbose: bool,
    console: String,
    dispatched: usize,
    malformed: usize,
}

impl EventStreamAdapter {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            ..Self::default()
        }
    }

    pub fn on_line<L: TestLifecycleListener + ?Sized>(&mut self, listener: &mut L, line: &str) {
        match parse_event_line(line) {
            Some(Ok(event)) => {
                dispatch_event(listener, &event);
                self.dispatched += 1;
            }
            Some(Err(err)) => {
                self.malformed += 1;
                if self.verbose {
                    eprintln!("execexam: ignoring malformed event line: {err}");
                }
            }
            None => {
                self.console.push_str(line);
                self.console.push('\n');
            }
        }
    }

    pub fn consume<L: TestLifecycleListener + ?Sized>(&mut self, listener: &mut L, text: &str) {
        text.lines().for_each(|line| self.on_line(listener, line));
    }

    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    pub fn malformed(&self) -> usize {
        self.malformed
    }

    pub fn finish(self) -> String {
        self.console
    }
}
