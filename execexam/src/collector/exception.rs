use crate::text::single_line;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionPayload {
    pub type_name: String,
    pub text: String,
    /// Line of the innermost traceback frame, as reported by the runner.
    pub frame_line: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionDetail {
    pub line: u32,
    pub message: String,
    pub exact: String,
}

fn is_assertion_style(type_name: &str) -> bool {
    type_name.ends_with("AssertionError")
}

pub fn extract_exception_detail(payload: &ExceptionPayload) -> ExceptionDetail {
    // pytest's assertion rewriting surfaces the failure one line past the raising frame.
    let line = payload.frame_line.map(|l| l + 1).unwrap_or(0);
    if !is_assertion_style(&payload.type_name) {
        return ExceptionDetail {
            line,
            message: payload.text.clone(),
            exact: payload.type_name.clone(),
        };
    }
    match payload.text.split_once("assert") {
        Some((before, after)) => {
            let before = before.trim();
            ExceptionDetail {
                line,
                message: if before.is_empty() {
                    payload.type_name.clone()
                } else {
                    before.to_string()
                },
                exact: single_line(after.trim()),
            }
        }
        None => ExceptionDetail {
            line,
            message: if payload.text.trim().is_empty() {
                payload.type_name.clone()
            } else {
                payload.text.clone()
            },
            exact: payload.type_name.clone(),
        },
    }
}
