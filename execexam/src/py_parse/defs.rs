use serde::Serialize;

use super::tree::{find_function_node, parse_python};

/// Zero-based, inclusive line range of a function definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FunctionSpan {
    pub start_line: usize,
    pub end_line: usize,
}

pub(super) fn find_function_span(source: &str, function: &str) -> Option<FunctionSpan> {
    if function.is_empty() {
        return None;
    }
    let tree = parse_python(source)?;
    let node = find_function_node(tree.root_node(), source, function)?;
    let start = node.start_position();
    let end = node.end_position();
    let end_line = if end.column == 0 && end.row > start.row {
        end.row - 1
    } else {
        end.row
    };
    Some(FunctionSpan {
        start_line: start.row,
        end_line,
    })
}
