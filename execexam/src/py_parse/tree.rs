use std::collections::VecDeque;

use tree_sitter::{Node, Parser, Tree};

pub(super) fn parse_python(source: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .ok()?;
    parser.parse(source, None)
}

pub(super) fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

pub(super) fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// Breadth-first search for a `def` named `name`, so outer definitions win over nested ones.
pub(super) fn find_function_node<'t>(root: Node<'t>, source: &str, name: &str) -> Option<Node<'t>> {
    let mut queue: VecDeque<Node<'t>> = VecDeque::from([root]);
    while let Some(node) = queue.pop_front() {
        if node.kind() == "function_definition"
            && node
                .child_by_field_name("name")
                .is_some_and(|n| node_text(n, source) == name)
        {
            return Some(node);
        }
        queue.extend(named_children(node));
    }
    None
}
