use indexmap::IndexSet;
use tree_sitter::Node;

use super::tree::{find_function_node, named_children, node_text, parse_python};

pub(super) fn called_functions(source: &str, function: &str) -> Option<Vec<String>> {
    let tree = parse_python(source)?;
    let def = find_function_node(tree.root_node(), source, function)?;
    let body = def.child_by_field_name("body")?;
    let mut names: IndexSet<String> = IndexSet::new();
    collect_calls(body, source, &mut names);
    Some(names.into_iter().collect())
}

fn collect_calls(node: Node<'_>, source: &str, names: &mut IndexSet<String>) {
    if node.kind() == "call"
        && let Some(name) = node
            .child_by_field_name("function")
            .and_then(|callee| callee_name(callee, source))
    {
        names.insert(name.to_string());
    }
    named_children(node)
        .into_iter()
        .for_each(|child| collect_calls(child, source, names));
}

fn callee_name<'s>(callee: Node<'_>, source: &'s str) -> Option<&'s str> {
    match callee.kind() {
        "identifier" => Some(node_text(callee, source)),
        "attribute" => callee
            .child_by_field_name("attribute")
            .map(|attr| node_text(attr, source)),
        _ => None,
    }
    .filter(|name| !name.is_empty())
}
