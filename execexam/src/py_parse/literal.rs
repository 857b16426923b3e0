//! Literal-only evaluation of assertion operands.
//!
//! Operands come from student-facing failure text, so only constant syntax is accepted:
//! numbers, strings, `True`/`False`/`None`, unary signs and the builtin containers.

use std::fmt;

use serde::{Serialize, Serializer};
use tree_sitter::Node;

use super::tree::{named_children, node_text, parse_python};

#[derive(Debug, Clone, PartialEq)]
pub enum PyLiteral {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<PyLiteral>),
    Tuple(Vec<PyLiteral>),
    Set(Vec<PyLiteral>),
    Dict(Vec<(PyLiteral, PyLiteral)>),
}

pub(super) fn evaluate_literal(text: &str) -> Option<PyLiteral> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let tree = parse_python(text)?;
    let root = tree.root_node();
    if root.has_error() {
        return None;
    }
    let [statement] = named_children(root)[..] else {
        return None;
    };
    if statement.kind() != "expression_statement" {
        return None;
    }
    let values = named_children(statement);
    let bare_tuple = values.len() > 1 || has_comma_token(statement);
    let evaluated = values
        .into_iter()
        .map(|node| eval_node(node, text))
        .collect::<Option<Vec<_>>>()?;
    if bare_tuple {
        return Some(PyLiteral::Tuple(evaluated));
    }
    evaluated.into_iter().next()
}

fn has_comma_token(node: Node<'_>) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == ",");
    found
}

fn eval_node(node: Node<'_>, source: &str) -> Option<PyLiteral> {
    match node.kind() {
        "integer" => parse_int(node_text(node, source)).map(PyLiteral::Int),
        "float" => parse_float(node_text(node, source)).map(PyLiteral::Float),
        "true" => Some(PyLiteral::Bool(true)),
        "false" => Some(PyLiteral::Bool(false)),
        "none" => Some(PyLiteral::None),
        "string" => decode_string(node_text(node, source)).map(PyLiteral::Str),
        "concatenated_string" => named_children(node)
            .into_iter()
            .map(|part| decode_string(node_text(part, source)))
            .collect::<Option<Vec<_>>>()
            .map(|parts| PyLiteral::Str(parts.concat())),
        "unary_operator" => eval_unary(node, source),
        "parenthesized_expression" => match named_children(node)[..] {
            [inner] => eval_node(inner, source),
            _ => None,
        },
        "tuple" => eval_all(node, source).map(PyLiteral::Tuple),
        "list" => eval_all(node, source).map(PyLiteral::List),
        "set" => eval_all(node, source).map(PyLiteral::Set),
        "dictionary" => named_children(node)
            .into_iter()
            .map(|pair| eval_pair(pair, source))
            .collect::<Option<Vec<_>>>()
            .map(PyLiteral::Dict),
        _ => None,
    }
}

fn eval_all(node: Node<'_>, source: &str) -> Option<Vec<PyLiteral>> {
    named_children(node)
        .into_iter()
        .map(|child| eval_node(child, source))
        .collect()
}

fn eval_pair(pair: Node<'_>, source: &str) -> Option<(PyLiteral, PyLiteral)> {
    if pair.kind() != "pair" {
        return None;
    }
    let key = eval_node(pair.child_by_field_name("key")?, source)?;
    let value = eval_node(pair.child_by_field_name("value")?, source)?;
    Some((key, value))
}

fn eval_unary(node: Node<'_>, source: &str) -> Option<PyLiteral> {
    let operator = node_text(node.child_by_field_name("operator")?, source);
    let argument = eval_node(node.child_by_field_name("argument")?, source)?;
    match (operator, argument) {
        ("+", value @ (PyLiteral::Int(_) | PyLiteral::Float(_))) => Some(value),
        ("-", PyLiteral::Int(v)) => v.checked_neg().map(PyLiteral::Int),
        ("-", PyLiteral::Float(v)) => Some(PyLiteral::Float(-v)),
        _ => None,
    }
}

fn parse_int(raw: &str) -> Option<i64> {
    let cleaned = raw.replace('_', "").to_ascii_lowercase();
    if cleaned.ends_with('j') || cleaned.ends_with('l') {
        return None;
    }
    let radix_digits = [("0x", 16), ("0o", 8), ("0b", 2)]
        .into_iter()
        .find_map(|(prefix, radix)| cleaned.strip_prefix(prefix).map(|d| (d, radix)));
    match radix_digits {
        Some((digits, radix)) => i64::from_str_radix(digits, radix).ok(),
        None => cleaned.parse::<i64>().ok(),
    }
}

fn parse_float(raw: &str) -> Option<f64> {
    let cleaned = raw.replace('_', "");
    if cleaned.ends_with(['j', 'J']) {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

fn decode_string(raw: &str) -> Option<String> {
    let prefix_len = raw
        .find(|c: char| c == '\'' || c == '"')
        .filter(|&i| raw[..i].chars().all(|c| "rRuUbBfF".contains(c)))?;
    let prefix = raw[..prefix_len].to_ascii_lowercase();
    // Bytes and f-strings have no plain string value.
    if prefix.contains('b') || prefix.contains('f') {
        return None;
    }
    let quoted = &raw[prefix_len..];
    let quote = ["\"\"\"", "'''", "\"", "'"]
        .into_iter()
        .find(|q| quoted.starts_with(q))?;
    if quoted.len() < quote.len() * 2 || !quoted.ends_with(quote) {
        return None;
    }
    let body = &quoted[quote.len()..quoted.len() - quote.len()];
    if prefix.contains('r') {
        Some(body.to_string())
    } else {
        Some(unescape_python_string(body))
    }
}

fn unescape_python_string(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{7}'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits = (0..width).filter_map(|_| chars.next()).collect::<String>();
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if digits.len() == width => out.push(decoded),
                    _ => {
                        out.push('\\');
                        out.push(next);
                        out.push_str(&digits);
                    }
                }
            }
            '0'..='7' => {
                let mut digits = String::from(next);
                while digits.len() < 3 && chars.peek().is_some_and(|d| ('0'..='7').contains(d)) {
                    digits.extend(chars.next());
                }
                match u32::from_str_radix(&digits, 8).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('\\');
                        out.push_str(&digits);
                    }
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

fn write_seq(f: &mut fmt::Formatter<'_>, items: &[PyLiteral]) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_str_repr(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    f.write_str(&out)
}

fn write_float_repr(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        return f.write_str("nan");
    }
    if value.is_infinite() {
        return f.write_str(if value > 0.0 { "inf" } else { "-inf" });
    }
    // Shortest round-trip digits; Python switches to exponent form outside 1e-4..1e16.
    let scientific = format!("{value:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return f.write_str(&scientific);
    };
    let exponent = exponent.parse::<i32>().unwrap_or(0);
    if !(-4..16).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        return write!(f, "{mantissa}e{sign}{:02}", exponent.unsigned_abs());
    }
    let fixed = value.to_string();
    if fixed.contains('.') {
        f.write_str(&fixed)
    } else {
        write!(f, "{fixed}.0")
    }
}

/// Python `repr` of the value.
impl fmt::Display for PyLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PyLiteral::None => f.write_str("None"),
            PyLiteral::Bool(true) => f.write_str("True"),
            PyLiteral::Bool(false) => f.write_str("False"),
            PyLiteral::Int(v) => write!(f, "{v}"),
            PyLiteral::Float(v) => write_float_repr(f, *v),
            PyLiteral::Str(s) => write_str_repr(f, s),
            PyLiteral::List(items) => {
                f.write_str("[")?;
                write_seq(f, items)?;
                f.write_str("]")
            }
            PyLiteral::Tuple(items) => {
                f.write_str("(")?;
                write_seq(f, items)?;
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            PyLiteral::Set(items) if items.is_empty() => f.write_str("set()"),
            PyLiteral::Set(items) => {
                f.write_str("{")?;
                write_seq(f, items)?;
                f.write_str("}")
            }
            PyLiteral::Dict(pairs) => {
                f.write_str("{")?;
                for (index, (key, value)) in pairs.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl Serialize for PyLiteral {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
