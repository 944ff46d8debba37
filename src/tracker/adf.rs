//! Atlassian Document Format to plain text
//!
//! Top-level blocks are separated by a blank line, list items by a newline,
//! so section markers such as "Acceptance criteria" end at the next block.

use serde_json::Value;

pub(crate) fn to_text(doc: &Value) -> String {
    match doc {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Object(_) => children(doc)
            .iter()
            .map(block_text)
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n"),
        _ => String::new(),
    }
}

fn children(node: &Value) -> Vec<Value> {
    node.get("content")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn node_type(node: &Value) -> &str {
    node.get("type").and_then(Value::as_str).unwrap_or("")
}

fn block_text(node: &Value) -> String {
    match node_type(node) {
        "text" => node
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        "hardBreak" => "\n".to_string(),
        "paragraph" | "heading" => children(node).iter().map(block_text).collect(),
        "bulletList" | "orderedList" => children(node)
            .iter()
            .map(|item| format!("- {}", block_text(item).trim()))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => children(node)
            .iter()
            .map(block_text)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
