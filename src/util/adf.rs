use serde_json::Value;

/// Node types whose children flow inline, e.g. the text runs of a paragraph.
const INLINE_PARENTS: &[&str] = &["paragraph", "heading", "codeBlock"];

/// Flatten a Jira description to plain text.
///
/// Accepts either a legacy plain string or an Atlassian Document Format
/// tree. Block nodes end up on their own lines; text runs inside a
/// paragraph are concatenated as written.
pub fn extract_text_from_adf(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) => {
            let mut lines = Vec::new();
            collect_blocks(value, &mut lines);
            lines.join("\n")
        }
        _ => return None,
    };
    let text = text.trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn collect_blocks(value: &Value, lines: &mut Vec<String>) {
    match value {
        Value::Array(nodes) => nodes.iter().for_each(|n| collect_blocks(n, lines)),
        Value::Object(obj) => {
            let node_type = obj.get("type").and_then(Value::as_str).unwrap_or_default();
            if node_type == "text" || INLINE_PARENTS.contains(&node_type) {
                let mut line = String::new();
                collect_inline(value, &mut line);
                lines.push(line);
            } else if let Some(content) = obj.get("content") {
                collect_blocks(content, lines);
            }
        }
        _ => {}
    }
}

fn collect_inline(value: &Value, line: &mut String) {
    match value {
        Value::Array(nodes) => nodes.iter().for_each(|n| collect_inline(n, line)),
        Value::Object(obj) => match obj.get("type").and_then(Value::as_str) {
            Some("text") => {
                if let Some(text) = obj.get("text").and_then(Value::as_str) {
                    line.push_str(text);
                }
            }
            Some("hardBreak") => line.push('\n'),
            _ => {
                if let Some(content) = obj.get("content") {
                    collect_inline(content, line);
                }
            }
        },
        _ => {}
    }
}
