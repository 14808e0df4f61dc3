//! Text helpers for bounded diagnostic output.

use serde_json::Value;

/// Keep at most `max_chars` characters (not bytes) of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

/// Render a JSON payload as text and bound it. Strings are used as-is,
/// `null` renders empty, everything else is serialized compactly.
pub fn preview_value(value: &Value, max_chars: usize) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => truncate_chars(s, max_chars),
        other => truncate_chars(&other.to_string(), max_chars),
    }
}
