//! Lenient readers for command and plugin-parameter JSON.
//!
//! Host editors store nested structures as JSON-encoded strings and numbers as
//! strings, so every reader here accepts both forms.

use std::borrow::Cow;

use serde_json::Value;

/// Resolves a value that may be a JSON document stored in a string.
pub(crate) fn unwrap_nested(value: &Value) -> Cow<'_, Value> {
    match value {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed) => Cow::Owned(parsed),
            Err(_) => Cow::Borrowed(value),
        },
        other => Cow::Borrowed(other),
    }
}

/// Reads a number, accepting numeric strings.
pub(crate) fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Reads a numeric field of an object.
pub(crate) fn field_number(object: &Value, key: &str) -> Option<f64> {
    object.get(key).and_then(number)
}

/// Reads a string field of an object. Missing fields read as empty.
pub(crate) fn field_string(object: &Value, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Reads a list, accepting a JSON-encoded list in a string.
pub(crate) fn list(value: &Value) -> Option<Vec<Value>> {
    match unwrap_nested(value).into_owned() {
        Value::Array(items) => Some(items),
        _ => None,
    }
}
