//! Dynamically typed JSON used for forward-compatible passthrough fields.
//!
//! `serde_json` is built with `preserve_order`, so object keys keep their
//! insertion order and integers and floats stay distinct number kinds.

use crate::{ResponsesError, ResponsesResult};
pub use serde_json::Value as AnyValue;

/// Ordered string-keyed map of [`AnyValue`].
pub type AnyMap = serde_json::Map<String, AnyValue>;

/// Serializes a value to compact JSON text.
#[must_use]
pub fn to_json_string(value: &AnyValue) -> String {
    // Display for Value is infallible compact JSON.
    value.to_string()
}

/// Parses JSON text. Blank input parses to an empty object, which is what
/// providers send for a function call without arguments.
pub fn parse_json_string(text: &str) -> ResponsesResult<AnyValue> {
    if text.trim().is_empty() {
        return Ok(AnyValue::Object(AnyMap::new()));
    }
    serde_json::from_str(text)
        .map_err(|e| ResponsesError::decode(format!("Invalid JSON string {text:?}: {e}")))
}

#[must_use]
pub fn string_at<'a>(map: &'a AnyMap, key: &str) -> Option<&'a str> {
    map.get(key).and_then(AnyValue::as_str)
}

#[must_use]
pub fn u64_at(map: &AnyMap, key: &str) -> Option<u64> {
    map.get(key).and_then(AnyValue::as_u64)
}

#[must_use]
pub fn object_at<'a>(map: &'a AnyMap, key: &str) -> Option<&'a AnyMap> {
    map.get(key).and_then(AnyValue::as_object)
}

#[must_use]
pub fn array_at<'a>(map: &'a AnyMap, key: &str) -> Option<&'a Vec<AnyValue>> {
    map.get(key).and_then(AnyValue::as_array)
}

/// Extracts text from either a bare string or an object carrying `text`,
/// `delta` or `content`.
#[must_use]
pub fn text_of(value: &AnyValue) -> Option<&str> {
    match value {
        AnyValue::String(text) => Some(text),
        AnyValue::Object(map) => ["text", "delta", "content"]
            .iter()
            .find_map(|key| string_at(map, key)),
        _ => None,
    }
}

/// Requires the value to be a JSON object.
pub fn expect_object(value: AnyValue, what: &str) -> ResponsesResult<AnyMap> {
    match value {
        AnyValue::Object(map) => Ok(map),
        other => Err(ResponsesError::decode(format!(
            "Expected {what} to be an object, got {}",
            kind_name(&other)
        ))),
    }
}

/// Short name of the JSON kind, used in error messages.
#[must_use]
pub fn kind_name(value: &AnyValue) -> &'static str {
    match value {
        AnyValue::Null => "null",
        AnyValue::Bool(_) => "boolean",
        AnyValue::Number(n) if n.is_f64() => "number",
        AnyValue::Number(_) => "integer",
        AnyValue::String(_) => "string",
        AnyValue::Array(_) => "array",
        AnyValue::Object(_) => "object",
    }
}
