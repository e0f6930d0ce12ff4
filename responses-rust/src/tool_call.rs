//! Function calls emitted by the model and the outputs fed back to it.
use crate::{
    any_value::{parse_json_string, to_json_string},
    AnyValue, ItemStatus, ResponsesResult,
};
use serde::{ser::SerializeMap, Deserialize, Serialize};

/// A JSON document carried on the wire as a JSON-encoded string, such as
/// function call `arguments` or a function call `output`.
///
/// It is always written as a string whichever variant holds it. A
/// [`JsonString::Value`] holding a plain string is written as that string
/// unchanged. Two values are equal when their wire strings match or when both
/// parse to the same JSON.
#[derive(Debug, Clone)]
pub enum JsonString {
    Raw(String),
    Value(AnyValue),
}

impl JsonString {
    /// The string written on the wire.
    #[must_use]
    pub fn to_wire_string(&self) -> String {
        match self {
            Self::Raw(raw) => raw.clone(),
            Self::Value(AnyValue::String(text)) => text.clone(),
            Self::Value(value) => to_json_string(value),
        }
    }

    /// The parsed document. Blank raw text parses to an empty object.
    pub fn value(&self) -> ResponsesResult<AnyValue> {
        match self {
            Self::Raw(raw) => parse_json_string(raw),
            Self::Value(value) => Ok(value.clone()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Raw(raw) => raw.is_empty(),
            Self::Value(AnyValue::String(text)) => text.is_empty(),
            Self::Value(_) => false,
        }
    }
}

impl Default for JsonString {
    fn default() -> Self {
        Self::Raw(String::new())
    }
}

impl PartialEq for JsonString {
    fn eq(&self, other: &Self) -> bool {
        if self.to_wire_string() == other.to_wire_string() {
            return true;
        }
        match (self.value(), other.value()) {
            (Ok(left), Ok(right)) => left == right,
            _ => false,
        }
    }
}

impl From<AnyValue> for JsonString {
    fn from(value: AnyValue) -> Self {
        Self::Value(value)
    }
}

impl From<String> for JsonString {
    fn from(raw: String) -> Self {
        Self::Raw(raw)
    }
}

impl From<&str> for JsonString {
    fn from(raw: &str) -> Self {
        Self::Raw(raw.to_string())
    }
}

impl Serialize for JsonString {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire_string())
    }
}

impl<'de> Deserialize<'de> for JsonString {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Some servers inline the object instead of encoding it.
        Ok(match AnyValue::deserialize(deserializer)? {
            AnyValue::String(raw) => Self::Raw(raw),
            other => Self::Value(other),
        })
    }
}

/// A `function_call` item.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolCall {
    #[serde(default)]
    pub id: Option<String>,
    pub call_id: String,
    pub name: String,
    pub arguments: JsonString,
    pub status: ItemStatus,
}

impl ToolCall {
    pub fn new(
        call_id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<JsonString>,
    ) -> Self {
        Self {
            id: None,
            call_id: call_id.into(),
            name: name.into(),
            arguments: arguments.into(),
            status: ItemStatus::Completed,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl Serialize for ToolCall {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", "function_call")?;
        if let Some(id) = &self.id {
            map.serialize_entry("id", id)?;
        }
        map.serialize_entry("call_id", &self.call_id)?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("arguments", &self.arguments)?;
        map.serialize_entry("status", &self.status)?;
        map.end()
    }
}

/// A `function_call_output` item answering the call with the same `call_id`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolOutput {
    #[serde(default)]
    pub id: Option<String>,
    pub call_id: String,
    pub output: JsonString,
    pub status: ItemStatus,
}

impl ToolOutput {
    pub fn new(call_id: impl Into<String>, output: impl Into<JsonString>) -> Self {
        Self {
            id: None,
            call_id: call_id.into(),
            output: output.into(),
            status: ItemStatus::Completed,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl Serialize for ToolOutput {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", "function_call_output")?;
        if let Some(id) = &self.id {
            map.serialize_entry("id", id)?;
        }
        map.serialize_entry("call_id", &self.call_id)?;
        map.serialize_entry("output", &self.output)?;
        map.serialize_entry("status", &self.status)?;
        map.end()
    }
}
