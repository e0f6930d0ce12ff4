//! Items of a response's `output` list.
use crate::{
    any_value::{expect_object, kind_name},
    codec, AnyMap, AnyValue, ContentBlock, ContentKind, JsonString, MessageRole, ResponsesError,
    ResponsesResult, ToolCall, ToolOutput,
};
use serde::{de::Error as _, ser::SerializeMap, Deserialize, Serialize};

/// Lifecycle status of an output item. Unknown strings are kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemStatus {
    InProgress,
    Completed,
    Incomplete,
    Unknown(String),
}

impl ItemStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Incomplete => "incomplete",
            Self::Unknown(raw) => raw,
        }
    }

    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        match value {
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            "incomplete" => Self::Incomplete,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl Serialize for ItemStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ItemStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&raw))
    }
}

/// One part of a reasoning summary. Decodes from a bare string or an object
/// with `text`; always written as a `summary_text` object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningSummaryPart {
    pub text: String,
}

impl ReasoningSummaryPart {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Serialize for ReasoningSummaryPart {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", "summary_text")?;
        map.serialize_entry("text", &self.text)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for ReasoningSummaryPart {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match AnyValue::deserialize(deserializer)? {
            AnyValue::String(text) => Ok(Self { text }),
            AnyValue::Object(map) => match map.get("text") {
                Some(AnyValue::String(text)) => Ok(Self { text: text.clone() }),
                Some(other) => Err(D::Error::custom(format!(
                    "reasoning summary `text` must be a string, got {}",
                    kind_name(other)
                ))),
                None => Err(D::Error::missing_field("text")),
            },
            other => Err(D::Error::custom(format!(
                "reasoning summary part must be a string or an object, got {}",
                kind_name(&other)
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageItem {
    pub id: String,
    pub role: MessageRole,
    pub content: Vec<ContentBlock>,
    pub status: ItemStatus,
}

/// A reasoning item. It never carries `role` or `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningItem {
    pub id: String,
    pub summary: Vec<ReasoningSummaryPart>,
    /// Written only when non-empty.
    #[serde(default, skip_serializing_if = "is_none_or_empty")]
    pub content: Option<Vec<ContentBlock>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_content: Option<String>,
}

#[allow(clippy::ref_option)]
fn is_none_or_empty(content: &Option<Vec<ContentBlock>>) -> bool {
    content.as_ref().map_or(true, Vec::is_empty)
}

impl ReasoningItem {
    /// Summary parts joined with blank lines.
    #[must_use]
    pub fn summary_text(&self) -> String {
        self.summary
            .iter()
            .map(|part| part.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSearchCallItem {
    pub id: String,
    pub status: ItemStatus,
    pub queries: Vec<String>,
    #[serde(with = "crate::codec::nullable")]
    pub results: Option<Vec<AnyValue>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchCallItem {
    pub id: String,
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<AnyValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeInterpreterCallItem {
    pub id: String,
    pub status: ItemStatus,
    pub container_id: String,
    #[serde(with = "crate::codec::nullable")]
    pub code: Option<String>,
    #[serde(with = "crate::codec::nullable")]
    pub outputs: Option<Vec<AnyValue>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpCallItem {
    pub id: String,
    pub server_label: String,
    pub name: String,
    pub arguments: JsonString,
    #[serde(with = "crate::codec::nullable")]
    pub output: Option<String>,
    #[serde(with = "crate::codec::nullable")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGenerationCallItem {
    pub id: String,
    pub status: ItemStatus,
    /// Base64 image data.
    #[serde(with = "crate::codec::nullable")]
    pub result: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutputItem {
    Message(MessageItem),
    Reasoning(ReasoningItem),
    FunctionCall(ToolCall),
    FunctionCallOutput(ToolOutput),
    FileSearchCall(FileSearchCallItem),
    WebSearchCall(WebSearchCallItem),
    CodeInterpreterCall(CodeInterpreterCallItem),
    McpCall(McpCallItem),
    ImageGenerationCall(ImageGenerationCallItem),
    /// An item type this crate does not model. `payload` excludes `type`.
    Other {
        item_type: String,
        payload: AnyMap,
    },
}

impl OutputItem {
    /// A completed assistant message with a single `output_text` block.
    pub fn message(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Message(MessageItem {
            id: id.into(),
            role: MessageRole::Assistant,
            content: vec![ContentBlock::output_text(text)],
            status: ItemStatus::Completed,
        })
    }

    /// A reasoning item with one summary part.
    pub fn reasoning(id: impl Into<String>, summary_text: impl Into<String>) -> Self {
        Self::Reasoning(ReasoningItem {
            id: id.into(),
            summary: vec![ReasoningSummaryPart::new(summary_text)],
            content: None,
            encrypted_content: None,
        })
    }

    pub fn function_call(
        id: impl Into<String>,
        call_id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<JsonString>,
    ) -> Self {
        Self::FunctionCall(ToolCall::new(call_id, name, arguments).with_id(id))
    }

    pub fn function_call_output(call_id: impl Into<String>, output: impl Into<JsonString>) -> Self {
        Self::FunctionCallOutput(ToolOutput::new(call_id, output))
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Message(item) => Some(&item.id),
            Self::Reasoning(item) => Some(&item.id),
            Self::FunctionCall(call) => call.id.as_deref(),
            Self::FunctionCallOutput(output) => output.id.as_deref(),
            Self::FileSearchCall(item) => Some(&item.id),
            Self::WebSearchCall(item) => Some(&item.id),
            Self::CodeInterpreterCall(item) => Some(&item.id),
            Self::McpCall(item) => Some(&item.id),
            Self::ImageGenerationCall(item) => Some(&item.id),
            Self::Other { payload, .. } => payload.get("id").and_then(AnyValue::as_str),
        }
    }

    #[must_use]
    pub fn item_type(&self) -> &str {
        match self {
            Self::Message(_) => "message",
            Self::Reasoning(_) => "reasoning",
            Self::FunctionCall(_) => "function_call",
            Self::FunctionCallOutput(_) => "function_call_output",
            Self::FileSearchCall(_) => "file_search_call",
            Self::WebSearchCall(_) => "web_search_call",
            Self::CodeInterpreterCall(_) => "code_interpreter_call",
            Self::McpCall(_) => "mcp_call",
            Self::ImageGenerationCall(_) => "image_generation_call",
            Self::Other { item_type, .. } => item_type,
        }
    }

    /// Concatenated `output_text` of a message; empty for other kinds.
    #[must_use]
    pub fn output_text(&self) -> String {
        match self {
            Self::Message(message) => message
                .content
                .iter()
                .filter(|block| block.kind == ContentKind::OutputText)
                .filter_map(ContentBlock::text_value)
                .collect(),
            _ => String::new(),
        }
    }

    /// Name of the function or tool invoked by a call item.
    #[must_use]
    pub fn tool_name(&self) -> Option<&str> {
        match self {
            Self::FunctionCall(call) => Some(&call.name),
            Self::McpCall(call) => Some(&call.name),
            _ => None,
        }
    }

    fn from_map(mut map: AnyMap) -> ResponsesResult<Self> {
        let item_type = match map.get("type") {
            Some(AnyValue::String(item_type)) => item_type.clone(),
            Some(other) => {
                return Err(ResponsesError::decode(format!(
                    "output item `type` must be a string, got {}",
                    kind_name(other)
                )))
            }
            None => return Err(ResponsesError::decode("output item is missing `type`")),
        };

        let value = || AnyValue::Object(map.clone());
        Ok(match item_type.as_str() {
            "message" => Self::Message(codec::decode_value(value())?),
            "reasoning" => Self::Reasoning(codec::decode_value(value())?),
            "function_call" => Self::FunctionCall(codec::decode_value(value())?),
            "function_call_output" => Self::FunctionCallOutput(codec::decode_value(value())?),
            "file_search_call" => Self::FileSearchCall(codec::decode_value(value())?),
            "web_search_call" => Self::WebSearchCall(codec::decode_value(value())?),
            "code_interpreter_call" => Self::CodeInterpreterCall(codec::decode_value(value())?),
            "mcp_call" => Self::McpCall(codec::decode_value(value())?),
            "image_generation_call" => Self::ImageGenerationCall(codec::decode_value(value())?),
            _ => {
                map.remove("type");
                Self::Other {
                    item_type,
                    payload: map,
                }
            }
        })
    }
}

#[derive(Serialize)]
struct Tagged<'a, T: Serialize> {
    #[serde(rename = "type")]
    item_type: &'a str,
    #[serde(flatten)]
    inner: &'a T,
}

impl Serialize for OutputItem {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let item_type = self.item_type();
        match self {
            Self::Message(item) => Tagged { item_type, inner: item }.serialize(serializer),
            Self::Reasoning(item) => Tagged { item_type, inner: item }.serialize(serializer),
            Self::FunctionCall(call) => call.serialize(serializer),
            Self::FunctionCallOutput(output) => output.serialize(serializer),
            Self::FileSearchCall(item) => Tagged { item_type, inner: item }.serialize(serializer),
            Self::WebSearchCall(item) => Tagged { item_type, inner: item }.serialize(serializer),
            Self::CodeInterpreterCall(item) => {
                Tagged { item_type, inner: item }.serialize(serializer)
            }
            Self::McpCall(item) => Tagged { item_type, inner: item }.serialize(serializer),
            Self::ImageGenerationCall(item) => {
                Tagged { item_type, inner: item }.serialize(serializer)
            }
            Self::Other { payload, .. } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", item_type)?;
                for (key, value) in payload {
                    if key != "type" {
                        map.serialize_entry(key, value)?;
                    }
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for OutputItem {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = AnyValue::deserialize(deserializer)?;
        expect_object(value, "output item")
            .and_then(Self::from_map)
            .map_err(D::Error::custom)
    }
}
