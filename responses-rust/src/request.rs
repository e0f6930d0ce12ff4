//! Request body for creating a response.
use crate::{
    any_value::{expect_object, kind_name},
    codec, AnyMap, AnyValue, ContentBlock, ItemStatus, MessageRole, ReasoningEffort,
    ReasoningItem, ReasoningSummaryMode, ResponsesError, ResponsesResult, TextFormat, Tool,
    ToolCall, ToolChoice, ToolOutput, Truncation, Verbosity,
};
use serde::{de::Error as _, ser::SerializeMap, Deserialize, Serialize};

/// A conversation message sent as input.
#[derive(Debug, Clone, PartialEq)]
pub struct InputMessage {
    pub role: MessageRole,
    pub content: Vec<ContentBlock>,
    pub id: Option<String>,
    pub status: Option<ItemStatus>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputItem {
    Message(InputMessage),
    FunctionCall(ToolCall),
    FunctionCallOutput(ToolOutput),
    Reasoning(ReasoningItem),
    /// Points at an item stored server-side.
    ItemReference { id: String },
    /// Any other item, written back exactly as given (including `type`).
    Raw(AnyMap),
}

impl InputItem {
    pub fn message(role: MessageRole, content: Vec<ContentBlock>) -> Self {
        Self::Message(InputMessage {
            role,
            content,
            id: None,
            status: None,
        })
    }

    /// A user message with a single `input_text` block.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::message(MessageRole::User, vec![ContentBlock::input_text(text)])
    }

    pub fn item_reference(id: impl Into<String>) -> Self {
        Self::ItemReference { id: id.into() }
    }

    fn from_map(map: AnyMap) -> ResponsesResult<Self> {
        // Shorthand messages carry `role` without `type`.
        let item_type = match map.get("type") {
            Some(AnyValue::String(item_type)) => item_type.clone(),
            None if map.contains_key("role") => "message".to_string(),
            Some(other) => {
                return Err(ResponsesError::decode(format!(
                    "input item `type` must be a string, got {}",
                    kind_name(other)
                )))
            }
            None => return Err(ResponsesError::decode("input item is missing `type`")),
        };

        match item_type.as_str() {
            "message" => Self::message_from_map(map),
            "function_call" => codec::decode_value(AnyValue::Object(map)).map(Self::FunctionCall),
            "function_call_output" => {
                codec::decode_value(AnyValue::Object(map)).map(Self::FunctionCallOutput)
            }
            "reasoning" => codec::decode_value(AnyValue::Object(map)).map(Self::Reasoning),
            "item_reference" => match map.get("id") {
                Some(AnyValue::String(id)) => Ok(Self::ItemReference { id: id.clone() }),
                _ => Err(ResponsesError::decode("item_reference is missing `id`")),
            },
            _ => Ok(Self::Raw(map)),
        }
    }

    fn message_from_map(mut map: AnyMap) -> ResponsesResult<Self> {
        let role: MessageRole = match map.remove("role") {
            Some(role) => codec::decode_value(role)?,
            None => return Err(ResponsesError::decode("input message is missing `role`")),
        };
        let content = match map.remove("content") {
            Some(AnyValue::String(text)) if role == MessageRole::Assistant => {
                vec![ContentBlock::output_text(text)]
            }
            Some(AnyValue::String(text)) => vec![ContentBlock::input_text(text)],
            Some(content @ AnyValue::Array(_)) => codec::decode_value(content)?,
            Some(other) => {
                return Err(ResponsesError::decode(format!(
                    "input message `content` must be a string or an array, got {}",
                    kind_name(&other)
                )))
            }
            None => return Err(ResponsesError::decode("input message is missing `content`")),
        };
        let id = map
            .remove("id")
            .map(codec::decode_value::<String>)
            .transpose()?;
        let status = map
            .remove("status")
            .map(codec::decode_value::<ItemStatus>)
            .transpose()?;
        Ok(Self::Message(InputMessage {
            role,
            content,
            id,
            status,
        }))
    }
}

impl Serialize for InputItem {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Message(message) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", "message")?;
                if let Some(id) = &message.id {
                    map.serialize_entry("id", id)?;
                }
                map.serialize_entry("role", &message.role)?;
                map.serialize_entry("content", &message.content)?;
                if let Some(status) = &message.status {
                    map.serialize_entry("status", status)?;
                }
                map.end()
            }
            Self::FunctionCall(call) => call.serialize(serializer),
            Self::FunctionCallOutput(output) => output.serialize(serializer),
            Self::Reasoning(item) => {
                #[derive(Serialize)]
                struct Helper<'a> {
                    #[serde(rename = "type")]
                    item_type: &'static str,
                    #[serde(flatten)]
                    inner: &'a ReasoningItem,
                }
                Helper {
                    item_type: "reasoning",
                    inner: item,
                }
                .serialize(serializer)
            }
            Self::ItemReference { id } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "item_reference")?;
                map.serialize_entry("id", id)?;
                map.end()
            }
            Self::Raw(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for InputItem {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = AnyValue::deserialize(deserializer)?;
        expect_object(value, "input item")
            .and_then(Self::from_map)
            .map_err(D::Error::custom)
    }
}

/// `input` is always written as a list; a bare string decodes to one user
/// message.
mod input_list {
    use super::InputItem;
    use crate::AnyValue;
    use serde::{de::Error as _, Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<InputItem>, D::Error> {
        match AnyValue::deserialize(deserializer)? {
            AnyValue::String(text) => Ok(vec![InputItem::user_text(text)]),
            other => serde_json::from_value(other).map_err(D::Error::custom),
        }
    }
}

/// Text output settings of a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextParam {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<TextFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<Verbosity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningParam {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<ReasoningEffort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ReasoningSummaryMode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_obfuscation: Option<bool>,
}

/// Extra output data to include in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseInclude {
    #[serde(rename = "reasoning.encrypted_content")]
    ReasoningEncryptedContent,
    #[serde(rename = "message.output_text.logprobs")]
    MessageOutputTextLogprobs,
    #[serde(rename = "file_search_call.results")]
    FileSearchCallResults,
    #[serde(rename = "code_interpreter_call.outputs")]
    CodeInterpreterCallOutputs,
}

/// Request body. Every field except `input` is left out when unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseCreateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(deserialize_with = "input_list::deserialize")]
    pub input: Vec<InputItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::tool_choice::request"
    )]
    pub tool_choice: Option<ToolChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel_tool_calls: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AnyMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_logprobs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tool_calls: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<ReasoningParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<StreamOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<ResponseInclude>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncation: Option<Truncation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_cache_key: Option<String>,
}

const MAX_TOP_LOGPROBS: u32 = 20;

impl ResponseCreateRequest {
    pub fn new(model: impl Into<String>, input: Vec<InputItem>) -> Self {
        Self {
            model: Some(model.into()),
            input,
            ..Default::default()
        }
    }

    /// Checks business rules that the server would otherwise reject.
    pub fn validate(&self) -> ResponsesResult<()> {
        if self.input.is_empty() {
            return Err(ResponsesError::Validation(
                "input must contain at least one item".to_string(),
            ));
        }

        if let Some(text) = &self.text {
            match &text.format {
                None => {
                    return Err(ResponsesError::Validation(
                        "text.format is required when text is set".to_string(),
                    ))
                }
                Some(TextFormat::JsonSchema(format)) => {
                    if format.name.trim().is_empty() {
                        return Err(ResponsesError::Validation(
                            "json_schema text format requires a name".to_string(),
                        ));
                    }
                    if format.schema.is_none() {
                        return Err(ResponsesError::Validation(
                            "json_schema text format requires a schema".to_string(),
                        ));
                    }
                }
                Some(_) => {}
            }
        }

        check_range("temperature", self.temperature, 0.0, 2.0)?;
        check_range("top_p", self.top_p, 0.0, 1.0)?;
        check_range("frequency_penalty", self.frequency_penalty, -2.0, 2.0)?;
        check_range("presence_penalty", self.presence_penalty, -2.0, 2.0)?;

        if self.max_output_tokens == Some(0) {
            return Err(ResponsesError::Validation(
                "max_output_tokens must be at least 1".to_string(),
            ));
        }
        if let Some(top_logprobs) = self.top_logprobs {
            if top_logprobs > MAX_TOP_LOGPROBS {
                return Err(ResponsesError::Validation(format!(
                    "top_logprobs must be at most {MAX_TOP_LOGPROBS}, got {top_logprobs}"
                )));
            }
        }
        Ok(())
    }
}

fn check_range(name: &str, value: Option<f64>, min: f64, max: f64) -> ResponsesResult<()> {
    match value {
        Some(value) if !(min..=max).contains(&value) => Err(ResponsesError::Validation(format!(
            "{name} must be between {min} and {max}, got {value}"
        ))),
        _ => Ok(()),
    }
}

/// Validates the request and encodes it to JSON bytes. Nothing is encoded
/// when validation fails.
pub fn encode_request(request: &ResponseCreateRequest) -> ResponsesResult<Vec<u8>> {
    request.validate()?;
    codec::encode(request)
}
