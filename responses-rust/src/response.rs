//! The response snapshot and the objects hanging off it.
use crate::{
    any_value::{expect_object, kind_name},
    AnyMap, AnyValue, JsonSchema, OutputItem, ResponsesError, ResponsesResult, Tool, ToolChoice,
};
use serde::{de::Error as _, ser::Error as _, ser::SerializeMap, Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Queued,
    InProgress,
    Completed,
    Incomplete,
    Failed,
    Cancelled,
}

impl ResponseStatus {
    /// Whether the response can no longer change.
    #[must_use]
    pub fn is_final(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Incomplete | Self::Failed | Self::Cancelled
        )
    }
}

/// Error attached to a failed response. `code` and `message` are required
/// on the wire in both directions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseError {
    pub code: Option<String>,
    pub message: Option<String>,
    pub param: Option<String>,
    /// Keys other than `code`, `message` and `param`.
    pub extra: AnyMap,
}

impl ResponseError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: Some(message.into()),
            param: None,
            extra: AnyMap::new(),
        }
    }
}

impl Serialize for ResponseError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (Some(code), Some(message)) = (&self.code, &self.message) else {
            return Err(S::Error::custom(
                "response error requires both `code` and `message`",
            ));
        };
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("code", code)?;
        map.serialize_entry("message", message)?;
        if let Some(param) = &self.param {
            map.serialize_entry("param", param)?;
        }
        for (key, value) in &self.extra {
            if !matches!(key.as_str(), "code" | "message" | "param") {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ResponseError {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map =
            expect_object(AnyValue::deserialize(deserializer)?, "response error").map_err(D::Error::custom)?;
        let code = take_required_string(&mut map, "code", "response error").map_err(D::Error::custom)?;
        let message =
            take_required_string(&mut map, "message", "response error").map_err(D::Error::custom)?;
        let param = match map.remove("param") {
            None | Some(AnyValue::Null) => None,
            Some(AnyValue::String(param)) => Some(param),
            Some(other) => {
                return Err(D::Error::custom(format!(
                    "response error `param` must be a string, got {}",
                    kind_name(&other)
                )))
            }
        };
        Ok(Self {
            code: Some(code),
            message: Some(message),
            param,
            extra: map,
        })
    }
}

/// Why a response stopped early. `reason` is required on the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncompleteDetails {
    pub reason: Option<String>,
    pub extra: AnyMap,
}

impl IncompleteDetails {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            extra: AnyMap::new(),
        }
    }
}

impl Serialize for IncompleteDetails {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let Some(reason) = &self.reason else {
            return Err(S::Error::custom("incomplete details require `reason`"));
        };
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("reason", reason)?;
        for (key, value) in &self.extra {
            if key != "reason" {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for IncompleteDetails {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map = expect_object(AnyValue::deserialize(deserializer)?, "incomplete details")
            .map_err(D::Error::custom)?;
        let reason =
            take_required_string(&mut map, "reason", "incomplete details").map_err(D::Error::custom)?;
        Ok(Self {
            reason: Some(reason),
            extra: map,
        })
    }
}

fn take_required_string(map: &mut AnyMap, key: &str, what: &str) -> ResponsesResult<String> {
    match map.remove(key) {
        Some(AnyValue::String(value)) => Ok(value),
        Some(other) => Err(ResponsesError::decode(format!(
            "{what} `{key}` must be a string, got {}",
            kind_name(&other)
        ))),
        None => Err(ResponsesError::decode(format!("{what} is missing `{key}`"))),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub input_tokens_details: InputTokensDetails,
    pub output_tokens_details: OutputTokensDetails,
}

impl Usage {
    #[must_use]
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
            input_tokens_details: InputTokensDetails::default(),
            output_tokens_details: OutputTokensDetails::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputTokensDetails {
    pub cached_tokens: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputTokensDetails {
    pub reasoning_tokens: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningEffort {
    None,
    Minimal,
    Low,
    Medium,
    High,
    Xhigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningSummaryMode {
    Auto,
    Concise,
    Detailed,
}

/// Reasoning configuration echoed on a response. Both keys are always
/// written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningConfig {
    #[serde(with = "crate::codec::nullable")]
    pub effort: Option<ReasoningEffort>,
    #[serde(with = "crate::codec::nullable")]
    pub summary: Option<ReasoningSummaryMode>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Truncation {
    Auto,
    #[default]
    Disabled,
}

/// Structured-output settings of a `json_schema` text format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchemaFormat {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<JsonSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl JsonSchemaFormat {
    pub fn new(name: impl Into<String>, schema: JsonSchema) -> Self {
        Self {
            name: name.into(),
            description: None,
            schema: Some(schema),
            strict: Some(true),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum TextFormat {
    #[default]
    Text,
    JsonObject,
    JsonSchema(JsonSchemaFormat),
    Other {
        format_type: String,
        payload: AnyMap,
    },
}

impl TextFormat {
    #[must_use]
    pub fn format_type(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::JsonObject => "json_object",
            Self::JsonSchema(_) => "json_schema",
            Self::Other { format_type, .. } => format_type,
        }
    }
}

impl Serialize for TextFormat {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Helper<'a, T: Serialize> {
            #[serde(rename = "type")]
            format_type: &'a str,
            #[serde(flatten)]
            inner: &'a T,
        }

        let format_type = self.format_type();
        match self {
            Self::Text | Self::JsonObject => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("type", format_type)?;
                map.end()
            }
            Self::JsonSchema(format) => Helper {
                format_type,
                inner: format,
            }
            .serialize(serializer),
            Self::Other { payload, .. } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", format_type)?;
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

impl<'de> Deserialize<'de> for TextFormat {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map = expect_object(AnyValue::deserialize(deserializer)?, "text format")
            .map_err(D::Error::custom)?;
        let format_type = match map.get("type") {
            Some(AnyValue::String(format_type)) => format_type.clone(),
            _ => return Err(D::Error::missing_field("type")),
        };
        match format_type.as_str() {
            "text" => Ok(Self::Text),
            "json_object" => Ok(Self::JsonObject),
            "json_schema" => serde_json::from_value(AnyValue::Object(map))
                .map(Self::JsonSchema)
                .map_err(D::Error::custom),
            _ => {
                map.remove("type");
                Ok(Self::Other {
                    format_type,
                    payload: map,
                })
            }
        }
    }
}

/// Text output configuration echoed on a response. A legacy empty object
/// decodes to the default (plain text, medium verbosity).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextField {
    #[serde(default)]
    pub format: TextFormat,
    #[serde(default)]
    pub verbosity: Verbosity,
}

/// The response snapshot.
///
/// Fields declared with `codec::nullable` are required-nullable: they are
/// always written and must be present when decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseObject {
    pub id: String,
    /// Always `"response"`.
    pub object: String,
    #[serde(with = "crate::codec::epoch_seconds")]
    pub created_at: i64,
    #[serde(with = "crate::codec::epoch_seconds::nullable")]
    pub completed_at: Option<i64>,
    pub model: String,
    pub status: ResponseStatus,
    #[serde(with = "crate::codec::nullable")]
    pub incomplete_details: Option<IncompleteDetails>,
    #[serde(with = "crate::codec::nullable")]
    pub usage: Option<Usage>,
    #[serde(with = "crate::codec::nullable")]
    pub instructions: Option<String>,
    #[serde(with = "crate::codec::nullable")]
    pub reasoning: Option<ReasoningConfig>,
    #[serde(with = "crate::codec::nullable")]
    pub max_output_tokens: Option<u32>,
    #[serde(with = "crate::codec::nullable")]
    pub max_tool_calls: Option<u32>,
    #[serde(with = "crate::codec::nullable")]
    pub previous_response_id: Option<String>,
    #[serde(with = "crate::codec::nullable")]
    pub safety_identifier: Option<String>,
    #[serde(with = "crate::codec::nullable")]
    pub prompt_cache_key: Option<String>,
    pub tools: Vec<Tool>,
    #[serde(with = "crate::tool_choice::response")]
    pub tool_choice: ToolChoice,
    pub truncation: Truncation,
    pub parallel_tool_calls: bool,
    pub text: TextField,
    pub output: Vec<OutputItem>,
    pub metadata: AnyMap,
    pub temperature: f64,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
    pub top_logprobs: u32,
    pub store: bool,
    pub background: bool,
    pub service_tier: String,
    #[serde(with = "crate::codec::nullable")]
    pub error: Option<ResponseError>,
}

impl ResponseObject {
    /// An `in_progress` response with default sampling and tool settings.
    pub fn new(id: impl Into<String>, model: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: id.into(),
            object: "response".to_string(),
            created_at,
            completed_at: None,
            model: model.into(),
            status: ResponseStatus::InProgress,
            incomplete_details: None,
            usage: None,
            instructions: None,
            reasoning: None,
            max_output_tokens: None,
            max_tool_calls: None,
            previous_response_id: None,
            safety_identifier: None,
            prompt_cache_key: None,
            tools: Vec::new(),
            tool_choice: ToolChoice::Auto,
            truncation: Truncation::Disabled,
            parallel_tool_calls: false,
            text: TextField::default(),
            output: Vec::new(),
            metadata: AnyMap::new(),
            temperature: 1.0,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            top_logprobs: 0,
            store: false,
            background: false,
            service_tier: "default".to_string(),
            error: None,
        }
    }

    #[must_use]
    pub fn queued(mut self) -> Self {
        self.status = ResponseStatus::Queued;
        self
    }

    #[must_use]
    pub fn completed(mut self, completed_at: i64, output: Vec<OutputItem>) -> Self {
        self.status = ResponseStatus::Completed;
        self.completed_at = Some(completed_at);
        self.output = output;
        self
    }

    #[must_use]
    pub fn failed(mut self, error: ResponseError) -> Self {
        self.status = ResponseStatus::Failed;
        self.error = Some(error);
        self
    }

    #[must_use]
    pub fn incomplete(mut self, reason: impl Into<String>) -> Self {
        self.status = ResponseStatus::Incomplete;
        self.incomplete_details = Some(IncompleteDetails::new(reason));
        self
    }

    #[must_use]
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Concatenated assistant text across all message items.
    #[must_use]
    pub fn output_text(&self) -> String {
        self.output.iter().map(OutputItem::output_text).collect()
    }
}

/// A page of responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseList {
    /// Always `"list"`.
    pub object: String,
    pub data: Vec<ResponseObject>,
    pub has_more: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl ResponseList {
    #[must_use]
    pub fn new(data: Vec<ResponseObject>, has_more: bool) -> Self {
        Self {
            object: "list".to_string(),
            first_id: data.first().map(|response| response.id.clone()),
            last_id: data.last().map(|response| response.id.clone()),
            data,
            has_more,
            next_page_token: None,
        }
    }
}

/// Error body returned with a non-success HTTP status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    #[serde(default)]
    pub param: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorType {
    ServerError,
    InvalidRequest,
    NotFound,
    ModelError,
    TooManyRequests,
    Other(String),
}

impl ApiErrorType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ServerError => "server_error",
            Self::InvalidRequest => "invalid_request",
            Self::NotFound => "not_found",
            Self::ModelError => "model_error",
            Self::TooManyRequests => "too_many_requests",
            Self::Other(raw) => raw,
        }
    }
}

impl Serialize for ApiErrorType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ApiErrorType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match String::deserialize(deserializer)?.as_str() {
            "server_error" => Self::ServerError,
            "invalid_request" | "invalid_request_error" => Self::InvalidRequest,
            "not_found" => Self::NotFound,
            "model_error" => Self::ModelError,
            "too_many_requests" => Self::TooManyRequests,
            other => Self::Other(other.to_string()),
        })
    }
}
