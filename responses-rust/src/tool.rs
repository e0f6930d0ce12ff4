//! Tool definitions sent with a request and echoed on the response.
use crate::{
    any_value::{expect_object, kind_name},
    codec, AnyMap, AnyValue, JsonSchema, ResponsesError, ResponsesResult,
};
use serde::{de::Error as _, Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebSearchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_location: Option<UserLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_context_size: Option<SearchContextSize>,
}

/// Approximate location used to localise search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    #[serde(rename = "type", default = "approximate")]
    pub location_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

fn approximate() -> String {
    "approximate".to_string()
}

impl Default for UserLocation {
    fn default() -> Self {
        Self {
            location_type: approximate(),
            city: None,
            region: None,
            country: None,
            timezone: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchContextSize {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileSearchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_store_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_num_results: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking_options: Option<RankingOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeInterpreterConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerConfig {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub container_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputerUseConfig {
    pub display_width: u32,
    pub display_height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpToolConfig {
    pub server_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_tools: Option<Vec<String>>,
}

/// A function the model may call. `description`, `parameters` and `strict`
/// are always written, as `null` when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTool {
    pub name: String,
    #[serde(with = "crate::codec::nullable")]
    pub description: Option<String>,
    #[serde(with = "crate::codec::nullable")]
    pub parameters: Option<JsonSchema>,
    #[serde(with = "crate::codec::nullable")]
    pub strict: Option<bool>,
}

impl FunctionTool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            parameters: None,
            strict: Some(true),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: JsonSchema) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

/// The built-in tools take an optional config. `Some` of an empty config is
/// written the same as `None` and decodes back as `None`; the constructors
/// below normalize it up front.
#[derive(Debug, Clone, PartialEq)]
pub enum Tool {
    WebSearch(Option<WebSearchConfig>),
    FileSearch(Option<FileSearchConfig>),
    CodeInterpreter(Option<CodeInterpreterConfig>),
    ComputerUse(ComputerUseConfig),
    Function(FunctionTool),
    Mcp(McpToolConfig),
    /// A tool type this crate does not model. `payload` excludes `type`.
    Other {
        tool_type: String,
        payload: AnyMap,
    },
}

impl Tool {
    /// Shorthand for a strict function tool.
    pub fn function(
        name: impl Into<String>,
        description: Option<&str>,
        parameters: JsonSchema,
    ) -> Self {
        let mut tool = FunctionTool::new(name).with_parameters(parameters);
        tool.description = description.map(str::to_string);
        Self::Function(tool)
    }

    #[must_use]
    pub fn web_search(config: WebSearchConfig) -> Self {
        Self::WebSearch(non_empty(config))
    }

    #[must_use]
    pub fn file_search(config: FileSearchConfig) -> Self {
        Self::FileSearch(non_empty(config))
    }

    #[must_use]
    pub fn code_interpreter(config: CodeInterpreterConfig) -> Self {
        Self::CodeInterpreter(non_empty(config))
    }

    #[must_use]
    pub fn tool_type(&self) -> &str {
        match self {
            Self::WebSearch(_) => "web_search",
            Self::FileSearch(_) => "file_search",
            Self::CodeInterpreter(_) => "code_interpreter",
            Self::ComputerUse(_) => "computer_use",
            Self::Function(_) => "function",
            Self::Mcp(_) => "mcp",
            Self::Other { tool_type, .. } => tool_type,
        }
    }

    /// Name of a function tool.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Function(function) => Some(&function.name),
            _ => None,
        }
    }

    fn from_map(mut map: AnyMap) -> ResponsesResult<Self> {
        let tool_type = match map.get("type") {
            Some(AnyValue::String(tool_type)) => tool_type.clone(),
            Some(other) => {
                return Err(ResponsesError::decode(format!(
                    "tool `type` must be a string, got {}",
                    kind_name(other)
                )))
            }
            None => return Err(ResponsesError::decode("tool definition is missing `type`")),
        };
        let config_only = map.len() == 1;

        Ok(match tool_type.as_str() {
            "web_search" if config_only => Self::WebSearch(None),
            "web_search" => Self::WebSearch(Some(decode_map(map)?)),
            "file_search" if config_only => Self::FileSearch(None),
            "file_search" => Self::FileSearch(Some(decode_map(map)?)),
            "code_interpreter" if config_only => Self::CodeInterpreter(None),
            "code_interpreter" => Self::CodeInterpreter(Some(decode_map(map)?)),
            "computer_use" => Self::ComputerUse(decode_map(map)?),
            "function" => Self::Function(decode_map(map)?),
            "mcp" => Self::Mcp(decode_map(map)?),
            _ => {
                map.remove("type");
                Self::Other {
                    tool_type,
                    payload: map,
                }
            }
        })
    }
}

fn non_empty<T: Default + PartialEq>(config: T) -> Option<T> {
    (config != T::default()).then_some(config)
}

fn decode_map<T: serde::de::DeserializeOwned>(map: AnyMap) -> ResponsesResult<T> {
    codec::decode_value(AnyValue::Object(map))
}

#[derive(Serialize)]
struct Tagged<'a, T: Serialize> {
    #[serde(rename = "type")]
    tool_type: &'a str,
    #[serde(flatten)]
    inner: T,
}

impl Serialize for Tool {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let tool_type = self.tool_type();
        match self {
            Self::WebSearch(config) => Tagged {
                tool_type,
                inner: config,
            }
            .serialize(serializer),
            Self::FileSearch(config) => Tagged {
                tool_type,
                inner: config,
            }
            .serialize(serializer),
            Self::CodeInterpreter(config) => Tagged {
                tool_type,
                inner: config,
            }
            .serialize(serializer),
            Self::ComputerUse(config) => Tagged {
                tool_type,
                inner: config,
            }
            .serialize(serializer),
            Self::Function(function) => Tagged {
                tool_type,
                inner: function,
            }
            .serialize(serializer),
            Self::Mcp(config) => Tagged {
                tool_type,
                inner: config,
            }
            .serialize(serializer),
            Self::Other { payload, .. } => {
                let mut payload = payload.clone();
                payload.remove("type");
                Tagged {
                    tool_type,
                    inner: payload,
                }
                .serialize(serializer)
            }
        }
    }
}

impl<'de> Deserialize<'de> for Tool {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = AnyValue::deserialize(deserializer)?;
        expect_object(value, "tool")
            .and_then(Self::from_map)
            .map_err(D::Error::custom)
    }
}
