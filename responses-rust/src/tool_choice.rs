//! How the model is allowed to pick tools.
//!
//! A named function is written `{"type":"function","function":{"name":..}}`
//! in requests and `{"type":"function","name":..}` in responses. Both shapes
//! decode to the same [`ToolChoice::Function`]; the caller picks the shape to
//! write with [`WireDirection`].
use crate::{
    any_value::{kind_name, object_at, string_at},
    AnyMap, AnyValue, ResponsesError, ResponsesResult,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireDirection {
    Request,
    Response,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoiceMode {
    None,
    Auto,
    Required,
}

impl ToolChoiceMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Auto => "auto",
            Self::Required => "required",
        }
    }

    fn from_wire(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "auto" => Some(Self::Auto),
            "required" => Some(Self::Required),
            _ => None,
        }
    }
}

/// One entry of an `allowed_tools` list.
#[derive(Debug, Clone, PartialEq)]
pub enum AllowedTool {
    Function { name: String },
    Other { tool_type: String, payload: AnyMap },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolChoice {
    None,
    Auto,
    Required,
    Function {
        name: String,
    },
    /// Restricts the model to a subset of the declared tools. `mode` must be
    /// set when writing a response.
    AllowedTools {
        tools: Vec<AllowedTool>,
        mode: Option<ToolChoiceMode>,
    },
    Other {
        choice_type: String,
        payload: AnyMap,
    },
}

impl ToolChoice {
    pub fn function(name: impl Into<String>) -> Self {
        Self::Function { name: name.into() }
    }

    pub fn to_wire(&self, direction: WireDirection) -> ResponsesResult<AnyValue> {
        let mut map = AnyMap::new();
        match self {
            Self::None => return Ok(ToolChoiceMode::None.as_str().into()),
            Self::Auto => return Ok(ToolChoiceMode::Auto.as_str().into()),
            Self::Required => return Ok(ToolChoiceMode::Required.as_str().into()),
            Self::Function { name } => {
                map.insert("type".to_string(), "function".into());
                insert_function_name(&mut map, name, direction);
            }
            Self::AllowedTools { tools, mode } => {
                map.insert("type".to_string(), "allowed_tools".into());
                match (mode, direction) {
                    (Some(mode), _) => {
                        map.insert("mode".to_string(), mode.as_str().into());
                    }
                    (None, WireDirection::Response) => {
                        return Err(ResponsesError::encode(
                            "allowed_tools tool choice requires `mode` in a response",
                        ))
                    }
                    (None, WireDirection::Request) => {}
                }
                map.insert(
                    "tools".to_string(),
                    tools
                        .iter()
                        .map(|tool| tool.to_wire(direction))
                        .collect(),
                );
            }
            Self::Other {
                choice_type,
                payload,
            } => {
                map.insert("type".to_string(), choice_type.as_str().into());
                for (key, value) in payload {
                    if key != "type" {
                        map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        Ok(AnyValue::Object(map))
    }

    /// Decodes either wire shape. `direction` only decides whether an
    /// `allowed_tools` choice must carry `mode`.
    pub fn from_wire(value: &AnyValue, direction: WireDirection) -> ResponsesResult<Self> {
        let map = match value {
            AnyValue::String(raw) => {
                return match ToolChoiceMode::from_wire(raw) {
                    Some(ToolChoiceMode::None) => Ok(Self::None),
                    Some(ToolChoiceMode::Auto) => Ok(Self::Auto),
                    Some(ToolChoiceMode::Required) => Ok(Self::Required),
                    None => Err(ResponsesError::decode(format!(
                        "unknown tool choice {raw:?}"
                    ))),
                }
            }
            AnyValue::Object(map) => map,
            other => {
                return Err(ResponsesError::decode(format!(
                    "tool choice must be a string or an object, got {}",
                    kind_name(other)
                )))
            }
        };

        let choice_type = string_at(map, "type")
            .ok_or_else(|| ResponsesError::decode("tool choice is missing `type`"))?;
        match choice_type {
            "function" => Ok(Self::Function {
                name: function_name(map)?,
            }),
            "allowed_tools" => {
                let mode = match map.get("mode") {
                    None | Some(AnyValue::Null) if direction == WireDirection::Response => {
                        return Err(ResponsesError::decode(
                            "allowed_tools tool choice is missing `mode`",
                        ))
                    }
                    None | Some(AnyValue::Null) => None,
                    Some(AnyValue::String(raw)) => Some(
                        ToolChoiceMode::from_wire(raw).ok_or_else(|| {
                            ResponsesError::decode(format!("unknown tool choice mode {raw:?}"))
                        })?,
                    ),
                    Some(other) => {
                        return Err(ResponsesError::decode(format!(
                            "tool choice `mode` must be a string, got {}",
                            kind_name(other)
                        )))
                    }
                };
                let tools = match map.get("tools") {
                    Some(AnyValue::Array(tools)) => tools
                        .iter()
                        .map(AllowedTool::from_wire)
                        .collect::<ResponsesResult<Vec<_>>>()?,
                    Some(other) => {
                        return Err(ResponsesError::decode(format!(
                            "allowed_tools `tools` must be an array, got {}",
                            kind_name(other)
                        )))
                    }
                    None => {
                        return Err(ResponsesError::decode(
                            "allowed_tools tool choice is missing `tools`",
                        ))
                    }
                };
                Ok(Self::AllowedTools { tools, mode })
            }
            other => {
                let mut payload = map.clone();
                payload.remove("type");
                Ok(Self::Other {
                    choice_type: other.to_string(),
                    payload,
                })
            }
        }
    }
}

impl AllowedTool {
    pub fn function(name: impl Into<String>) -> Self {
        Self::Function { name: name.into() }
    }

    fn to_wire(&self, direction: WireDirection) -> AnyValue {
        let mut map = AnyMap::new();
        match self {
            Self::Function { name } => {
                map.insert("type".to_string(), "function".into());
                insert_function_name(&mut map, name, direction);
            }
            Self::Other { tool_type, payload } => {
                map.insert("type".to_string(), tool_type.as_str().into());
                for (key, value) in payload {
                    if key != "type" {
                        map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        AnyValue::Object(map)
    }

    fn from_wire(value: &AnyValue) -> ResponsesResult<Self> {
        let AnyValue::Object(map) = value else {
            return Err(ResponsesError::decode(format!(
                "allowed tool must be an object, got {}",
                kind_name(value)
            )));
        };
        match string_at(map, "type").unwrap_or("function") {
            "function" => Ok(Self::Function {
                name: function_name(map)?,
            }),
            other => {
                let mut payload = map.clone();
                payload.remove("type");
                Ok(Self::Other {
                    tool_type: other.to_string(),
                    payload,
                })
            }
        }
    }
}

fn insert_function_name(map: &mut AnyMap, name: &str, direction: WireDirection) {
    match direction {
        WireDirection::Request => {
            let mut function = AnyMap::new();
            function.insert("name".to_string(), name.into());
            map.insert("function".to_string(), AnyValue::Object(function));
        }
        WireDirection::Response => {
            map.insert("name".to_string(), name.into());
        }
    }
}

/// Reads the flat `name` or the nested `function.name`.
fn function_name(map: &AnyMap) -> ResponsesResult<String> {
    string_at(map, "name")
        .or_else(|| object_at(map, "function").and_then(|function| string_at(function, "name")))
        .map(str::to_string)
        .ok_or_else(|| ResponsesError::decode("function tool choice is missing `name`"))
}

/// serde adapter for an optional request-side `tool_choice`.
pub mod request {
    use super::{ToolChoice, WireDirection};
    use crate::AnyValue;
    use serde::{de::Error as _, ser::Error as _, Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        choice: &Option<ToolChoice>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match choice {
            Some(choice) => choice
                .to_wire(WireDirection::Request)
                .map_err(S::Error::custom)
                .and_then(|value| serializer.serialize_some(&value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<ToolChoice>, D::Error> {
        match Option::<AnyValue>::deserialize(deserializer)? {
            Some(value) => ToolChoice::from_wire(&value, WireDirection::Request)
                .map(Some)
                .map_err(D::Error::custom),
            None => Ok(None),
        }
    }
}

/// serde adapter for the response-side `tool_choice`.
pub mod response {
    use super::{ToolChoice, WireDirection};
    use crate::AnyValue;
    use serde::{de::Error as _, ser::Error as _, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(choice: &ToolChoice, serializer: S) -> Result<S::Ok, S::Error> {
        choice
            .to_wire(WireDirection::Response)
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ToolChoice, D::Error> {
        let value = AnyValue::deserialize(deserializer)?;
        ToolChoice::from_wire(&value, WireDirection::Response).map_err(D::Error::custom)
    }
}
