//! Message content blocks.
use crate::{
    any_value::{expect_object, kind_name},
    AnyMap, AnyValue, ResponsesError,
};
use serde::{de::Error as _, ser::Error as _, ser::SerializeMap, Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Text,
    InputText,
    OutputText,
    Refusal,
    InputImage,
    InputFile,
    InputAudio,
    OutputAudio,
    ReasoningText,
    SummaryText,
    /// A block type this crate does not model. Fields pass through as-is.
    Other(String),
}

impl ContentKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::InputText => "input_text",
            Self::OutputText => "output_text",
            Self::Refusal => "refusal",
            Self::InputImage => "input_image",
            Self::InputFile => "input_file",
            Self::InputAudio => "input_audio",
            Self::OutputAudio => "output_audio",
            Self::ReasoningText => "reasoning_text",
            Self::SummaryText => "summary_text",
            Self::Other(raw) => raw,
        }
    }

    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        match value {
            "text" => Self::Text,
            "input_text" => Self::InputText,
            "output_text" => Self::OutputText,
            "refusal" => Self::Refusal,
            "input_image" => Self::InputImage,
            "input_file" => Self::InputFile,
            "input_audio" => Self::InputAudio,
            "output_audio" => Self::OutputAudio,
            "reasoning_text" => Self::ReasoningText,
            "summary_text" => Self::SummaryText,
            other => Self::Other(other.to_string()),
        }
    }

    /// The key holding the block's text, for kinds that carry text.
    fn text_key(&self) -> Option<&'static str> {
        match self {
            Self::Text
            | Self::InputText
            | Self::OutputText
            | Self::ReasoningText
            | Self::SummaryText => Some("text"),
            Self::Refusal => Some("refusal"),
            _ => None,
        }
    }
}

/// One typed fragment of message content. The `type` key is derived from
/// `kind` on encode; `fields` holds everything else.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentBlock {
    pub kind: ContentKind,
    pub fields: AnyMap,
}

const OUTPUT_TEXT_ARRAYS: [&str; 2] = ["annotations", "logprobs"];

impl ContentBlock {
    #[must_use]
    pub fn new(kind: ContentKind, fields: AnyMap) -> Self {
        Self { kind, fields }
    }

    fn with_text(kind: ContentKind, key: &str, text: impl Into<String>) -> Self {
        let mut fields = AnyMap::new();
        fields.insert(key.to_string(), AnyValue::String(text.into()));
        Self { kind, fields }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::with_text(ContentKind::Text, "text", text)
    }

    pub fn input_text(text: impl Into<String>) -> Self {
        Self::with_text(ContentKind::InputText, "text", text)
    }

    /// Assistant text with empty annotations and logprobs.
    pub fn output_text(text: impl Into<String>) -> Self {
        Self::output_text_with(text, Vec::new(), Vec::new())
    }

    pub fn output_text_with(
        text: impl Into<String>,
        annotations: Vec<AnyValue>,
        logprobs: Vec<AnyValue>,
    ) -> Self {
        let mut block = Self::with_text(ContentKind::OutputText, "text", text);
        block
            .fields
            .insert("annotations".to_string(), AnyValue::Array(annotations));
        block
            .fields
            .insert("logprobs".to_string(), AnyValue::Array(logprobs));
        block
    }

    pub fn refusal(refusal: impl Into<String>) -> Self {
        Self::with_text(ContentKind::Refusal, "refusal", refusal)
    }

    pub fn reasoning_text(text: impl Into<String>) -> Self {
        Self::with_text(ContentKind::ReasoningText, "text", text)
    }

    pub fn summary_text(text: impl Into<String>) -> Self {
        Self::with_text(ContentKind::SummaryText, "text", text)
    }

    /// Image input by URL. `detail` defaults to `"auto"`.
    pub fn image_url(url: impl Into<String>, detail: Option<&str>) -> Self {
        let mut block = Self::with_text(ContentKind::InputImage, "image_url", url);
        block.fields.insert(
            "detail".to_string(),
            AnyValue::String(detail.unwrap_or("auto").to_string()),
        );
        block
    }

    /// File input from a file id.
    pub fn input_file(file_id: impl Into<String>) -> Self {
        Self::with_text(ContentKind::InputFile, "file_id", file_id)
    }

    #[must_use]
    pub fn text_value(&self) -> Option<&str> {
        self.kind
            .text_key()
            .and_then(|key| self.fields.get(key))
            .and_then(AnyValue::as_str)
    }

    /// Replaces the text of a text-carrying block. Other kinds are left as is.
    pub fn set_text(&mut self, text: impl Into<String>) {
        if let Some(key) = self.kind.text_key() {
            self.fields
                .insert(key.to_string(), AnyValue::String(text.into()));
        }
    }

    /// Annotations of an `output_text` block; empty for other kinds.
    #[must_use]
    pub fn annotations(&self) -> &[AnyValue] {
        self.fields
            .get("annotations")
            .and_then(AnyValue::as_array)
            .map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&AnyValue> {
        self.fields.get(key)
    }

    fn from_map(mut fields: AnyMap) -> Result<Self, ResponsesError> {
        let kind = match fields.remove("type") {
            Some(AnyValue::String(kind)) => ContentKind::from_wire(&kind),
            Some(other) => {
                return Err(ResponsesError::decode(format!(
                    "content block `type` must be a string, got {}",
                    kind_name(&other)
                )))
            }
            None => return Err(ResponsesError::decode("content block is missing `type`")),
        };

        if let Some(key) = kind.text_key() {
            match fields.get(key) {
                Some(AnyValue::String(_)) => {}
                Some(other) => {
                    return Err(ResponsesError::decode(format!(
                        "{} block `{key}` must be a string, got {}",
                        kind.as_str(),
                        kind_name(other)
                    )))
                }
                None => {
                    return Err(ResponsesError::decode(format!(
                        "{} block is missing `{key}`",
                        kind.as_str()
                    )))
                }
            }
        }

        match kind {
            ContentKind::OutputText => {
                for key in OUTPUT_TEXT_ARRAYS {
                    match fields.get(key) {
                        None => {
                            fields.insert(key.to_string(), AnyValue::Array(Vec::new()));
                        }
                        Some(AnyValue::Array(_)) => {}
                        Some(other) => {
                            return Err(ResponsesError::decode(format!(
                                "output_text `{key}` must be an array, got {}",
                                kind_name(other)
                            )))
                        }
                    }
                }
            }
            ContentKind::InputImage => {
                fields
                    .entry("detail")
                    .or_insert_with(|| AnyValue::String("auto".to_string()));
            }
            _ => {}
        }

        Ok(Self { kind, fields })
    }
}

impl Serialize for ContentBlock {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Some(key) = self.kind.text_key() {
            if !matches!(self.fields.get(key), Some(AnyValue::String(_))) {
                return Err(S::Error::custom(format!(
                    "{} block requires a string `{key}`",
                    self.kind.as_str()
                )));
            }
        }
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.kind.as_str())?;
        for (key, value) in &self.fields {
            if key != "type" {
                map.serialize_entry(key, value)?;
            }
        }
        if self.kind == ContentKind::OutputText {
            for key in OUTPUT_TEXT_ARRAYS {
                if !self.fields.contains_key(key) {
                    map.serialize_entry(key, &[] as &[AnyValue])?;
                }
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ContentBlock {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = AnyValue::deserialize(deserializer)?;
        expect_object(value, "content block")
            .and_then(Self::from_map)
            .map_err(D::Error::custom)
    }
}

/// The author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    System,
    Assistant,
    Tool,
    Developer,
}

impl MessageRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::System => "system",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
            Self::Developer => "developer",
        }
    }
}
