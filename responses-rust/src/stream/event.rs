use super::StreamEventKind;
use crate::{
    any_value::{expect_object, kind_name, object_at, string_at, text_of, u64_at},
    codec, AnyMap, AnyValue, ContentBlock, OutputItem, ResponseError, ResponseObject,
    ResponsesError, ResponsesResult,
};
use serde::{de::Error as _, ser::SerializeMap, Deserialize, Serialize};

/// The `type` string of an event. Strings this crate does not know are
/// kept so callers can tell schema drift apart from a real `error` event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    Known(StreamEventKind),
    Unrecognized(String),
}

impl EventType {
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        StreamEventKind::from_wire(value)
            .map_or_else(|| Self::Unrecognized(value.to_string()), Self::Known)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(kind) => kind.as_str(),
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl From<StreamEventKind> for EventType {
    fn from(kind: StreamEventKind) -> Self {
        Self::Known(kind)
    }
}

/// One event of a response stream.
///
/// `payload` holds every key except `type` and `sequence_number`.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamEvent {
    pub event_type: EventType,
    pub sequence_number: Option<u64>,
    pub payload: AnyMap,
}

impl StreamEvent {
    #[must_use]
    pub fn new(kind: StreamEventKind, payload: AnyMap) -> Self {
        Self {
            event_type: EventType::Known(kind),
            sequence_number: None,
            payload,
        }
    }

    #[must_use]
    pub fn with_sequence_number(mut self, sequence_number: u64) -> Self {
        self.sequence_number = Some(sequence_number);
        self
    }

    /// The event kind. Unrecognized type strings report [`StreamEventKind::Error`];
    /// check [`Self::is_known_event_type`] to tell them apart.
    #[must_use]
    pub fn kind(&self) -> StreamEventKind {
        match &self.event_type {
            EventType::Known(kind) => *kind,
            EventType::Unrecognized(_) => StreamEventKind::Error,
        }
    }

    #[must_use]
    pub fn type_str(&self) -> &str {
        self.event_type.as_str()
    }

    #[must_use]
    pub fn is_known_event_type(&self) -> bool {
        matches!(self.event_type, EventType::Known(_))
    }

    /// Unrecognized events are never terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.event_type, EventType::Known(kind) if kind.is_terminal())
    }

    #[must_use]
    pub fn sequence_number(&self) -> Option<u64> {
        self.sequence_number
    }

    #[must_use]
    pub fn item_id(&self) -> Option<&str> {
        string_at(&self.payload, "item_id")
    }

    #[must_use]
    pub fn output_index(&self) -> Option<u64> {
        u64_at(&self.payload, "output_index")
    }

    #[must_use]
    pub fn content_index(&self) -> Option<u64> {
        u64_at(&self.payload, "content_index")
    }

    #[must_use]
    pub fn summary_index(&self) -> Option<u64> {
        u64_at(&self.payload, "summary_index")
    }

    /// `response_id`, else the id of the embedded response snapshot.
    #[must_use]
    pub fn response_id(&self) -> Option<&str> {
        string_at(&self.payload, "response_id").or_else(|| {
            object_at(&self.payload, "response").and_then(|response| string_at(response, "id"))
        })
    }

    /// Text of the `delta` key, whether a bare string or an object.
    #[must_use]
    pub fn delta_text(&self) -> Option<&str> {
        self.payload.get("delta").and_then(text_of)
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        string_at(&self.payload, "text")
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        string_at(&self.payload, "name")
    }

    #[must_use]
    pub fn arguments(&self) -> Option<&str> {
        string_at(&self.payload, "arguments")
    }

    /// Decodes the embedded `response` snapshot, if any.
    pub fn response(&self) -> ResponsesResult<Option<ResponseObject>> {
        self.decode_field("response")
    }

    /// Decodes the embedded output `item`, if any.
    pub fn item(&self) -> ResponsesResult<Option<OutputItem>> {
        self.decode_field("item")
    }

    /// Decodes the embedded content `part`, if any.
    pub fn part(&self) -> ResponsesResult<Option<ContentBlock>> {
        self.decode_field("part")
    }

    fn decode_field<T: serde::de::DeserializeOwned>(&self, key: &str) -> ResponsesResult<Option<T>> {
        match self.payload.get(key) {
            None | Some(AnyValue::Null) => Ok(None),
            Some(value) => codec::decode_value(value.clone()).map(Some),
        }
    }

    /// The error carried by an `error` event, read from a nested `error`
    /// object or from top-level `code`/`message`/`param`.
    #[must_use]
    pub fn stream_error(&self) -> Option<ResponseError> {
        if self.event_type != EventType::Known(StreamEventKind::Error) {
            return None;
        }
        let source = object_at(&self.payload, "error").unwrap_or(&self.payload);
        let read = |key| string_at(source, key).map(str::to_string);
        Some(ResponseError {
            code: read("code"),
            message: read("message"),
            param: read("param"),
            extra: AnyMap::new(),
        })
    }

    /// Parses an event from its JSON object.
    pub fn from_value(value: AnyValue) -> ResponsesResult<Self> {
        let mut payload = expect_object(value, "stream event")?;
        let event_type = match payload.remove("type") {
            Some(AnyValue::String(event_type)) => EventType::from_wire(&event_type),
            Some(other) => {
                return Err(ResponsesError::decode(format!(
                    "stream event `type` must be a string, got {}",
                    kind_name(&other)
                )))
            }
            None => return Err(ResponsesError::decode("stream event is missing `type`")),
        };
        let sequence_number = match payload.remove("sequence_number") {
            None | Some(AnyValue::Null) => None,
            Some(value) => Some(value.as_u64().ok_or_else(|| {
                ResponsesError::decode(format!(
                    "stream event `sequence_number` must be a non-negative integer, got {}",
                    kind_name(&value)
                ))
            })?),
        };
        Ok(Self {
            event_type,
            sequence_number,
            payload,
        })
    }

    fn with_response(kind: StreamEventKind, response: &ResponseObject) -> ResponsesResult<Self> {
        let mut payload = AnyMap::new();
        payload.insert("response".to_string(), codec::encode_to_value(response)?);
        Ok(Self::new(kind, payload))
    }

    pub fn response_created(response: &ResponseObject) -> ResponsesResult<Self> {
        Self::with_response(StreamEventKind::ResponseCreated, response)
    }

    pub fn response_in_progress(response: &ResponseObject) -> ResponsesResult<Self> {
        Self::with_response(StreamEventKind::ResponseInProgress, response)
    }

    pub fn response_queued(response: &ResponseObject) -> ResponsesResult<Self> {
        Self::with_response(StreamEventKind::ResponseQueued, response)
    }

    pub fn response_completed(response: &ResponseObject) -> ResponsesResult<Self> {
        Self::with_response(StreamEventKind::ResponseCompleted, response)
    }

    pub fn response_failed(response: &ResponseObject) -> ResponsesResult<Self> {
        Self::with_response(StreamEventKind::ResponseFailed, response)
    }

    pub fn response_incomplete(response: &ResponseObject) -> ResponsesResult<Self> {
        Self::with_response(StreamEventKind::ResponseIncomplete, response)
    }

    fn with_item(
        kind: StreamEventKind,
        output_index: u64,
        item: &OutputItem,
    ) -> ResponsesResult<Self> {
        let mut payload = AnyMap::new();
        payload.insert("output_index".to_string(), output_index.into());
        payload.insert("item".to_string(), codec::encode_to_value(item)?);
        Ok(Self::new(kind, payload))
    }

    pub fn output_item_added(output_index: u64, item: &OutputItem) -> ResponsesResult<Self> {
        Self::with_item(StreamEventKind::OutputItemAdded, output_index, item)
    }

    pub fn output_item_done(output_index: u64, item: &OutputItem) -> ResponsesResult<Self> {
        Self::with_item(StreamEventKind::OutputItemDone, output_index, item)
    }

    fn with_part(
        kind: StreamEventKind,
        item_id: &str,
        output_index: u64,
        content_index: u64,
        part: &ContentBlock,
    ) -> ResponsesResult<Self> {
        let mut payload = content_position(item_id, output_index, content_index);
        payload.insert("part".to_string(), codec::encode_to_value(part)?);
        Ok(Self::new(kind, payload))
    }

    pub fn content_part_added(
        item_id: &str,
        output_index: u64,
        content_index: u64,
        part: &ContentBlock,
    ) -> ResponsesResult<Self> {
        Self::with_part(
            StreamEventKind::ContentPartAdded,
            item_id,
            output_index,
            content_index,
            part,
        )
    }

    pub fn content_part_done(
        item_id: &str,
        output_index: u64,
        content_index: u64,
        part: &ContentBlock,
    ) -> ResponsesResult<Self> {
        Self::with_part(
            StreamEventKind::ContentPartDone,
            item_id,
            output_index,
            content_index,
            part,
        )
    }

    /// Text delta with empty `logprobs` and `obfuscation`.
    #[must_use]
    pub fn output_text_delta(
        item_id: &str,
        output_index: u64,
        content_index: u64,
        delta: &str,
    ) -> Self {
        let mut payload = content_position(item_id, output_index, content_index);
        payload.insert("logprobs".to_string(), AnyValue::Array(Vec::new()));
        payload.insert("obfuscation".to_string(), "".into());
        payload.insert("delta".to_string(), delta.into());
        Self::new(StreamEventKind::OutputTextDelta, payload)
    }

    #[must_use]
    pub fn output_text_done(item_id: &str, output_index: u64, content_index: u64, text: &str) -> Self {
        let mut payload = content_position(item_id, output_index, content_index);
        payload.insert("text".to_string(), text.into());
        Self::new(StreamEventKind::OutputTextDone, payload)
    }

    #[must_use]
    pub fn reasoning_delta(item_id: &str, output_index: u64, content_index: u64, delta: &str) -> Self {
        let mut payload = content_position(item_id, output_index, content_index);
        payload.insert("delta".to_string(), delta.into());
        Self::new(StreamEventKind::ReasoningDelta, payload)
    }

    #[must_use]
    pub fn reasoning_done(item_id: &str, output_index: u64, content_index: u64, text: &str) -> Self {
        let mut payload = content_position(item_id, output_index, content_index);
        payload.insert("text".to_string(), text.into());
        Self::new(StreamEventKind::ReasoningDone, payload)
    }

    #[must_use]
    pub fn reasoning_summary_text_delta(
        item_id: &str,
        output_index: u64,
        summary_index: u64,
        delta: &str,
    ) -> Self {
        let mut payload = summary_position(item_id, output_index, summary_index);
        payload.insert("delta".to_string(), delta.into());
        Self::new(StreamEventKind::ReasoningSummaryTextDelta, payload)
    }

    #[must_use]
    pub fn reasoning_summary_text_done(
        item_id: &str,
        output_index: u64,
        summary_index: u64,
        text: &str,
    ) -> Self {
        let mut payload = summary_position(item_id, output_index, summary_index);
        payload.insert("text".to_string(), text.into());
        Self::new(StreamEventKind::ReasoningSummaryTextDone, payload)
    }

    #[must_use]
    pub fn function_call_arguments_delta(item_id: &str, output_index: u64, delta: &str) -> Self {
        let mut payload = item_position(item_id, output_index);
        payload.insert("delta".to_string(), delta.into());
        Self::new(StreamEventKind::FunctionCallArgumentsDelta, payload)
    }

    #[must_use]
    pub fn function_call_arguments_done(
        item_id: &str,
        output_index: u64,
        name: &str,
        arguments: &str,
    ) -> Self {
        let mut payload = item_position(item_id, output_index);
        payload.insert("name".to_string(), name.into());
        payload.insert("arguments".to_string(), arguments.into());
        Self::new(StreamEventKind::FunctionCallArgumentsDone, payload)
    }

    #[must_use]
    pub fn error(code: &str, message: &str, param: Option<&str>) -> Self {
        let mut payload = AnyMap::new();
        payload.insert("code".to_string(), code.into());
        payload.insert("message".to_string(), message.into());
        if let Some(param) = param {
            payload.insert("param".to_string(), param.into());
        }
        Self::new(StreamEventKind::Error, payload)
    }

    #[must_use]
    pub fn done() -> Self {
        Self::new(StreamEventKind::Done, AnyMap::new())
    }
}

fn item_position(item_id: &str, output_index: u64) -> AnyMap {
    let mut payload = AnyMap::new();
    payload.insert("item_id".to_string(), item_id.into());
    payload.insert("output_index".to_string(), output_index.into());
    payload
}

fn content_position(item_id: &str, output_index: u64, content_index: u64) -> AnyMap {
    let mut payload = item_position(item_id, output_index);
    payload.insert("content_index".to_string(), content_index.into());
    payload
}

fn summary_position(item_id: &str, output_index: u64, summary_index: u64) -> AnyMap {
    let mut payload = item_position(item_id, output_index);
    payload.insert("summary_index".to_string(), summary_index.into());
    payload
}

impl Serialize for StreamEvent {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.type_str())?;
        if let Some(sequence_number) = self.sequence_number {
            map.serialize_entry("sequence_number", &sequence_number)?;
        }
        for (key, value) in &self.payload {
            if key != "type" && key != "sequence_number" {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StreamEvent {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = AnyValue::deserialize(deserializer)?;
        Self::from_value(value).map_err(D::Error::custom)
    }
}
