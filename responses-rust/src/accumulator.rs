use crate::{
    stream::{StreamEvent, StreamEventKind},
    AnyValue, ContentBlock, ContentKind, ItemStatus, JsonString, MessageItem, MessageRole,
    OutputItem, ReasoningItem, ReasoningSummaryPart, ResponseObject, ResponsesError,
    ResponsesResult, ToolCall,
};
use std::collections::BTreeMap;

/// Internal representation of one content part of a streamed message
#[derive(Debug, Clone)]
struct AccumulatedPart {
    block: ContentBlock,
    text: String,
    annotations: Vec<AnyValue>,
}

impl AccumulatedPart {
    fn new(kind: ContentKind) -> Self {
        Self {
            block: ContentBlock::new(kind, crate::AnyMap::new()),
            text: String::new(),
            annotations: Vec::new(),
        }
    }

    fn from_block(block: ContentBlock) -> Self {
        let text = block.text_value().unwrap_or_default().to_string();
        let annotations = block.annotations().to_vec();
        Self {
            block,
            text,
            annotations,
        }
    }
}

#[derive(Debug, Clone)]
struct AccumulatedMessage {
    id: String,
    role: MessageRole,
    parts: BTreeMap<u64, AccumulatedPart>,
}

#[derive(Debug, Clone)]
struct AccumulatedFunctionCall {
    id: String,
    call_id: String,
    name: String,
    arguments: String,
}

#[derive(Debug, Clone)]
struct AccumulatedReasoning {
    id: String,
    summary: BTreeMap<u64, String>,
    content: BTreeMap<u64, String>,
    encrypted_content: Option<String>,
}

/// Accumulated data for one output index
#[derive(Debug, Clone)]
enum AccumulatedItem {
    Message(AccumulatedMessage),
    FunctionCall(AccumulatedFunctionCall),
    Reasoning(AccumulatedReasoning),
    /// Delivered whole by `output_item.done`, or a kind that never streams.
    Finished(OutputItem),
}

impl AccumulatedItem {
    fn from_item(item: OutputItem) -> Self {
        match item {
            OutputItem::Message(message) => Self::Message(AccumulatedMessage {
                id: message.id,
                role: message.role,
                parts: message
                    .content
                    .into_iter()
                    .zip(0u64..)
                    .map(|(block, index)| (index, AccumulatedPart::from_block(block)))
                    .collect(),
            }),
            OutputItem::FunctionCall(call) => Self::FunctionCall(AccumulatedFunctionCall {
                id: call.id.unwrap_or_default(),
                call_id: call.call_id,
                name: call.name,
                arguments: call.arguments.to_wire_string(),
            }),
            OutputItem::Reasoning(reasoning) => Self::Reasoning(AccumulatedReasoning {
                id: reasoning.id,
                summary: reasoning
                    .summary
                    .into_iter()
                    .zip(0u64..)
                    .map(|(part, index)| (index, part.text))
                    .collect(),
                content: reasoning
                    .content
                    .unwrap_or_default()
                    .into_iter()
                    .zip(0u64..)
                    .map(|(block, index)| {
                        (index, block.text_value().unwrap_or_default().to_string())
                    })
                    .collect(),
                encrypted_content: reasoning.encrypted_content,
            }),
            other => Self::Finished(other),
        }
    }

    fn into_item(self, output_index: u64) -> ResponsesResult<OutputItem> {
        match self {
            Self::Message(message) => Ok(OutputItem::Message(MessageItem {
                id: message.id,
                role: message.role,
                content: message.parts.into_values().map(create_block).collect(),
                status: ItemStatus::InProgress,
            })),
            Self::FunctionCall(call) => {
                if call.call_id.is_empty() {
                    return Err(ResponsesError::Protocol(format!(
                        "Missing required field call_id at output index {output_index}"
                    )));
                }
                if call.name.is_empty() {
                    return Err(ResponsesError::Protocol(format!(
                        "Missing required field name at output index {output_index}"
                    )));
                }
                Ok(OutputItem::FunctionCall(ToolCall {
                    id: Some(call.id).filter(|id| !id.is_empty()),
                    call_id: call.call_id,
                    name: call.name,
                    arguments: JsonString::Raw(call.arguments),
                    status: ItemStatus::InProgress,
                }))
            }
            Self::Reasoning(reasoning) => {
                let content: Vec<_> = reasoning
                    .content
                    .into_values()
                    .map(ContentBlock::reasoning_text)
                    .collect();
                Ok(OutputItem::Reasoning(ReasoningItem {
                    id: reasoning.id,
                    summary: reasoning
                        .summary
                        .into_values()
                        .map(ReasoningSummaryPart::new)
                        .collect(),
                    content: Some(content).filter(|content| !content.is_empty()),
                    encrypted_content: reasoning.encrypted_content,
                }))
            }
            Self::Finished(item) => Ok(item),
        }
    }
}

fn create_block(part: AccumulatedPart) -> ContentBlock {
    let mut block = part.block;
    block.set_text(part.text);
    if block.kind == ContentKind::OutputText {
        block.fields.insert(
            "annotations".to_string(),
            AnyValue::Array(part.annotations),
        );
        block
            .fields
            .entry("logprobs")
            .or_insert_with(|| AnyValue::Array(Vec::new()));
    }
    block
}

fn type_mismatch(output_index: u64, kind: StreamEventKind) -> ResponsesError {
    ResponsesError::Protocol(format!(
        "Type mismatch at output index {output_index}: {kind} does not apply to the existing item"
    ))
}

fn required_index(event: &StreamEvent, index: Option<u64>, key: &str) -> ResponsesResult<u64> {
    index.ok_or_else(|| {
        ResponsesError::decode(format!("{} event is missing `{key}`", event.type_str()))
    })
}

/// Folds the events of one stream into a [`ResponseObject`].
///
/// A terminal snapshot (`response.completed`, `failed`, `incomplete`) is
/// returned as is. Otherwise the latest lifecycle snapshot is returned with
/// its output rebuilt from the items assembled so far, keyed by output index.
#[derive(Debug, Clone, Default)]
pub struct ResponseAccumulator {
    base: Option<ResponseObject>,
    terminal: Option<ResponseObject>,
    /// Map of output index to accumulated item, using `BTreeMap` for ordering
    items: BTreeMap<u64, AccumulatedItem>,
}

impl ResponseAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one event.
    ///
    /// # Errors
    /// Returns an error if an embedded snapshot or item fails to decode, a
    /// positional key is missing, or a delta targets an item of another type.
    pub fn add_event(&mut self, event: &StreamEvent) -> ResponsesResult<()> {
        if !event.is_known_event_type() {
            return Ok(());
        }
        let kind = event.kind();
        match kind {
            StreamEventKind::ResponseCreated
            | StreamEventKind::ResponseInProgress
            | StreamEventKind::ResponseQueued => {
                if let Some(response) = event.response()? {
                    self.base = Some(response);
                }
            }
            StreamEventKind::ResponseCompleted
            | StreamEventKind::ResponseFailed
            | StreamEventKind::ResponseIncomplete => {
                if let Some(response) = event.response()? {
                    self.terminal = Some(response);
                }
            }
            StreamEventKind::OutputItemAdded | StreamEventKind::OutputItemDone => {
                let output_index = required_index(event, event.output_index(), "output_index")?;
                let Some(item) = event.item()? else {
                    return Err(ResponsesError::decode(format!(
                        "{} event is missing `item`",
                        event.type_str()
                    )));
                };
                let accumulated = if kind == StreamEventKind::OutputItemDone {
                    AccumulatedItem::Finished(item)
                } else {
                    AccumulatedItem::from_item(item)
                };
                self.items.insert(output_index, accumulated);
            }
            StreamEventKind::ContentPartAdded => {
                let content_index = required_index(event, event.content_index(), "content_index")?;
                let part = event.part()?;
                let message = self.message_at(event, kind)?;
                if let (Some(message), Some(part)) = (message, part) {
                    message
                        .parts
                        .insert(content_index, AccumulatedPart::from_block(part));
                }
            }
            StreamEventKind::OutputTextDelta | StreamEventKind::RefusalDelta => {
                let delta = event.delta_text().unwrap_or_default().to_string();
                if let Some(part) = self.text_part_at(event, kind)? {
                    part.text.push_str(&delta);
                }
            }
            StreamEventKind::OutputTextDone | StreamEventKind::RefusalDone => {
                let text = event
                    .text()
                    .or_else(|| crate::any_value::string_at(&event.payload, "refusal"))
                    .map(str::to_string);
                if let (Some(part), Some(text)) = (self.text_part_at(event, kind)?, text) {
                    part.text = text;
                }
            }
            StreamEventKind::OutputTextAnnotationAdded => {
                let annotation = event.payload.get("annotation").cloned();
                if let (Some(part), Some(annotation)) =
                    (self.text_part_at(event, kind)?, annotation)
                {
                    part.annotations.push(annotation);
                }
            }
            StreamEventKind::FunctionCallArgumentsDelta => {
                let delta = event.delta_text().unwrap_or_default().to_string();
                if let Some(call) = self.function_call_at(event, kind)? {
                    call.arguments.push_str(&delta);
                }
            }
            StreamEventKind::FunctionCallArgumentsDone => {
                let arguments = event.arguments().map(str::to_string);
                let name = event.name().map(str::to_string);
                if let Some(call) = self.function_call_at(event, kind)? {
                    if let Some(arguments) = arguments {
                        call.arguments = arguments;
                    }
                    if let Some(name) = name {
                        call.name = name;
                    }
                }
            }
            StreamEventKind::ReasoningSummaryTextDelta | StreamEventKind::ReasoningSummaryTextDone => {
                let index = required_index(event, event.summary_index(), "summary_index")?;
                self.merge_reasoning(event, kind, index, true)?;
            }
            StreamEventKind::ReasoningTextDelta
            | StreamEventKind::ReasoningTextDone
            | StreamEventKind::ReasoningDelta
            | StreamEventKind::ReasoningDone => {
                let index = event.content_index().unwrap_or_default();
                self.merge_reasoning(event, kind, index, false)?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Computes the response from the accumulated events.
    ///
    /// # Errors
    /// Returns an error if no response snapshot was seen or an assembled item
    /// is missing a required field.
    pub fn compute_response(self) -> ResponsesResult<ResponseObject> {
        if let Some(terminal) = self.terminal {
            return Ok(terminal);
        }
        let mut response = self.base.ok_or_else(|| {
            ResponsesError::Protocol("No response snapshot received".to_string())
        })?;
        response.output = self
            .items
            .into_iter()
            .map(|(index, item)| item.into_item(index))
            .collect::<ResponsesResult<Vec<_>>>()?;
        Ok(response)
    }

    /// Clears all accumulated data
    pub fn clear(&mut self) {
        self.base = None;
        self.terminal = None;
        self.items.clear();
    }

    /// Gets the number of accumulated output items
    #[must_use]
    pub fn size(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The message at the event's output index, created from `item_id` when
    /// absent. `None` when the item was already finished.
    fn message_at(
        &mut self,
        event: &StreamEvent,
        kind: StreamEventKind,
    ) -> ResponsesResult<Option<&mut AccumulatedMessage>> {
        let output_index = required_index(event, event.output_index(), "output_index")?;
        let item = self.items.entry(output_index).or_insert_with(|| {
            AccumulatedItem::Message(AccumulatedMessage {
                id: event.item_id().unwrap_or_default().to_string(),
                role: MessageRole::Assistant,
                parts: BTreeMap::new(),
            })
        });
        match item {
            AccumulatedItem::Message(message) => Ok(Some(message)),
            AccumulatedItem::Finished(_) => Ok(None),
            _ => Err(type_mismatch(output_index, kind)),
        }
    }

    fn text_part_at(
        &mut self,
        event: &StreamEvent,
        kind: StreamEventKind,
    ) -> ResponsesResult<Option<&mut AccumulatedPart>> {
        let content_index = required_index(event, event.content_index(), "content_index")?;
        let part_kind = if matches!(
            kind,
            StreamEventKind::RefusalDelta | StreamEventKind::RefusalDone
        ) {
            ContentKind::Refusal
        } else {
            ContentKind::OutputText
        };
        Ok(self.message_at(event, kind)?.map(|message| {
            message
                .parts
                .entry(content_index)
                .or_insert_with(|| AccumulatedPart::new(part_kind))
        }))
    }

    fn function_call_at(
        &mut self,
        event: &StreamEvent,
        kind: StreamEventKind,
    ) -> ResponsesResult<Option<&mut AccumulatedFunctionCall>> {
        let output_index = required_index(event, event.output_index(), "output_index")?;
        let item = self.items.entry(output_index).or_insert_with(|| {
            AccumulatedItem::FunctionCall(AccumulatedFunctionCall {
                id: event.item_id().unwrap_or_default().to_string(),
                call_id: String::new(),
                name: String::new(),
                arguments: String::new(),
            })
        });
        match item {
            AccumulatedItem::FunctionCall(call) => Ok(Some(call)),
            AccumulatedItem::Finished(_) => Ok(None),
            _ => Err(type_mismatch(output_index, kind)),
        }
    }

    fn merge_reasoning(
        &mut self,
        event: &StreamEvent,
        kind: StreamEventKind,
        index: u64,
        summary: bool,
    ) -> ResponsesResult<()> {
        let output_index = required_index(event, event.output_index(), "output_index")?;
        let item = self.items.entry(output_index).or_insert_with(|| {
            AccumulatedItem::Reasoning(AccumulatedReasoning {
                id: event.item_id().unwrap_or_default().to_string(),
                summary: BTreeMap::new(),
                content: BTreeMap::new(),
                encrypted_content: None,
            })
        });
        let reasoning = match item {
            AccumulatedItem::Reasoning(reasoning) => reasoning,
            AccumulatedItem::Finished(_) => return Ok(()),
            _ => return Err(type_mismatch(output_index, kind)),
        };
        let target = if summary {
            reasoning.summary.entry(index).or_default()
        } else {
            reasoning.content.entry(index).or_default()
        };
        if let Some(delta) = event.delta_text() {
            target.push_str(delta);
        } else if let Some(text) = event.text() {
            target.clear();
            target.push_str(text);
        }
        Ok(())
    }
}
