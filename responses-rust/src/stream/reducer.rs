//! Folds stream events into conversation state for a UI layer.
//!
//! The reducer is pure: [`reduce`] returns a new state and leaves the input
//! untouched, and [`ConversationStreamState::apply`] either applies an event
//! completely or, on error, not at all.

use super::{SseMessage, StreamEvent, StreamEventKind};
use crate::{
    any_value::{array_at, object_at, string_at, text_of},
    AnyMap, AnyValue, MessageRole, OutputItem, ResponseObject, ResponsesError, ResponsesResult,
};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub text: String,
    /// Output item the text streamed into, when known.
    pub item_id: Option<String>,
}

impl ConversationMessage {
    #[must_use]
    pub fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            item_id: None,
        }
    }

    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, text)
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResponsePhase {
    #[default]
    AwaitingResponse,
    Streaming,
    Completed,
    Incomplete {
        reason: Option<String>,
    },
    Failed {
        message: Option<String>,
    },
}

impl ResponsePhase {
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Streaming)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Incomplete { .. } | Self::Failed { .. }
        )
    }
}

/// `Reasoning` carries the summary text streamed so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReasoningPhase {
    #[default]
    Idle,
    Drafting,
    Reasoning(String),
    Completed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ToolCallPhase {
    #[default]
    Idle,
    Running {
        name: String,
        tool_type: String,
    },
    Completed {
        name: String,
        output: Option<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WebSearchPhase {
    #[default]
    Idle,
    Initiated,
    Searching,
    Completed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FileSearchPhase {
    #[default]
    Idle,
    Preparing,
    Searching,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ToolIdentity {
    name: String,
    tool_type: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationStreamState {
    pub messages: Vec<ConversationMessage>,
    pub response_phase: ResponsePhase,
    pub reasoning_phase: ReasoningPhase,
    pub tool_call_phase: ToolCallPhase,
    pub web_search_phase: WebSearchPhase,
    pub file_search_phase: FileSearchPhase,
    /// Latest response snapshot carried by a lifecycle event.
    pub response: Option<ResponseObject>,
    pub last_sequence_number: Option<u64>,
    /// Set by a terminal event or `[DONE]`. Later events are ignored.
    pub closed: bool,
    tools_by_item: BTreeMap<String, ToolIdentity>,
    /// Index in `messages` of the assistant message this stream last wrote.
    streamed_message: Option<usize>,
}

/// Returns the state after `event`.
pub fn reduce(
    state: &ConversationStreamState,
    event: &StreamEvent,
) -> ResponsesResult<ConversationStreamState> {
    let mut next = state.clone();
    next.step(event)?;
    Ok(next)
}

/// Like [`reduce`], also accepting the `[DONE]` sentinel.
pub fn reduce_message(
    state: &ConversationStreamState,
    message: &SseMessage,
) -> ResponsesResult<ConversationStreamState> {
    match message {
        SseMessage::Event(event) => reduce(state, event),
        SseMessage::Done => {
            let mut next = state.clone();
            next.close();
            Ok(next)
        }
    }
}

impl ConversationStreamState {
    /// Starts from an existing transcript, waiting for the next response.
    #[must_use]
    pub fn with_messages(messages: Vec<ConversationMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Applies one event in place. On error the state is unchanged.
    pub fn apply(&mut self, event: &StreamEvent) -> ResponsesResult<()> {
        let mut next = self.clone();
        next.step(event)?;
        *self = next;
        Ok(())
    }

    /// Marks the stream ended. A response still awaiting or streaming counts
    /// as completed.
    pub fn close(&mut self) {
        if !self.response_phase.is_finished() {
            self.response_phase = ResponsePhase::Completed;
        }
        self.closed = true;
    }

    /// Text of the last assistant message.
    #[must_use]
    pub fn assistant_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == MessageRole::Assistant)
            .map(|message| message.text.as_str())
    }

    fn step(&mut self, event: &StreamEvent) -> ResponsesResult<()> {
        if self.closed {
            tracing::trace!(
                event_type = event.type_str(),
                "ignoring event after end of stream"
            );
            return Ok(());
        }

        if let Some(sequence_number) = event.sequence_number() {
            if let Some(last) = self.last_sequence_number {
                if sequence_number <= last {
                    tracing::warn!(sequence_number, last, "sequence number regressed");
                    return Err(ResponsesError::Protocol(format!(
                        "sequence number {sequence_number} does not follow {last}"
                    )));
                }
            }
            self.last_sequence_number = Some(sequence_number);
        }

        if !event.is_known_event_type() {
            tracing::debug!(
                event_type = event.type_str(),
                "ignoring unrecognized event type"
            );
            return Ok(());
        }

        match event.kind() {
            StreamEventKind::ResponseCreated
            | StreamEventKind::ResponseInProgress
            | StreamEventKind::ResponseQueued => {
                if let Some(response) = event.response()? {
                    self.response = Some(response);
                }
            }
            StreamEventKind::ResponseCompleted => {
                if let Some(response) = event.response()? {
                    self.apply_final_messages(&response);
                    self.response = Some(response);
                }
                self.response_phase = ResponsePhase::Completed;
                self.closed = true;
            }
            StreamEventKind::ResponseFailed => {
                let response = event.response()?;
                let message = response
                    .as_ref()
                    .and_then(|response| response.error.as_ref())
                    .and_then(|error| error.message.clone());
                if response.is_some() {
                    self.response = response;
                }
                self.response_phase = ResponsePhase::Failed { message };
                self.closed = true;
            }
            StreamEventKind::ResponseIncomplete => {
                let response = event.response()?;
                let reason = response
                    .as_ref()
                    .and_then(|response| response.incomplete_details.as_ref())
                    .and_then(|details| details.reason.clone());
                if let Some(response) = response {
                    self.apply_final_messages(&response);
                    self.response = Some(response);
                }
                self.response_phase = ResponsePhase::Incomplete { reason };
                self.closed = true;
            }
            StreamEventKind::Error => {
                let message = event.stream_error().and_then(|error| error.message);
                self.response_phase = ResponsePhase::Failed { message };
                self.closed = true;
            }
            StreamEventKind::Done => self.close(),

            StreamEventKind::OutputTextDelta | StreamEventKind::RefusalDelta => {
                let delta = event.delta_text().unwrap_or_default();
                self.append_assistant_text(event.item_id(), delta);
            }
            StreamEventKind::OutputTextDone | StreamEventKind::RefusalDone => {
                if let Some(text) = event
                    .text()
                    .or_else(|| string_at(&event.payload, "refusal"))
                {
                    self.replace_assistant_text(event.item_id(), text.to_string());
                }
            }

            StreamEventKind::OutputItemAdded => {
                if let Some(item) = object_at(&event.payload, "item") {
                    self.item_added(item);
                }
            }
            StreamEventKind::OutputItemDone => {
                if let Some(item) = object_at(&event.payload, "item") {
                    self.item_done(item);
                }
            }

            StreamEventKind::ReasoningSummaryPartAdded => {
                self.reasoning_phase = ReasoningPhase::Drafting;
            }
            StreamEventKind::ReasoningSummaryTextDelta
            | StreamEventKind::ReasoningTextDelta
            | StreamEventKind::ReasoningDelta => {
                let delta = event.delta_text().unwrap_or_default();
                self.reasoning_phase = match std::mem::take(&mut self.reasoning_phase) {
                    ReasoningPhase::Reasoning(mut text) => {
                        text.push_str(delta);
                        ReasoningPhase::Reasoning(text)
                    }
                    _ => ReasoningPhase::Reasoning(delta.to_string()),
                };
            }
            StreamEventKind::ReasoningSummaryTextDone
            | StreamEventKind::ReasoningTextDone
            | StreamEventKind::ReasoningDone
            | StreamEventKind::ReasoningSummaryPartDone => {
                let text = event
                    .text()
                    .or_else(|| event.payload.get("part").and_then(text_of))
                    .map(str::to_string);
                let summary = match (text, std::mem::take(&mut self.reasoning_phase)) {
                    (Some(text), _) => text,
                    (None, ReasoningPhase::Reasoning(text) | ReasoningPhase::Completed(text)) => {
                        text
                    }
                    (None, _) => String::new(),
                };
                self.reasoning_phase = ReasoningPhase::Completed(summary);
            }

            StreamEventKind::FunctionCallArgumentsDelta
            | StreamEventKind::McpCallArgumentsDelta
            | StreamEventKind::CustomToolCallInputDelta
            | StreamEventKind::McpCallInProgress => {
                let identity = self.tool_identity(event);
                self.tool_call_phase = ToolCallPhase::Running {
                    name: identity.name,
                    tool_type: identity.tool_type,
                };
            }
            StreamEventKind::FunctionCallArgumentsDone
            | StreamEventKind::McpCallArgumentsDone
            | StreamEventKind::CustomToolCallInputDone
            | StreamEventKind::McpCallCompleted
            | StreamEventKind::McpCallFailed => {
                let identity = self.tool_identity(event);
                self.tool_call_phase = ToolCallPhase::Completed {
                    name: identity.name,
                    output: None,
                };
            }
            StreamEventKind::CodeInterpreterCallInProgress
            | StreamEventKind::CodeInterpreterCallInterpreting
            | StreamEventKind::CodeInterpreterCallCodeDelta => {
                self.tool_call_phase = running_builtin("code_interpreter");
            }
            StreamEventKind::CodeInterpreterCallCompleted => {
                self.tool_call_phase = completed_builtin("code_interpreter");
            }
            StreamEventKind::ImageGenerationCallInProgress
            | StreamEventKind::ImageGenerationCallGenerating
            | StreamEventKind::ImageGenerationCallPartialImage => {
                self.tool_call_phase = running_builtin("image_generation");
            }
            StreamEventKind::ImageGenerationCallCompleted => {
                self.tool_call_phase = completed_builtin("image_generation");
            }

            StreamEventKind::WebSearchCallInProgress => {
                self.web_search_phase = WebSearchPhase::Initiated;
            }
            StreamEventKind::WebSearchCallSearching => {
                self.web_search_phase = WebSearchPhase::Searching;
            }
            StreamEventKind::WebSearchCallCompleted => {
                self.web_search_phase = WebSearchPhase::Completed;
            }
            StreamEventKind::FileSearchCallInProgress => {
                self.file_search_phase = FileSearchPhase::Preparing;
            }
            StreamEventKind::FileSearchCallSearching => {
                self.file_search_phase = FileSearchPhase::Searching;
            }
            StreamEventKind::FileSearchCallCompleted => {
                self.file_search_phase = FileSearchPhase::Completed;
            }

            StreamEventKind::ContentPartAdded
            | StreamEventKind::ContentPartDone
            | StreamEventKind::OutputTextAnnotationAdded
            | StreamEventKind::CodeInterpreterCallCodeDone
            | StreamEventKind::McpListToolsInProgress
            | StreamEventKind::McpListToolsCompleted
            | StreamEventKind::McpListToolsFailed => {}
        }
        Ok(())
    }

    /// Appends to the assistant message for `item_id`, or starts one.
    fn append_assistant_text(&mut self, item_id: Option<&str>, delta: &str) {
        match self.streamed_target(item_id) {
            Some(index) => {
                let message = &mut self.messages[index];
                message.text.push_str(delta);
                if message.item_id.is_none() {
                    message.item_id = item_id.map(str::to_string);
                }
                self.streamed_message = Some(index);
            }
            None => self.push_assistant(item_id, delta.to_string()),
        }
        self.response_phase = ResponsePhase::Streaming;
    }

    /// Overwrites the streamed text of `item_id` with its final text.
    fn replace_assistant_text(&mut self, item_id: Option<&str>, text: String) {
        match self.streamed_target(item_id) {
            Some(index) => {
                let message = &mut self.messages[index];
                message.text = text;
                if message.item_id.is_none() {
                    message.item_id = item_id.map(str::to_string);
                }
                self.streamed_message = Some(index);
            }
            None => self.push_assistant(item_id, text),
        }
    }

    /// Writes the final text of every message item in a terminal snapshot.
    fn apply_final_messages(&mut self, response: &ResponseObject) {
        for item in &response.output {
            if let OutputItem::Message(message) = item {
                let text = item.output_text();
                if !text.is_empty() {
                    self.replace_assistant_text(Some(&message.id), text);
                }
            }
        }
    }

    /// The message text for `item_id` belongs in. Only messages written by
    /// this stream are candidates, so an earlier transcript is never
    /// extended.
    fn streamed_target(&self, item_id: Option<&str>) -> Option<usize> {
        if let Some(item_id) = item_id {
            let matching = self.messages.iter().rposition(|message| {
                message.role == MessageRole::Assistant && message.item_id.as_deref() == Some(item_id)
            });
            if matching.is_some() {
                return matching;
            }
        }
        let index = self.streamed_message?;
        let message = self.messages.get(index)?;
        let continues = message.role == MessageRole::Assistant
            && (item_id.is_none() || message.item_id.is_none());
        continues.then_some(index)
    }

    fn push_assistant(&mut self, item_id: Option<&str>, text: String) {
        self.messages.push(ConversationMessage {
            role: MessageRole::Assistant,
            text,
            item_id: item_id.map(str::to_string),
        });
        self.streamed_message = Some(self.messages.len() - 1);
    }

    fn item_added(&mut self, item: &AnyMap) {
        let item_type = string_at(item, "type").unwrap_or_default();
        match item_type {
            "message" => self.response_phase = ResponsePhase::Streaming,
            "reasoning" => self.reasoning_phase = ReasoningPhase::Drafting,
            "web_search_call" => self.web_search_phase = WebSearchPhase::Initiated,
            "file_search_call" => self.file_search_phase = FileSearchPhase::Preparing,
            _ => {
                if let Some(tool_type) = tool_type_of(item_type) {
                    let identity = ToolIdentity {
                        name: string_at(item, "name").unwrap_or(tool_type).to_string(),
                        tool_type: tool_type.to_string(),
                    };
                    if let Some(id) = string_at(item, "id") {
                        self.tools_by_item.insert(id.to_string(), identity.clone());
                    }
                    self.tool_call_phase = ToolCallPhase::Running {
                        name: identity.name,
                        tool_type: identity.tool_type,
                    };
                }
            }
        }
    }

    fn item_done(&mut self, item: &AnyMap) {
        let item_type = string_at(item, "type").unwrap_or_default();
        match item_type {
            "message" => {
                let text = message_text(item);
                if !text.is_empty() {
                    self.replace_assistant_text(string_at(item, "id"), text);
                }
            }
            "reasoning" => {
                self.reasoning_phase = ReasoningPhase::Completed(summary_text(item));
            }
            "web_search_call" => self.web_search_phase = WebSearchPhase::Completed,
            "file_search_call" => self.file_search_phase = FileSearchPhase::Completed,
            _ => {
                if let Some(tool_type) = tool_type_of(item_type) {
                    let tracked = string_at(item, "id").and_then(|id| self.tools_by_item.get(id));
                    let name = string_at(item, "name")
                        .map(str::to_string)
                        .or_else(|| tracked.map(|identity| identity.name.clone()))
                        .unwrap_or_else(|| tool_type.to_string());
                    let output = item.get("output").and_then(AnyValue::as_str);
                    self.tool_call_phase = ToolCallPhase::Completed {
                        name,
                        output: output.map(str::to_string),
                    };
                }
            }
        }
    }

    /// Name and type for a tool event: explicit payload keys first, then the
    /// item announced by `output_item.added`, then the running call.
    fn tool_identity(&self, event: &StreamEvent) -> ToolIdentity {
        let tracked = event
            .item_id()
            .and_then(|item_id| self.tools_by_item.get(item_id));
        let running = match &self.tool_call_phase {
            ToolCallPhase::Running { name, tool_type } => Some((name, tool_type)),
            _ => None,
        };
        let name = event
            .name()
            .map(str::to_string)
            .or_else(|| tracked.map(|identity| identity.name.clone()))
            .or_else(|| running.map(|(name, _)| name.clone()))
            .unwrap_or_default();
        let tool_type = tracked
            .map(|identity| identity.tool_type.clone())
            .unwrap_or_else(|| default_tool_type(event.kind()).to_string());
        ToolIdentity { name, tool_type }
    }
}

fn tool_type_of(item_type: &str) -> Option<&'static str> {
    match item_type {
        "function_call" => Some("function"),
        "mcp_call" => Some("mcp"),
        "custom_tool_call" => Some("custom"),
        "code_interpreter_call" => Some("code_interpreter"),
        "image_generation_call" => Some("image_generation"),
        "computer_call" => Some("computer_use"),
        _ => None,
    }
}

fn default_tool_type(kind: StreamEventKind) -> &'static str {
    match kind {
        StreamEventKind::McpCallArgumentsDelta
        | StreamEventKind::McpCallArgumentsDone
        | StreamEventKind::McpCallInProgress
        | StreamEventKind::McpCallCompleted
        | StreamEventKind::McpCallFailed => "mcp",
        StreamEventKind::CustomToolCallInputDelta | StreamEventKind::CustomToolCallInputDone => {
            "custom"
        }
        _ => "function",
    }
}

fn running_builtin(tool_type: &str) -> ToolCallPhase {
    ToolCallPhase::Running {
        name: tool_type.to_string(),
        tool_type: tool_type.to_string(),
    }
}

fn completed_builtin(tool_type: &str) -> ToolCallPhase {
    ToolCallPhase::Completed {
        name: tool_type.to_string(),
        output: None,
    }
}

/// `output_text` blocks of a raw message item, concatenated.
fn message_text(item: &AnyMap) -> String {
    array_at(item, "content")
        .into_iter()
        .flatten()
        .filter_map(AnyValue::as_object)
        .filter(|block| string_at(block, "type") == Some("output_text"))
        .filter_map(|block| string_at(block, "text"))
        .collect()
}

/// Summary entries of a raw reasoning item, as strings or `{text}` objects.
fn summary_text(item: &AnyMap) -> String {
    array_at(item, "summary")
        .into_iter()
        .flatten()
        .filter_map(text_of)
        .collect::<Vec<_>>()
        .join("\n\n")
}
