/// Every event type string of the streaming protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamEventKind {
    ResponseCreated,
    ResponseInProgress,
    ResponseCompleted,
    ResponseFailed,
    ResponseIncomplete,
    ResponseQueued,
    OutputItemAdded,
    OutputItemDone,
    ContentPartAdded,
    ContentPartDone,
    OutputTextDelta,
    OutputTextDone,
    OutputTextAnnotationAdded,
    RefusalDelta,
    RefusalDone,
    FunctionCallArgumentsDelta,
    FunctionCallArgumentsDone,
    ReasoningDelta,
    ReasoningDone,
    ReasoningTextDelta,
    ReasoningTextDone,
    ReasoningSummaryPartAdded,
    ReasoningSummaryPartDone,
    ReasoningSummaryTextDelta,
    ReasoningSummaryTextDone,
    FileSearchCallInProgress,
    FileSearchCallSearching,
    FileSearchCallCompleted,
    WebSearchCallInProgress,
    WebSearchCallSearching,
    WebSearchCallCompleted,
    CodeInterpreterCallInProgress,
    CodeInterpreterCallInterpreting,
    CodeInterpreterCallCompleted,
    CodeInterpreterCallCodeDelta,
    CodeInterpreterCallCodeDone,
    ImageGenerationCallInProgress,
    ImageGenerationCallGenerating,
    ImageGenerationCallPartialImage,
    ImageGenerationCallCompleted,
    McpCallInProgress,
    McpCallCompleted,
    McpCallFailed,
    McpCallArgumentsDelta,
    McpCallArgumentsDone,
    McpListToolsInProgress,
    McpListToolsCompleted,
    McpListToolsFailed,
    CustomToolCallInputDelta,
    CustomToolCallInputDone,
    Error,
    Done,
}

impl StreamEventKind {
    pub const ALL: [Self; 52] = [
        Self::ResponseCreated,
        Self::ResponseInProgress,
        Self::ResponseCompleted,
        Self::ResponseFailed,
        Self::ResponseIncomplete,
        Self::ResponseQueued,
        Self::OutputItemAdded,
        Self::OutputItemDone,
        Self::ContentPartAdded,
        Self::ContentPartDone,
        Self::OutputTextDelta,
        Self::OutputTextDone,
        Self::OutputTextAnnotationAdded,
        Self::RefusalDelta,
        Self::RefusalDone,
        Self::FunctionCallArgumentsDelta,
        Self::FunctionCallArgumentsDone,
        Self::ReasoningDelta,
        Self::ReasoningDone,
        Self::ReasoningTextDelta,
        Self::ReasoningTextDone,
        Self::ReasoningSummaryPartAdded,
        Self::ReasoningSummaryPartDone,
        Self::ReasoningSummaryTextDelta,
        Self::ReasoningSummaryTextDone,
        Self::FileSearchCallInProgress,
        Self::FileSearchCallSearching,
        Self::FileSearchCallCompleted,
        Self::WebSearchCallInProgress,
        Self::WebSearchCallSearching,
        Self::WebSearchCallCompleted,
        Self::CodeInterpreterCallInProgress,
        Self::CodeInterpreterCallInterpreting,
        Self::CodeInterpreterCallCompleted,
        Self::CodeInterpreterCallCodeDelta,
        Self::CodeInterpreterCallCodeDone,
        Self::ImageGenerationCallInProgress,
        Self::ImageGenerationCallGenerating,
        Self::ImageGenerationCallPartialImage,
        Self::ImageGenerationCallCompleted,
        Self::McpCallInProgress,
        Self::McpCallCompleted,
        Self::McpCallFailed,
        Self::McpCallArgumentsDelta,
        Self::McpCallArgumentsDone,
        Self::McpListToolsInProgress,
        Self::McpListToolsCompleted,
        Self::McpListToolsFailed,
        Self::CustomToolCallInputDelta,
        Self::CustomToolCallInputDone,
        Self::Error,
        Self::Done,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ResponseCreated => "response.created",
            Self::ResponseInProgress => "response.in_progress",
            Self::ResponseCompleted => "response.completed",
            Self::ResponseFailed => "response.failed",
            Self::ResponseIncomplete => "response.incomplete",
            Self::ResponseQueued => "response.queued",
            Self::OutputItemAdded => "response.output_item.added",
            Self::OutputItemDone => "response.output_item.done",
            Self::ContentPartAdded => "response.content_part.added",
            Self::ContentPartDone => "response.content_part.done",
            Self::OutputTextDelta => "response.output_text.delta",
            Self::OutputTextDone => "response.output_text.done",
            Self::OutputTextAnnotationAdded => "response.output_text.annotation.added",
            Self::RefusalDelta => "response.refusal.delta",
            Self::RefusalDone => "response.refusal.done",
            Self::FunctionCallArgumentsDelta => "response.function_call_arguments.delta",
            Self::FunctionCallArgumentsDone => "response.function_call_arguments.done",
            Self::ReasoningDelta => "response.reasoning.delta",
            Self::ReasoningDone => "response.reasoning.done",
            Self::ReasoningTextDelta => "response.reasoning_text.delta",
            Self::ReasoningTextDone => "response.reasoning_text.done",
            Self::ReasoningSummaryPartAdded => "response.reasoning_summary_part.added",
            Self::ReasoningSummaryPartDone => "response.reasoning_summary_part.done",
            Self::ReasoningSummaryTextDelta => "response.reasoning_summary_text.delta",
            Self::ReasoningSummaryTextDone => "response.reasoning_summary_text.done",
            Self::FileSearchCallInProgress => "response.file_search_call.in_progress",
            Self::FileSearchCallSearching => "response.file_search_call.searching",
            Self::FileSearchCallCompleted => "response.file_search_call.completed",
            Self::WebSearchCallInProgress => "response.web_search_call.in_progress",
            Self::WebSearchCallSearching => "response.web_search_call.searching",
            Self::WebSearchCallCompleted => "response.web_search_call.completed",
            Self::CodeInterpreterCallInProgress => "response.code_interpreter_call.in_progress",
            Self::CodeInterpreterCallInterpreting => "response.code_interpreter_call.interpreting",
            Self::CodeInterpreterCallCompleted => "response.code_interpreter_call.completed",
            Self::CodeInterpreterCallCodeDelta => "response.code_interpreter_call_code.delta",
            Self::CodeInterpreterCallCodeDone => "response.code_interpreter_call_code.done",
            Self::ImageGenerationCallInProgress => "response.image_generation_call.in_progress",
            Self::ImageGenerationCallGenerating => "response.image_generation_call.generating",
            Self::ImageGenerationCallPartialImage => "response.image_generation_call.partial_image",
            Self::ImageGenerationCallCompleted => "response.image_generation_call.completed",
            Self::McpCallInProgress => "response.mcp_call.in_progress",
            Self::McpCallCompleted => "response.mcp_call.completed",
            Self::McpCallFailed => "response.mcp_call.failed",
            Self::McpCallArgumentsDelta => "response.mcp_call_arguments.delta",
            Self::McpCallArgumentsDone => "response.mcp_call_arguments.done",
            Self::McpListToolsInProgress => "response.mcp_list_tools.in_progress",
            Self::McpListToolsCompleted => "response.mcp_list_tools.completed",
            Self::McpListToolsFailed => "response.mcp_list_tools.failed",
            Self::CustomToolCallInputDelta => "response.custom_tool_call_input.delta",
            Self::CustomToolCallInputDone => "response.custom_tool_call_input.done",
            Self::Error => "error",
            Self::Done => "done",
        }
    }

    #[must_use]
    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    /// Kinds after which a stream carries nothing more.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::ResponseCompleted
                | Self::ResponseFailed
                | Self::ResponseIncomplete
                | Self::Error
                | Self::Done
        )
    }

    /// Lifecycle kinds whose payload carries a full `response` snapshot.
    #[must_use]
    pub fn carries_response(self) -> bool {
        matches!(
            self,
            Self::ResponseCreated
                | Self::ResponseInProgress
                | Self::ResponseCompleted
                | Self::ResponseFailed
                | Self::ResponseIncomplete
                | Self::ResponseQueued
        )
    }
}

impl std::fmt::Display for StreamEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
