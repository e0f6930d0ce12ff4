mod common;

use open_responses::{
    stream::{
        reduce, reduce_message, ConversationMessage, ConversationStreamState, FileSearchPhase,
        ReasoningPhase, ResponsePhase, SseMessage, StreamEvent, StreamEventKind, ToolCallPhase,
        WebSearchPhase,
    },
    AnyMap, MessageRole, OutputItem, ResponseError, ResponseObject, ResponsesError,
};
use serde_json::{json, Value};

fn event(kind: StreamEventKind, payload: Value) -> StreamEvent {
    let payload: AnyMap = serde_json::from_value(payload).unwrap();
    StreamEvent::new(kind, payload)
}

fn fold(state: ConversationStreamState, events: &[StreamEvent]) -> ConversationStreamState {
    events
        .iter()
        .fold(state, |state, event| reduce(&state, event).unwrap())
}

#[test]
fn increasing_sequence_numbers_are_accepted() {
    let mut state = ConversationStreamState::default();
    for number in [0, 1, 2, 5, 6] {
        state
            .apply(&StreamEvent::output_text_delta("msg_1", 0, 0, "x").with_sequence_number(number))
            .unwrap();
    }
    assert_eq!(state.last_sequence_number, Some(6));
    assert_eq!(state.assistant_text(), Some("xxxxx"));
}

#[test]
fn regressed_sequence_number_is_rejected_without_changing_state() {
    let mut state = ConversationStreamState::default();
    state
        .apply(&StreamEvent::output_text_delta("msg_1", 0, 0, "a").with_sequence_number(0))
        .unwrap();
    state
        .apply(&StreamEvent::output_text_delta("msg_1", 0, 0, "b").with_sequence_number(2))
        .unwrap();
    let before = state.clone();

    let result = state.apply(&StreamEvent::output_text_delta("msg_1", 0, 0, "c").with_sequence_number(1));
    assert!(matches!(result, Err(ResponsesError::Protocol(_))));
    assert_eq!(state, before);
    assert_eq!(state.assistant_text(), Some("ab"));
}

#[test]
fn deltas_then_done_sentinel_complete_the_response() {
    let initial = ConversationStreamState::with_messages(vec![ConversationMessage::user("Hi")]);
    assert_eq!(initial.response_phase, ResponsePhase::AwaitingResponse);

    let first = reduce(&initial, &StreamEvent::output_text_delta("msg_1", 0, 0, "Hel")).unwrap();
    assert!(first.response_phase.is_streaming());
    let second = reduce(&first, &StreamEvent::output_text_delta("msg_1", 0, 0, "lo")).unwrap();
    let finished = reduce_message(&second, &SseMessage::Done).unwrap();

    assert_eq!(finished.messages.len(), 2);
    assert_eq!(finished.assistant_text(), Some("Hello"));
    assert_eq!(finished.response_phase, ResponsePhase::Completed);
    assert!(finished.closed);

    // The inputs are left as they were.
    assert_eq!(initial.messages.len(), 1);
    assert_eq!(first.assistant_text(), Some("Hel"));
}

#[test]
fn delta_object_after_user_message_starts_assistant_message() {
    let state = ConversationStreamState::with_messages(vec![ConversationMessage::user("Hello")]);
    let state = fold(
        state,
        &[event(StreamEventKind::OutputTextDelta, json!({ "delta": { "text": " world" } }))],
    );

    let last = state.messages.last().unwrap();
    assert_eq!(last.role, MessageRole::Assistant);
    assert_eq!(last.text, " world");
    assert!(state.response_phase.is_streaming());
}

#[test]
fn completed_response_replaces_streamed_text() {
    let state = fold(
        ConversationStreamState::with_messages(vec![ConversationMessage::user("Hi")]),
        &[StreamEvent::output_text_delta("msg_1", 0, 0, "partial")],
    );

    let response = common::completed_response("final answer");
    let state = fold(state, &[StreamEvent::response_completed(&response).unwrap()]);

    assert_eq!(state.messages.len(), 2);
    assert_eq!(state.assistant_text(), Some("final answer"));
    assert_eq!(state.response_phase, ResponsePhase::Completed);
    assert_eq!(state.response, Some(response));
}

#[test]
fn completed_response_keeps_each_message_item_separate() {
    let state = fold(
        ConversationStreamState::with_messages(vec![ConversationMessage::user("hi")]),
        &[
            StreamEvent::output_text_delta("msg_1", 0, 0, "A"),
            StreamEvent::output_text_delta("msg_2", 1, 0, "B"),
        ],
    );
    let response = ResponseObject::new("resp_1", "gpt-4.1", common::CREATED_AT).completed(
        common::CREATED_AT + 1,
        vec![OutputItem::message("msg_1", "A"), OutputItem::message("msg_2", "B")],
    );
    let state = fold(state, &[StreamEvent::response_completed(&response).unwrap()]);

    let texts: Vec<&str> = state.messages.iter().map(|message| message.text.as_str()).collect();
    assert_eq!(texts, vec!["hi", "A", "B"]);
    assert_eq!(state.messages[2].item_id.as_deref(), Some("msg_2"));
}

#[test]
fn first_delta_does_not_extend_an_earlier_assistant_turn() {
    let state = fold(
        ConversationStreamState::with_messages(vec![
            ConversationMessage::user("q"),
            ConversationMessage::assistant("Let me check."),
        ]),
        &[
            event(
                StreamEventKind::OutputItemAdded,
                json!({ "output_index": 0, "item": { "id": "msg_9", "type": "message", "role": "assistant", "content": [] } }),
            ),
            StreamEvent::output_text_delta("msg_9", 0, 0, "Sunny"),
        ],
    );

    let texts: Vec<&str> = state.messages.iter().map(|message| message.text.as_str()).collect();
    assert_eq!(texts, vec!["q", "Let me check.", "Sunny"]);

    let state = fold(
        ConversationStreamState::with_messages(vec![ConversationMessage::assistant("Earlier")]),
        &[event(StreamEventKind::OutputTextDelta, json!({ "delta": "Fresh" }))],
    );
    assert_eq!(state.messages.len(), 2);
    assert_eq!(state.assistant_text(), Some("Fresh"));
}

#[test]
fn failed_response_records_the_error_message() {
    let response = ResponseObject::new("resp_1", "gpt-4.1", common::CREATED_AT)
        .failed(ResponseError::new("server_error", "The model crashed"));
    let state = fold(
        ConversationStreamState::default(),
        &[StreamEvent::response_failed(&response).unwrap()],
    );
    assert_eq!(
        state.response_phase,
        ResponsePhase::Failed {
            message: Some("The model crashed".to_string())
        }
    );

    let state = fold(
        ConversationStreamState::default(),
        &[StreamEvent::error("rate_limit_exceeded", "Slow down", None)],
    );
    assert_eq!(
        state.response_phase,
        ResponsePhase::Failed {
            message: Some("Slow down".to_string())
        }
    );
}

#[test]
fn events_after_a_terminal_event_are_ignored() {
    let state = fold(
        ConversationStreamState::default(),
        &[
            StreamEvent::output_text_delta("msg_1", 0, 0, "Done."),
            StreamEvent::response_completed(&common::completed_response("Done.")).unwrap(),
            StreamEvent::output_text_delta("msg_1", 0, 0, " Extra"),
        ],
    );
    assert!(state.closed);
    assert_eq!(state.assistant_text(), Some("Done."));
}

#[test]
fn unrecognized_events_change_nothing() {
    let state = ConversationStreamState::with_messages(vec![ConversationMessage::user("Hi")]);
    let unknown = StreamEvent::from_value(json!({ "type": "response.hologram.delta", "delta": "x" }))
        .unwrap();
    let next = reduce(&state, &unknown).unwrap();
    assert_eq!(next, state);
}

#[test]
fn web_search_events_update_phase() {
    let state = fold(
        ConversationStreamState::default(),
        &[event(StreamEventKind::WebSearchCallInProgress, json!({}))],
    );
    assert_eq!(state.web_search_phase, WebSearchPhase::Initiated);

    let state = fold(state, &[event(StreamEventKind::WebSearchCallSearching, json!({}))]);
    assert_eq!(state.web_search_phase, WebSearchPhase::Searching);

    let state = fold(state, &[event(StreamEventKind::WebSearchCallCompleted, json!({}))]);
    assert_eq!(state.web_search_phase, WebSearchPhase::Completed);
}

#[test]
fn file_search_events_update_phase() {
    let mut state = ConversationStreamState::default();
    for (kind, expected) in [
        (StreamEventKind::FileSearchCallInProgress, FileSearchPhase::Preparing),
        (StreamEventKind::FileSearchCallSearching, FileSearchPhase::Searching),
        (StreamEventKind::FileSearchCallCompleted, FileSearchPhase::Completed),
    ] {
        state.apply(&event(kind, json!({}))).unwrap();
        assert_eq!(state.file_search_phase, expected);
    }
}

#[test]
fn reasoning_summary_events_update_phase() {
    let state = fold(
        ConversationStreamState::default(),
        &[event(StreamEventKind::ReasoningSummaryPartAdded, json!({}))],
    );
    assert_eq!(state.reasoning_phase, ReasoningPhase::Drafting);

    let state = fold(
        state,
        &[
            StreamEvent::reasoning_summary_text_delta("rs_1", 0, 0, "Checking"),
            StreamEvent::reasoning_summary_text_delta("rs_1", 0, 0, " inputs"),
        ],
    );
    assert_eq!(
        state.reasoning_phase,
        ReasoningPhase::Reasoning("Checking inputs".to_string())
    );

    let state = fold(
        state,
        &[StreamEvent::reasoning_summary_text_done("rs_1", 0, 0, "All good")],
    );
    assert_eq!(state.reasoning_phase, ReasoningPhase::Completed("All good".to_string()));
}

#[test]
fn function_call_argument_events_update_tool_phase() {
    let state = fold(
        ConversationStreamState::default(),
        &[event(
            StreamEventKind::FunctionCallArgumentsDelta,
            json!({ "name": "calendar", "delta": "{\"day\":" }),
        )],
    );
    assert_eq!(
        state.tool_call_phase,
        ToolCallPhase::Running {
            name: "calendar".to_string(),
            tool_type: "function".to_string()
        }
    );

    let state = fold(
        state,
        &[event(
            StreamEventKind::FunctionCallArgumentsDone,
            json!({ "arguments": "{\"day\":1}" }),
        )],
    );
    assert_eq!(
        state.tool_call_phase,
        ToolCallPhase::Completed {
            name: "calendar".to_string(),
            output: None
        }
    );
}

#[test]
fn reasoning_output_items_update_phase() {
    let state = fold(
        ConversationStreamState::default(),
        &[event(
            StreamEventKind::OutputItemAdded,
            json!({ "output_index": 0, "item": { "id": "rs_1", "type": "reasoning", "summary": ["Step 1"] } }),
        )],
    );
    assert_eq!(state.reasoning_phase, ReasoningPhase::Drafting);

    let state = fold(
        state,
        &[event(
            StreamEventKind::OutputItemDone,
            json!({ "output_index": 0, "item": { "id": "rs_1", "type": "reasoning", "summary": [{ "text": "Reasoned answer" }] } }),
        )],
    );
    assert_eq!(
        state.reasoning_phase,
        ReasoningPhase::Completed("Reasoned answer".to_string())
    );
}

#[test]
fn tool_output_items_update_phase() {
    let item = json!({ "id": "tc_1", "type": "function_call", "name": "browser" });
    let state = fold(
        ConversationStreamState::default(),
        &[event(
            StreamEventKind::OutputItemAdded,
            json!({ "output_index": 1, "item": item }),
        )],
    );
    assert_eq!(
        state.tool_call_phase,
        ToolCallPhase::Running {
            name: "browser".to_string(),
            tool_type: "function".to_string()
        }
    );

    let state = fold(
        state,
        &[event(
            StreamEventKind::OutputItemDone,
            json!({ "output_index": 1, "item": { "id": "tc_1", "type": "function_call" } }),
        )],
    );
    assert_eq!(
        state.tool_call_phase,
        ToolCallPhase::Completed {
            name: "browser".to_string(),
            output: None
        }
    );
}

#[test]
fn mcp_argument_events_use_the_announced_item() {
    let state = fold(
        ConversationStreamState::default(),
        &[
            event(
                StreamEventKind::OutputItemAdded,
                json!({ "output_index": 0, "item": { "id": "mcp_1", "type": "mcp_call", "name": "list_repos" } }),
            ),
            event(
                StreamEventKind::McpCallArgumentsDelta,
                json!({ "item_id": "mcp_1", "output_index": 0, "delta": "{" }),
            ),
        ],
    );
    assert_eq!(
        state.tool_call_phase,
        ToolCallPhase::Running {
            name: "list_repos".to_string(),
            tool_type: "mcp".to_string()
        }
    );
}

#[test]
fn item_done_message_replaces_text_for_its_item() {
    let state = fold(
        ConversationStreamState::default(),
        &[
            event(
                StreamEventKind::OutputItemAdded,
                json!({ "output_index": 0, "item": { "id": "msg_1", "type": "message", "role": "assistant", "content": [] } }),
            ),
            StreamEvent::output_text_delta("msg_1", 0, 0, "Draft"),
            event(
                StreamEventKind::OutputItemDone,
                json!({
                    "output_index": 0,
                    "item": {
                        "id": "msg_1",
                        "type": "message",
                        "role": "assistant",
                        "content": [{ "type": "output_text", "text": "Final" }]
                    }
                }),
            ),
        ],
    );
    assert_eq!(state.messages.len(), 1);
    assert_eq!(state.messages[0].item_id.as_deref(), Some("msg_1"));
    assert_eq!(state.assistant_text(), Some("Final"));
}

#[test]
fn close_keeps_a_finished_phase() {
    let mut state = ConversationStreamState::default();
    state
        .apply(&StreamEvent::response_incomplete(
            &ResponseObject::new("resp_1", "gpt-4.1", common::CREATED_AT).incomplete("max_output_tokens"),
        )
        .unwrap())
        .unwrap();
    state.close();
    assert_eq!(
        state.response_phase,
        ResponsePhase::Incomplete {
            reason: Some("max_output_tokens".to_string())
        }
    );
}
