mod common;

use open_responses::{
    stream::{StreamEvent, StreamEventKind},
    AnyMap, ContentBlock, ItemStatus, JsonString, MessageItem, MessageRole, OutputItem,
    ReasoningItem, ReasoningSummaryPart, ResponseAccumulator, ResponseObject, ResponsesError,
    ToolCall,
};
use serde_json::{json, Value};

fn event(kind: StreamEventKind, payload: Value) -> StreamEvent {
    let payload: AnyMap = serde_json::from_value(payload).unwrap();
    StreamEvent::new(kind, payload)
}

fn in_progress() -> ResponseObject {
    ResponseObject::new("resp_1", "gpt-4.1", common::CREATED_AT)
}

fn empty_message(id: &str) -> OutputItem {
    OutputItem::Message(MessageItem {
        id: id.to_string(),
        role: MessageRole::Assistant,
        content: Vec::new(),
        status: ItemStatus::InProgress,
    })
}

fn accumulate(events: &[StreamEvent]) -> ResponseAccumulator {
    let mut accumulator = ResponseAccumulator::new();
    for event in events {
        accumulator.add_event(event).unwrap();
    }
    accumulator
}

#[test]
fn assembles_items_by_output_index() {
    let annotation = json!({ "type": "url_citation", "url": "https://example.com" });
    let accumulator = accumulate(&[
        StreamEvent::response_created(&in_progress()).unwrap(),
        StreamEvent::output_item_added(1, &empty_message("msg_1")).unwrap(),
        StreamEvent::content_part_added("msg_1", 1, 0, &ContentBlock::output_text("")).unwrap(),
        StreamEvent::output_text_delta("msg_1", 1, 0, "Hel"),
        StreamEvent::output_text_delta("msg_1", 1, 0, "lo"),
        event(
            StreamEventKind::OutputTextAnnotationAdded,
            json!({ "item_id": "msg_1", "output_index": 1, "content_index": 0, "annotation_index": 0, "annotation": annotation.clone() }),
        ),
        StreamEvent::output_item_added(
            2,
            &OutputItem::function_call("fc_1", "call_1", "get_weather", ""),
        )
        .unwrap(),
        StreamEvent::function_call_arguments_delta("fc_1", 2, "{\"location\":"),
        StreamEvent::function_call_arguments_delta("fc_1", 2, "\"Paris\"}"),
        StreamEvent::reasoning_summary_text_delta("rs_1", 0, 0, "Look up "),
        StreamEvent::reasoning_summary_text_delta("rs_1", 0, 0, "the weather"),
    ]);
    assert_eq!(accumulator.size(), 3);

    let response = accumulator.compute_response().unwrap();
    assert_eq!(response.id, "resp_1");
    assert_eq!(
        response.output,
        vec![
            OutputItem::Reasoning(ReasoningItem {
                id: "rs_1".to_string(),
                summary: vec![ReasoningSummaryPart::new("Look up the weather")],
                content: None,
                encrypted_content: None,
            }),
            OutputItem::Message(MessageItem {
                id: "msg_1".to_string(),
                role: MessageRole::Assistant,
                content: vec![ContentBlock::output_text_with(
                    "Hello",
                    vec![annotation],
                    Vec::new()
                )],
                status: ItemStatus::InProgress,
            }),
            OutputItem::FunctionCall(ToolCall {
                id: Some("fc_1".to_string()),
                call_id: "call_1".to_string(),
                name: "get_weather".to_string(),
                arguments: JsonString::Raw("{\"location\":\"Paris\"}".to_string()),
                status: ItemStatus::InProgress,
            }),
        ]
    );
}

#[test]
fn done_events_replace_streamed_text() {
    let response = accumulate(&[
        StreamEvent::response_in_progress(&in_progress()).unwrap(),
        StreamEvent::output_text_delta("msg_1", 0, 0, "Helo"),
        StreamEvent::output_text_done("msg_1", 0, 0, "Hello"),
    ])
    .compute_response()
    .unwrap();

    assert_eq!(response.output_text(), "Hello");
    assert_eq!(response.output[0].id(), Some("msg_1"));
}

#[test]
fn output_item_done_wins_over_partial_item() {
    let finished = OutputItem::message("msg_1", "Final text");
    let response = accumulate(&[
        StreamEvent::response_created(&in_progress()).unwrap(),
        StreamEvent::output_item_added(0, &empty_message("msg_1")).unwrap(),
        StreamEvent::output_text_delta("msg_1", 0, 0, "Fin"),
        StreamEvent::output_item_done(0, &finished).unwrap(),
        StreamEvent::output_text_delta("msg_1", 0, 0, " ignored"),
    ])
    .compute_response()
    .unwrap();

    assert_eq!(response.output, vec![finished]);
}

#[test]
fn terminal_snapshot_is_returned_as_is() {
    let completed = common::completed_response("Server text");
    let response = accumulate(&[
        StreamEvent::response_created(&in_progress()).unwrap(),
        StreamEvent::output_text_delta("msg_1", 0, 0, "Streamed text"),
        StreamEvent::response_completed(&completed).unwrap(),
    ])
    .compute_response()
    .unwrap();

    assert_eq!(response, completed);
}

#[test]
fn missing_snapshot_is_a_protocol_error() {
    let accumulator = accumulate(&[StreamEvent::output_text_delta("msg_1", 0, 0, "Hi")]);
    assert!(matches!(
        accumulator.compute_response(),
        Err(ResponsesError::Protocol(_))
    ));
}

#[test]
fn function_call_without_call_id_is_a_protocol_error() {
    let accumulator = accumulate(&[
        StreamEvent::response_created(&in_progress()).unwrap(),
        StreamEvent::function_call_arguments_delta("fc_1", 0, "{}"),
    ]);
    match accumulator.compute_response() {
        Err(ResponsesError::Protocol(message)) => assert!(message.contains("call_id")),
        other => panic!("expected protocol error, got {other:?}"),
    }
}

#[test]
fn delta_for_another_item_type_is_rejected() {
    let mut accumulator = accumulate(&[
        StreamEvent::response_created(&in_progress()).unwrap(),
        StreamEvent::output_item_added(0, &OutputItem::function_call("fc_1", "call_1", "f", ""))
            .unwrap(),
    ]);

    let result = accumulator.add_event(&StreamEvent::output_text_delta("fc_1", 0, 0, "text"));
    assert!(matches!(result, Err(ResponsesError::Protocol(_))));

    let result = accumulator.add_event(&event(
        StreamEventKind::OutputTextDelta,
        json!({ "item_id": "fc_1", "delta": "no index" }),
    ));
    assert!(matches!(result, Err(ResponsesError::Decode(_))));
}

#[test]
fn unknown_events_are_ignored_and_clear_resets() {
    let mut accumulator = accumulate(&[
        StreamEvent::response_created(&in_progress()).unwrap(),
        StreamEvent::output_text_delta("msg_1", 0, 0, "Hi"),
    ]);
    accumulator
        .add_event(
            &StreamEvent::from_value(json!({ "type": "response.hologram.delta", "output_index": 0 }))
                .unwrap(),
        )
        .unwrap();
    assert_eq!(accumulator.size(), 1);

    accumulator.clear();
    assert!(accumulator.is_empty());
    assert!(accumulator.compute_response().is_err());
}
