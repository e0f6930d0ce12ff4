#![allow(dead_code)]

use open_responses::{
    stream::{encode_frame, Sequencer, StreamEvent, DONE_FRAME},
    JsonSchema, OutputItem, PrimitiveType, ResponseObject, Tool, Usage,
};
use serde_json::{json, Value};

pub const CREATED_AT: i64 = 1_741_476_542;

pub fn weather_schema() -> JsonSchema {
    JsonSchema::object(
        [
            ("location", JsonSchema::string().with_description("City name")),
            (
                "unit",
                JsonSchema::String {
                    min_length: None,
                    max_length: None,
                    pattern: None,
                    format: None,
                    enum_values: Some(vec!["c".to_string(), "f".to_string()]),
                    description: None,
                },
            ),
            ("days", JsonSchema::union(vec![PrimitiveType::Integer, PrimitiveType::Null])),
        ],
        ["location"],
    )
}

pub fn weather_tool() -> Tool {
    Tool::function("get_weather", Some("Get the weather"), weather_schema())
}

pub fn completed_response(text: &str) -> ResponseObject {
    ResponseObject::new("resp_1", "gpt-4.1", CREATED_AT)
        .completed(CREATED_AT + 3, vec![OutputItem::message("msg_1", text)])
        .with_usage(Usage::new(12, 4))
}

/// Wire JSON of a minimal valid response with every required key present.
pub fn response_json() -> Value {
    json!({
        "id": "resp_1",
        "object": "response",
        "created_at": CREATED_AT,
        "completed_at": null,
        "model": "gpt-4.1",
        "status": "in_progress",
        "incomplete_details": null,
        "usage": null,
        "instructions": null,
        "reasoning": null,
        "max_output_tokens": null,
        "max_tool_calls": null,
        "previous_response_id": null,
        "safety_identifier": null,
        "prompt_cache_key": null,
        "tools": [],
        "tool_choice": "auto",
        "truncation": "disabled",
        "parallel_tool_calls": false,
        "text": { "format": { "type": "text" }, "verbosity": "medium" },
        "output": [],
        "metadata": {},
        "temperature": 1.0,
        "top_p": 1.0,
        "frequency_penalty": 0.0,
        "presence_penalty": 0.0,
        "top_logprobs": 0,
        "store": false,
        "background": false,
        "service_tier": "default",
        "error": null
    })
}

/// The eleven keys that must be present but may be `null`.
pub const REQUIRED_NULLABLE_KEYS: [&str; 11] = [
    "completed_at",
    "incomplete_details",
    "usage",
    "instructions",
    "reasoning",
    "max_output_tokens",
    "max_tool_calls",
    "previous_response_id",
    "safety_identifier",
    "prompt_cache_key",
    "error",
];

/// Renders events as a byte stream ending in `[DONE]`.
pub fn sse_bytes(events: &[StreamEvent]) -> Vec<u8> {
    let sequencer = Sequencer::default();
    let mut bytes = Vec::new();
    for event in events {
        bytes.extend(encode_frame(event, &sequencer).unwrap());
    }
    bytes.extend_from_slice(DONE_FRAME);
    bytes
}

/// Splits bytes into chunks of `size` to exercise frame reassembly.
pub fn chunked(bytes: &[u8], size: usize) -> Vec<Result<Vec<u8>, std::io::Error>> {
    bytes.chunks(size).map(|chunk| Ok(chunk.to_vec())).collect()
}
