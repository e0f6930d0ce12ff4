mod common;

use open_responses::{
    codec, AllowedTool, AnyMap, CodeInterpreterConfig, ContentBlock, ContentKind, FileSearchConfig,
    JsonString, ResponsesError, Tool, ToolCall, ToolChoice, ToolChoiceMode, WebSearchConfig,
    WireDirection,
};
use serde_json::json;

#[test]
fn output_text_defaults_missing_arrays() {
    let block: ContentBlock =
        codec::decode_value(json!({ "type": "output_text", "text": "Hi" })).unwrap();
    assert_eq!(block.kind, ContentKind::OutputText);
    assert_eq!(block.text_value(), Some("Hi"));
    assert!(block.annotations().is_empty());

    assert_eq!(
        codec::encode_to_value(&block).unwrap(),
        json!({ "type": "output_text", "text": "Hi", "annotations": [], "logprobs": [] })
    );
}

#[test]
fn text_blocks_require_their_text_key() {
    let result = codec::decode_value::<ContentBlock>(json!({ "type": "input_text" }));
    assert!(result.is_err());

    let result = codec::decode_value::<ContentBlock>(json!({ "type": "refusal", "refusal": 3 }));
    assert!(result.is_err());
}

#[test]
fn text_blocks_without_text_fail_to_encode() {
    let block = ContentBlock::new(ContentKind::OutputText, AnyMap::new());
    assert!(matches!(
        codec::encode_to_value(&block),
        Err(ResponsesError::Encode(_))
    ));

    let mut refusal = ContentBlock::new(ContentKind::Refusal, AnyMap::new());
    refusal.set_text("I can't help with that.");
    assert_eq!(
        codec::encode_to_value(&refusal).unwrap(),
        json!({ "type": "refusal", "refusal": "I can't help with that." })
    );

    let image = ContentBlock::new(ContentKind::InputImage, AnyMap::new());
    assert!(codec::encode_to_value(&image).is_ok());
}

#[test]
fn input_image_detail_defaults_to_auto() {
    let block: ContentBlock = codec::decode_value(json!({
        "type": "input_image",
        "image_url": "https://example.com/cat.png"
    }))
    .unwrap();
    assert_eq!(block.field("detail"), Some(&json!("auto")));
}

#[test]
fn unknown_content_block_is_preserved() {
    let wire = json!({ "type": "hologram", "frames": [1, 2, 3] });
    let block: ContentBlock = codec::decode_value(wire.clone()).unwrap();
    assert_eq!(block.kind, ContentKind::Other("hologram".to_string()));
    assert_eq!(codec::encode_to_value(&block).unwrap(), wire);
}

#[test]
fn set_text_replaces_the_text_key() {
    let mut block = ContentBlock::refusal("no");
    block.set_text("still no");
    assert_eq!(block.text_value(), Some("still no"));
    assert_eq!(block.field("refusal"), Some(&json!("still no")));
}

#[test]
fn function_tool_wire_shape() {
    let wire = codec::encode_to_value(&common::weather_tool()).unwrap();
    assert_eq!(wire["type"], json!("function"));
    assert_eq!(wire["name"], json!("get_weather"));
    assert_eq!(wire["description"], json!("Get the weather"));
    assert_eq!(wire["parameters"]["required"], json!(["location"]));

    let decoded: Tool = codec::decode_value(wire).unwrap();
    assert_eq!(decoded, common::weather_tool());
    assert_eq!(decoded.name(), Some("get_weather"));
}

#[test]
fn builtin_tools_with_and_without_config() {
    let bare: Tool = codec::decode_value(json!({ "type": "web_search" })).unwrap();
    assert_eq!(bare, Tool::WebSearch(None));
    assert_eq!(codec::encode_to_value(&bare).unwrap(), json!({ "type": "web_search" }));

    let configured: Tool = codec::decode_value(json!({
        "type": "web_search",
        "search_context_size": "high"
    }))
    .unwrap();
    match &configured {
        Tool::WebSearch(Some(config)) => assert!(config.search_context_size.is_some()),
        other => panic!("expected configured web search, got {other:?}"),
    }
    assert_eq!(
        codec::encode_to_value(&configured).unwrap(),
        json!({ "type": "web_search", "search_context_size": "high" })
    );
}

#[test]
fn empty_builtin_configs_normalize_to_none() {
    assert_eq!(Tool::web_search(WebSearchConfig::default()), Tool::WebSearch(None));
    assert_eq!(Tool::file_search(FileSearchConfig::default()), Tool::FileSearch(None));
    assert_eq!(
        Tool::code_interpreter(CodeInterpreterConfig::default()),
        Tool::CodeInterpreter(None)
    );

    let configured = Tool::file_search(FileSearchConfig {
        max_num_results: Some(5),
        ..FileSearchConfig::default()
    });
    let decoded: Tool = codec::decode_value(codec::encode_to_value(&configured).unwrap()).unwrap();
    assert_eq!(decoded, configured);

    let empty = Tool::WebSearch(Some(WebSearchConfig::default()));
    let decoded: Tool = codec::decode_value(codec::encode_to_value(&empty).unwrap()).unwrap();
    assert_eq!(decoded, Tool::web_search(WebSearchConfig::default()));
}

#[test]
fn unknown_tool_round_trips() {
    let wire = json!({ "type": "quantum_search", "qubits": 8 });
    let tool: Tool = codec::decode_value(wire.clone()).unwrap();
    assert_eq!(tool.tool_type(), "quantum_search");
    assert!(matches!(tool, Tool::Other { .. }));
    assert_eq!(codec::encode_to_value(&tool).unwrap(), wire);
}

#[test]
fn function_tool_choice_shape_depends_on_direction() {
    let choice = ToolChoice::function("get_weather");

    assert_eq!(
        choice.to_wire(WireDirection::Request).unwrap(),
        json!({ "type": "function", "function": { "name": "get_weather" } })
    );
    assert_eq!(
        choice.to_wire(WireDirection::Response).unwrap(),
        json!({ "type": "function", "name": "get_weather" })
    );

    for wire in [
        json!({ "type": "function", "function": { "name": "get_weather" } }),
        json!({ "type": "function", "name": "get_weather" }),
    ] {
        for direction in [WireDirection::Request, WireDirection::Response] {
            assert_eq!(ToolChoice::from_wire(&wire, direction).unwrap(), choice);
        }
    }
}

#[test]
fn mode_strings_decode_in_both_directions() {
    for (raw, expected) in [
        ("none", ToolChoice::None),
        ("auto", ToolChoice::Auto),
        ("required", ToolChoice::Required),
    ] {
        let wire = json!(raw);
        assert_eq!(ToolChoice::from_wire(&wire, WireDirection::Request).unwrap(), expected);
        assert_eq!(expected.to_wire(WireDirection::Response).unwrap(), wire);
    }

    assert!(ToolChoice::from_wire(&json!("sometimes"), WireDirection::Request).is_err());
    assert!(ToolChoice::from_wire(&json!({ "name": "x" }), WireDirection::Request).is_err());
    assert!(ToolChoice::from_wire(&json!({ "type": "function" }), WireDirection::Request).is_err());
}

#[test]
fn allowed_tools_requires_mode_in_responses() {
    let choice = ToolChoice::AllowedTools {
        tools: vec![AllowedTool::function("get_weather")],
        mode: None,
    };
    assert_eq!(
        choice.to_wire(WireDirection::Request).unwrap(),
        json!({
            "type": "allowed_tools",
            "tools": [{ "type": "function", "function": { "name": "get_weather" } }]
        })
    );
    assert!(choice.to_wire(WireDirection::Response).is_err());

    let wire = json!({ "type": "allowed_tools", "tools": [{ "type": "function", "name": "get_weather" }] });
    assert!(ToolChoice::from_wire(&wire, WireDirection::Response).is_err());
    assert_eq!(ToolChoice::from_wire(&wire, WireDirection::Request).unwrap(), choice);

    let with_mode = ToolChoice::AllowedTools {
        tools: vec![AllowedTool::function("get_weather")],
        mode: Some(ToolChoiceMode::Required),
    };
    let encoded = with_mode.to_wire(WireDirection::Response).unwrap();
    assert_eq!(encoded["mode"], json!("required"));
    assert_eq!(
        ToolChoice::from_wire(&encoded, WireDirection::Response).unwrap(),
        with_mode
    );
}

#[test]
fn tool_call_arguments_are_written_as_a_string() {
    let call = ToolCall::new("call_1", "get_weather", JsonString::Value(json!({ "location": "Paris" })))
        .with_id("fc_1");
    let wire = codec::encode_to_value(&call).unwrap();
    assert_eq!(
        wire,
        json!({
            "type": "function_call",
            "id": "fc_1",
            "call_id": "call_1",
            "name": "get_weather",
            "arguments": "{\"location\":\"Paris\"}",
            "status": "completed"
        })
    );

    let decoded: ToolCall = codec::decode_value(wire).unwrap();
    assert!(matches!(decoded.arguments, JsonString::Raw(_)));
    assert_eq!(decoded, call);
    assert_eq!(decoded.arguments.value().unwrap(), json!({ "location": "Paris" }));
}

#[test]
fn json_string_equality_is_semantic() {
    let spaced = JsonString::from("{ \"a\": 1, \"b\": [true] }");
    let compact = JsonString::from("{\"b\":[true],\"a\":1}");
    assert_eq!(spaced, compact);
    assert_ne!(spaced, JsonString::from("{\"a\":2}"));

    let plain = JsonString::Value(json!("already encoded"));
    assert_eq!(plain.to_wire_string(), "already encoded");
    assert!(JsonString::default().is_empty());
}
