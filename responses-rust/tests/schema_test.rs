mod common;

use open_responses::{codec, BoolOrSchema, JsonSchema, PrimitiveType, ResponsesError};
use serde_json::json;

fn round_trip(schema: &JsonSchema) -> JsonSchema {
    let bytes = codec::encode(schema).unwrap();
    codec::decode(&bytes).unwrap()
}

#[test]
fn object_schema_round_trips() {
    let schema = common::weather_schema();
    assert_eq!(round_trip(&schema), schema);
}

#[test]
fn object_schema_wire_shape() {
    let wire = common::weather_schema().to_wire();
    assert_eq!(
        wire,
        json!({
            "type": "object",
            "properties": {
                "days": { "type": ["integer", "null"] },
                "location": { "type": "string", "description": "City name" },
                "unit": { "type": "string", "enum": ["c", "f"] }
            },
            "required": ["location"]
        })
    );
}

#[test]
fn structural_variants_round_trip() {
    let schemas = vec![
        JsonSchema::array(JsonSchema::number()),
        JsonSchema::tuple(
            vec![JsonSchema::string(), JsonSchema::integer()],
            Some(BoolOrSchema::Bool(false)),
        ),
        JsonSchema::enumeration(vec![json!("a"), json!(1), json!(null)]),
        JsonSchema::constant(json!({ "fixed": true })),
        JsonSchema::any_of(vec![JsonSchema::string(), JsonSchema::array(JsonSchema::string())]),
        JsonSchema::not(JsonSchema::null()),
        JsonSchema::conditional(
            JsonSchema::object([("kind", JsonSchema::constant(json!("a")))], ["kind"]),
            Some(JsonSchema::object(
                [("a", JsonSchema::boolean())],
                Vec::<String>::new(),
            )),
            None,
        ),
        JsonSchema::document(
            JsonSchema::reference("#/$defs/node"),
            [(
                "node",
                JsonSchema::object(
                    [(
                        "children",
                        JsonSchema::array(JsonSchema::reference("#/$defs/node")),
                    )],
                    Vec::<String>::new(),
                ),
            )],
        ),
    ];

    for schema in schemas {
        assert_eq!(round_trip(&schema), schema, "{}", schema.to_wire());
    }
}

#[test]
fn tuple_keeps_prefix_items_and_trailing_items() {
    let decoded = JsonSchema::from_wire(&json!({
        "type": "array",
        "prefixItems": [{ "type": "string" }, { "type": "number" }],
        "items": { "type": "boolean" },
        "minItems": 2
    }))
    .unwrap();

    match decoded {
        JsonSchema::Tuple {
            prefix_items,
            items: Some(BoolOrSchema::Schema(items)),
            min_items: Some(2),
            ..
        } => {
            assert_eq!(prefix_items, vec![JsonSchema::string(), JsonSchema::number()]);
            assert_eq!(*items, JsonSchema::boolean());
        }
        other => panic!("expected tuple, got {other:?}"),
    }
}

#[test]
fn union_of_prefers_type_array_for_bare_primitives() {
    assert_eq!(
        JsonSchema::union_of(vec![JsonSchema::string(), JsonSchema::null()]),
        JsonSchema::union(vec![PrimitiveType::String, PrimitiveType::Null])
    );

    let constrained = JsonSchema::union_of(vec![
        JsonSchema::string().with_description("name"),
        JsonSchema::null(),
    ]);
    assert!(matches!(constrained, JsonSchema::AnyOf { .. }));
}

#[test]
fn unmodelled_keywords_are_kept_verbatim() {
    let wire = json!({
        "type": "string",
        "contentEncoding": "base64",
        "x-internal": { "owner": "search" }
    });
    let schema = JsonSchema::from_wire(&wire).unwrap();
    assert!(matches!(schema, JsonSchema::Raw(_)));
    assert_eq!(schema.to_wire(), wire);
}

#[test]
fn description_follows_the_root_of_a_document() {
    let schema = JsonSchema::document(JsonSchema::string(), [("id", JsonSchema::integer())])
        .with_description("An identifier");
    assert_eq!(schema.description(), Some("An identifier"));
    assert_eq!(schema.to_wire()["description"], json!("An identifier"));
    assert_eq!(schema.to_wire()["$defs"]["id"], json!({ "type": "integer" }));
}

#[test]
fn wrong_kind_for_known_keyword_fails() {
    let error = JsonSchema::from_wire(&json!({ "type": "string", "minLength": "three" }))
        .unwrap_err();
    match error {
        ResponsesError::Decode(_) => {}
        other => panic!("expected decode error, got {other:?}"),
    }

    assert!(JsonSchema::from_wire(&json!("string")).is_err());
}
