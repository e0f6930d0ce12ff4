//! JSON Schema documents used for tool parameters and structured output.
//!
//! Only a subset of the vocabulary is modelled. A schema object that uses
//! keywords outside that subset is kept verbatim as [`JsonSchema::Raw`], so
//! decoding never drops information.
use crate::{any_value::kind_name, AnyMap, AnyValue, ResponsesError, ResponsesResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The primitive `type` keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Object,
    Array,
}

impl PrimitiveType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    #[must_use]
    pub fn from_wire(value: &str) -> Option<Self> {
        Some(match value {
            "string" => Self::String,
            "number" => Self::Number,
            "integer" => Self::Integer,
            "boolean" => Self::Boolean,
            "null" => Self::Null,
            "object" => Self::Object,
            "array" => Self::Array,
            _ => return None,
        })
    }
}

/// `additionalProperties` and the trailing `items` of a tuple accept either a
/// boolean or a nested schema.
#[derive(Debug, Clone, PartialEq)]
pub enum BoolOrSchema {
    Bool(bool),
    Schema(Box<JsonSchema>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsonSchema {
    String {
        min_length: Option<u64>,
        max_length: Option<u64>,
        pattern: Option<String>,
        format: Option<String>,
        enum_values: Option<Vec<String>>,
        description: Option<String>,
    },
    Number {
        minimum: Option<f64>,
        maximum: Option<f64>,
        description: Option<String>,
    },
    Integer {
        minimum: Option<i64>,
        maximum: Option<i64>,
        description: Option<String>,
    },
    Boolean {
        description: Option<String>,
    },
    Null {
        description: Option<String>,
    },
    Object {
        properties: BTreeMap<String, JsonSchema>,
        pattern_properties: BTreeMap<String, JsonSchema>,
        /// Order-insensitive; written sorted.
        required: BTreeSet<String>,
        additional_properties: Option<BoolOrSchema>,
        description: Option<String>,
    },
    Array {
        items: Option<Box<JsonSchema>>,
        min_items: Option<u64>,
        max_items: Option<u64>,
        description: Option<String>,
    },
    /// Fixed-position `prefixItems` followed by an optional trailing `items`.
    Tuple {
        prefix_items: Vec<JsonSchema>,
        items: Option<BoolOrSchema>,
        min_items: Option<u64>,
        max_items: Option<u64>,
        description: Option<String>,
    },
    Enum {
        values: Vec<AnyValue>,
        description: Option<String>,
    },
    Const {
        value: AnyValue,
        description: Option<String>,
    },
    /// A `type` array such as `["string", "null"]`.
    Union {
        types: Vec<PrimitiveType>,
        description: Option<String>,
    },
    AnyOf {
        schemas: Vec<JsonSchema>,
        description: Option<String>,
    },
    Not {
        schema: Box<JsonSchema>,
        description: Option<String>,
    },
    Conditional {
        if_schema: Box<JsonSchema>,
        then_schema: Option<Box<JsonSchema>>,
        else_schema: Option<Box<JsonSchema>>,
        description: Option<String>,
    },
    /// `$ref`, usually pointing into `$defs`.
    Reference {
        reference: String,
        description: Option<String>,
    },
    /// A root schema with reusable `$defs`.
    Document {
        root: Box<JsonSchema>,
        definitions: BTreeMap<String, JsonSchema>,
    },
    Raw(AnyMap),
}

const STRING_KEYS: &[&str] = &[
    "type",
    "minLength",
    "maxLength",
    "pattern",
    "format",
    "enum",
    "description",
];
const RANGE_KEYS: &[&str] = &["type", "minimum", "maximum", "description"];
const BARE_KEYS: &[&str] = &["type", "description"];
const OBJECT_KEYS: &[&str] = &[
    "type",
    "properties",
    "patternProperties",
    "required",
    "additionalProperties",
    "description",
];
const ARRAY_KEYS: &[&str] = &["type", "items", "minItems", "maxItems", "description"];
const TUPLE_KEYS: &[&str] = &[
    "type",
    "prefixItems",
    "items",
    "minItems",
    "maxItems",
    "description",
];

impl JsonSchema {
    #[must_use]
    pub fn string() -> Self {
        Self::String {
            min_length: None,
            max_length: None,
            pattern: None,
            format: None,
            enum_values: None,
            description: None,
        }
    }

    #[must_use]
    pub fn number() -> Self {
        Self::Number {
            minimum: None,
            maximum: None,
            description: None,
        }
    }

    #[must_use]
    pub fn integer() -> Self {
        Self::Integer {
            minimum: None,
            maximum: None,
            description: None,
        }
    }

    #[must_use]
    pub fn boolean() -> Self {
        Self::Boolean { description: None }
    }

    #[must_use]
    pub fn null() -> Self {
        Self::Null { description: None }
    }

    /// Object schema from `(name, schema)` pairs and required names.
    pub fn object<P, K, R, N>(properties: P, required: R) -> Self
    where
        P: IntoIterator<Item = (K, Self)>,
        K: Into<String>,
        R: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self::Object {
            properties: properties
                .into_iter()
                .map(|(name, schema)| (name.into(), schema))
                .collect(),
            pattern_properties: BTreeMap::new(),
            required: required.into_iter().map(Into::into).collect(),
            additional_properties: None,
            description: None,
        }
    }

    #[must_use]
    pub fn array(items: Self) -> Self {
        Self::Array {
            items: Some(Box::new(items)),
            min_items: None,
            max_items: None,
            description: None,
        }
    }

    #[must_use]
    pub fn tuple(prefix_items: Vec<Self>, items: Option<BoolOrSchema>) -> Self {
        Self::Tuple {
            prefix_items,
            items,
            min_items: None,
            max_items: None,
            description: None,
        }
    }

    #[must_use]
    pub fn enumeration(values: Vec<AnyValue>) -> Self {
        Self::Enum {
            values,
            description: None,
        }
    }

    #[must_use]
    pub fn constant(value: AnyValue) -> Self {
        Self::Const {
            value,
            description: None,
        }
    }

    #[must_use]
    pub fn union(types: Vec<PrimitiveType>) -> Self {
        Self::Union {
            types,
            description: None,
        }
    }

    #[must_use]
    pub fn any_of(schemas: Vec<Self>) -> Self {
        Self::AnyOf {
            schemas,
            description: None,
        }
    }

    #[must_use]
    pub fn not(schema: Self) -> Self {
        Self::Not {
            schema: Box::new(schema),
            description: None,
        }
    }

    #[must_use]
    pub fn conditional(if_schema: Self, then_schema: Option<Self>, else_schema: Option<Self>) -> Self {
        Self::Conditional {
            if_schema: Box::new(if_schema),
            then_schema: then_schema.map(Box::new),
            else_schema: else_schema.map(Box::new),
            description: None,
        }
    }

    pub fn reference(reference: impl Into<String>) -> Self {
        Self::Reference {
            reference: reference.into(),
            description: None,
        }
    }

    pub fn document<D, K>(root: Self, definitions: D) -> Self
    where
        D: IntoIterator<Item = (K, Self)>,
        K: Into<String>,
    {
        Self::Document {
            root: Box::new(root),
            definitions: definitions
                .into_iter()
                .map(|(name, schema)| (name.into(), schema))
                .collect(),
        }
    }

    /// Builds a union of alternatives: a `type` array when every branch is a
    /// bare primitive, `anyOf` otherwise.
    #[must_use]
    pub fn union_of(branches: Vec<Self>) -> Self {
        let primitives: Option<Vec<PrimitiveType>> =
            branches.iter().map(Self::bare_primitive).collect();
        match primitives {
            Some(types) if !types.is_empty() => Self::union(types),
            _ => Self::any_of(branches),
        }
    }

    #[must_use]
    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if let Self::Document { root, definitions } = self {
            return Self::Document {
                root: Box::new(root.with_description(text)),
                definitions,
            };
        }
        match &mut self {
            Self::Document { .. } => {}
            Self::Raw(map) => {
                map.insert("description".to_string(), AnyValue::String(text));
            }
            Self::String { description, .. }
            | Self::Number { description, .. }
            | Self::Integer { description, .. }
            | Self::Boolean { description }
            | Self::Null { description }
            | Self::Object { description, .. }
            | Self::Array { description, .. }
            | Self::Tuple { description, .. }
            | Self::Enum { description, .. }
            | Self::Const { description, .. }
            | Self::Union { description, .. }
            | Self::AnyOf { description, .. }
            | Self::Not { description, .. }
            | Self::Conditional { description, .. }
            | Self::Reference { description, .. } => *description = Some(text),
        }
        self
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Document { root, .. } => root.description(),
            Self::Raw(map) => map.get("description").and_then(AnyValue::as_str),
            Self::String { description, .. }
            | Self::Number { description, .. }
            | Self::Integer { description, .. }
            | Self::Boolean { description }
            | Self::Null { description }
            | Self::Object { description, .. }
            | Self::Array { description, .. }
            | Self::Tuple { description, .. }
            | Self::Enum { description, .. }
            | Self::Const { description, .. }
            | Self::Union { description, .. }
            | Self::AnyOf { description, .. }
            | Self::Not { description, .. }
            | Self::Conditional { description, .. }
            | Self::Reference { description, .. } => description.as_deref(),
        }
    }

    /// The primitive type of a schema that carries no constraints at all.
    fn bare_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Self::String {
                min_length: None,
                max_length: None,
                pattern: None,
                format: None,
                enum_values: None,
                description: None,
            } => Some(PrimitiveType::String),
            Self::Number {
                minimum: None,
                maximum: None,
                description: None,
            } => Some(PrimitiveType::Number),
            Self::Integer {
                minimum: None,
                maximum: None,
                description: None,
            } => Some(PrimitiveType::Integer),
            Self::Boolean { description: None } => Some(PrimitiveType::Boolean),
            Self::Null { description: None } => Some(PrimitiveType::Null),
            Self::Object {
                properties,
                pattern_properties,
                required,
                additional_properties: None,
                description: None,
            } if properties.is_empty() && pattern_properties.is_empty() && required.is_empty() => {
                Some(PrimitiveType::Object)
            }
            Self::Array {
                items: None,
                min_items: None,
                max_items: None,
                description: None,
            } => Some(PrimitiveType::Array),
            _ => None,
        }
    }

    /// Renders the schema as a JSON Schema object.
    #[must_use]
    pub fn to_wire(&self) -> AnyValue {
        AnyValue::Object(self.to_map())
    }

    fn to_map(&self) -> AnyMap {
        let mut map = AnyMap::new();
        match self {
            Self::String {
                min_length,
                max_length,
                pattern,
                format,
                enum_values,
                description: _,
            } => {
                put_type(&mut map, PrimitiveType::String);
                put(&mut map, "minLength", *min_length);
                put(&mut map, "maxLength", *max_length);
                put(&mut map, "pattern", pattern.clone());
                put(&mut map, "format", format.clone());
                put(&mut map, "enum", enum_values.clone());
            }
            Self::Number {
                minimum, maximum, ..
            } => {
                put_type(&mut map, PrimitiveType::Number);
                put(&mut map, "minimum", *minimum);
                put(&mut map, "maximum", *maximum);
            }
            Self::Integer {
                minimum, maximum, ..
            } => {
                put_type(&mut map, PrimitiveType::Integer);
                put(&mut map, "minimum", *minimum);
                put(&mut map, "maximum", *maximum);
            }
            Self::Boolean { .. } => put_type(&mut map, PrimitiveType::Boolean),
            Self::Null { .. } => put_type(&mut map, PrimitiveType::Null),
            Self::Object {
                properties,
                pattern_properties,
                required,
                additional_properties,
                ..
            } => {
                put_type(&mut map, PrimitiveType::Object);
                if !properties.is_empty() {
                    map.insert("properties".to_string(), schema_map_to_wire(properties));
                }
                if !pattern_properties.is_empty() {
                    map.insert(
                        "patternProperties".to_string(),
                        schema_map_to_wire(pattern_properties),
                    );
                }
                if !required.is_empty() {
                    map.insert(
                        "required".to_string(),
                        required.iter().cloned().map(AnyValue::String).collect(),
                    );
                }
                if let Some(additional) = additional_properties {
                    map.insert("additionalProperties".to_string(), additional.to_wire());
                }
            }
            Self::Array {
                items,
                min_items,
                max_items,
                ..
            } => {
                put_type(&mut map, PrimitiveType::Array);
                if let Some(items) = items {
                    map.insert("items".to_string(), items.to_wire());
                }
                put(&mut map, "minItems", *min_items);
                put(&mut map, "maxItems", *max_items);
            }
            Self::Tuple {
                prefix_items,
                items,
                min_items,
                max_items,
                ..
            } => {
                put_type(&mut map, PrimitiveType::Array);
                map.insert(
                    "prefixItems".to_string(),
                    prefix_items.iter().map(Self::to_wire).collect(),
                );
                if let Some(items) = items {
                    map.insert("items".to_string(), items.to_wire());
                }
                put(&mut map, "minItems", *min_items);
                put(&mut map, "maxItems", *max_items);
            }
            Self::Enum { values, .. } => {
                map.insert("enum".to_string(), AnyValue::Array(values.clone()));
            }
            Self::Const { value, .. } => {
                map.insert("const".to_string(), value.clone());
            }
            Self::Union { types, .. } => {
                map.insert(
                    "type".to_string(),
                    types
                        .iter()
                        .map(|t| AnyValue::String(t.as_str().to_string()))
                        .collect(),
                );
            }
            Self::AnyOf { schemas, .. } => {
                map.insert(
                    "anyOf".to_string(),
                    schemas.iter().map(Self::to_wire).collect(),
                );
            }
            Self::Not { schema, .. } => {
                map.insert("not".to_string(), schema.to_wire());
            }
            Self::Conditional {
                if_schema,
                then_schema,
                else_schema,
                ..
            } => {
                map.insert("if".to_string(), if_schema.to_wire());
                if let Some(then_schema) = then_schema {
                    map.insert("then".to_string(), then_schema.to_wire());
                }
                if let Some(else_schema) = else_schema {
                    map.insert("else".to_string(), else_schema.to_wire());
                }
            }
            Self::Reference { reference, .. } => {
                map.insert("$ref".to_string(), AnyValue::String(reference.clone()));
            }
            Self::Document { root, definitions } => {
                map = root.to_map();
                map.insert("$defs".to_string(), schema_map_to_wire(definitions));
                return map;
            }
            Self::Raw(raw) => return raw.clone(),
        }
        if let Some(description) = self.description() {
            map.insert(
                "description".to_string(),
                AnyValue::String(description.to_string()),
            );
        }
        map
    }

    /// Parses a JSON Schema object.
    pub fn from_wire(value: &AnyValue) -> ResponsesResult<Self> {
        let AnyValue::Object(map) = value else {
            return Err(ResponsesError::decode(format!(
                "Expected schema to be an object, got {}",
                kind_name(value)
            )));
        };
        Self::from_map(map)
    }

    fn from_map(map: &AnyMap) -> ResponsesResult<Self> {
        if let Some(defs) = map.get("$defs") {
            let mut root = map.clone();
            root.remove("$defs");
            return Ok(Self::Document {
                root: Box::new(Self::from_map(&root)?),
                definitions: schema_map_from_wire(defs, "$defs")?,
            });
        }

        let description = opt_string(map, "description")?;

        if let Some(prefix) = map.get("prefixItems") {
            if !only_keys(map, TUPLE_KEYS) || !type_is(map, PrimitiveType::Array, true) {
                return Ok(Self::Raw(map.clone()));
            }
            return Ok(Self::Tuple {
                prefix_items: schema_list(prefix, "prefixItems")?,
                items: map.get("items").map(BoolOrSchema::from_wire).transpose()?,
                min_items: opt_u64(map, "minItems")?,
                max_items: opt_u64(map, "maxItems")?,
                description,
            });
        }
        if let Some(branches) = map.get("anyOf") {
            if !only_keys(map, &["anyOf", "description"]) {
                return Ok(Self::Raw(map.clone()));
            }
            return Ok(Self::AnyOf {
                schemas: schema_list(branches, "anyOf")?,
                description,
            });
        }
        if let Some(negated) = map.get("not") {
            if !only_keys(map, &["not", "description"]) {
                return Ok(Self::Raw(map.clone()));
            }
            return Ok(Self::Not {
                schema: Box::new(Self::from_wire(negated)?),
                description,
            });
        }
        if let Some(condition) = map.get("if") {
            if !only_keys(map, &["if", "then", "else", "description"]) {
                return Ok(Self::Raw(map.clone()));
            }
            return Ok(Self::Conditional {
                if_schema: Box::new(Self::from_wire(condition)?),
                then_schema: map.get("then").map(Self::boxed_from_wire).transpose()?,
                else_schema: map.get("else").map(Self::boxed_from_wire).transpose()?,
                description,
            });
        }
        if map.contains_key("$ref") {
            if !only_keys(map, &["$ref", "description"]) {
                return Ok(Self::Raw(map.clone()));
            }
            return Ok(Self::Reference {
                reference: opt_string(map, "$ref")?.unwrap_or_default(),
                description,
            });
        }
        if let Some(value) = map.get("const") {
            if !only_keys(map, &["const", "description"]) {
                return Ok(Self::Raw(map.clone()));
            }
            return Ok(Self::Const {
                value: value.clone(),
                description,
            });
        }
        if let (Some(values), None) = (map.get("enum"), map.get("type")) {
            let AnyValue::Array(values) = values else {
                return Err(wrong_kind("enum", "array", values));
            };
            if !only_keys(map, &["enum", "description"]) {
                return Ok(Self::Raw(map.clone()));
            }
            return Ok(Self::Enum {
                values: values.clone(),
                description,
            });
        }

        match map.get("type") {
            Some(AnyValue::Array(names)) => {
                let types: Option<Vec<PrimitiveType>> = names
                    .iter()
                    .map(|name| name.as_str().and_then(PrimitiveType::from_wire))
                    .collect();
                match types {
                    Some(types) if only_keys(map, BARE_KEYS) => Ok(Self::Union { types, description }),
                    _ => Ok(Self::Raw(map.clone())),
                }
            }
            Some(AnyValue::String(name)) => match PrimitiveType::from_wire(name) {
                Some(primitive) => Self::typed_from_map(primitive, map, description),
                None => Ok(Self::Raw(map.clone())),
            },
            Some(other) => Err(wrong_kind("type", "string or array", other)),
            None => Ok(Self::Raw(map.clone())),
        }
    }

    fn typed_from_map(
        primitive: PrimitiveType,
        map: &AnyMap,
        description: Option<String>,
    ) -> ResponsesResult<Self> {
        let allowed = match primitive {
            PrimitiveType::String => STRING_KEYS,
            PrimitiveType::Number | PrimitiveType::Integer => RANGE_KEYS,
            PrimitiveType::Boolean | PrimitiveType::Null => BARE_KEYS,
            PrimitiveType::Object => OBJECT_KEYS,
            PrimitiveType::Array => ARRAY_KEYS,
        };
        if !only_keys(map, allowed) {
            return Ok(Self::Raw(map.clone()));
        }

        Ok(match primitive {
            PrimitiveType::String => Self::String {
                min_length: opt_u64(map, "minLength")?,
                max_length: opt_u64(map, "maxLength")?,
                pattern: opt_string(map, "pattern")?,
                format: opt_string(map, "format")?,
                enum_values: map
                    .get("enum")
                    .map(|values| string_list(values, "enum"))
                    .transpose()?,
                description,
            },
            PrimitiveType::Number => Self::Number {
                minimum: opt_f64(map, "minimum")?,
                maximum: opt_f64(map, "maximum")?,
                description,
            },
            PrimitiveType::Integer => Self::Integer {
                minimum: opt_i64(map, "minimum")?,
                maximum: opt_i64(map, "maximum")?,
                description,
            },
            PrimitiveType::Boolean => Self::Boolean { description },
            PrimitiveType::Null => Self::Null { description },
            PrimitiveType::Object => Self::Object {
                properties: map
                    .get("properties")
                    .map(|value| schema_map_from_wire(value, "properties"))
                    .transpose()?
                    .unwrap_or_default(),
                pattern_properties: map
                    .get("patternProperties")
                    .map(|value| schema_map_from_wire(value, "patternProperties"))
                    .transpose()?
                    .unwrap_or_default(),
                required: map
                    .get("required")
                    .map(|value| string_list(value, "required"))
                    .transpose()?
                    .unwrap_or_default()
                    .into_iter()
                    .collect(),
                additional_properties: map
                    .get("additionalProperties")
                    .map(BoolOrSchema::from_wire)
                    .transpose()?,
                description,
            },
            PrimitiveType::Array => Self::Array {
                items: map.get("items").map(Self::boxed_from_wire).transpose()?,
                min_items: opt_u64(map, "minItems")?,
                max_items: opt_u64(map, "maxItems")?,
                description,
            },
        })
    }

    fn boxed_from_wire(value: &AnyValue) -> ResponsesResult<Box<Self>> {
        Self::from_wire(value).map(Box::new)
    }
}

impl BoolOrSchema {
    #[must_use]
    pub fn to_wire(&self) -> AnyValue {
        match self {
            Self::Bool(flag) => AnyValue::Bool(*flag),
            Self::Schema(schema) => schema.to_wire(),
        }
    }

    pub fn from_wire(value: &AnyValue) -> ResponsesResult<Self> {
        match value {
            AnyValue::Bool(flag) => Ok(Self::Bool(*flag)),
            other => JsonSchema::from_wire(other).map(|schema| Self::Schema(Box::new(schema))),
        }
    }
}

impl From<JsonSchema> for BoolOrSchema {
    fn from(schema: JsonSchema) -> Self {
        Self::Schema(Box::new(schema))
    }
}

impl Serialize for JsonSchema {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for JsonSchema {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = AnyValue::deserialize(deserializer)?;
        Self::from_wire(&value).map_err(serde::de::Error::custom)
    }
}

fn put_type(map: &mut AnyMap, primitive: PrimitiveType) {
    map.insert(
        "type".to_string(),
        AnyValue::String(primitive.as_str().to_string()),
    );
}

fn put<T: Into<AnyValue>>(map: &mut AnyMap, key: &str, value: Option<T>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value.into());
    }
}

fn schema_map_to_wire(schemas: &BTreeMap<String, JsonSchema>) -> AnyValue {
    AnyValue::Object(
        schemas
            .iter()
            .map(|(name, schema)| (name.clone(), schema.to_wire()))
            .collect(),
    )
}

fn schema_map_from_wire(
    value: &AnyValue,
    key: &str,
) -> ResponsesResult<BTreeMap<String, JsonSchema>> {
    let AnyValue::Object(entries) = value else {
        return Err(wrong_kind(key, "object", value));
    };
    entries
        .iter()
        .map(|(name, schema)| Ok((name.clone(), JsonSchema::from_wire(schema)?)))
        .collect()
}

fn schema_list(value: &AnyValue, key: &str) -> ResponsesResult<Vec<JsonSchema>> {
    let AnyValue::Array(values) = value else {
        return Err(wrong_kind(key, "array", value));
    };
    values.iter().map(JsonSchema::from_wire).collect()
}

fn string_list(value: &AnyValue, key: &str) -> ResponsesResult<Vec<String>> {
    let AnyValue::Array(values) = value else {
        return Err(wrong_kind(key, "array", value));
    };
    values
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| wrong_kind(key, "array of strings", value))
        })
        .collect()
}

fn only_keys(map: &AnyMap, allowed: &[&str]) -> bool {
    map.keys().all(|key| allowed.contains(&key.as_str()))
}

fn type_is(map: &AnyMap, primitive: PrimitiveType, optional: bool) -> bool {
    match map.get("type").and_then(AnyValue::as_str) {
        Some(name) => name == primitive.as_str(),
        None => optional && !map.contains_key("type"),
    }
}

fn opt_string(map: &AnyMap, key: &str) -> ResponsesResult<Option<String>> {
    match map.get(key) {
        None => Ok(None),
        Some(AnyValue::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(wrong_kind(key, "string", other)),
    }
}

fn opt_u64(map: &AnyMap, key: &str) -> ResponsesResult<Option<u64>> {
    match map.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| wrong_kind(key, "non-negative integer", value)),
    }
}

fn opt_i64(map: &AnyMap, key: &str) -> ResponsesResult<Option<i64>> {
    match map.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_i64()
            .map(Some)
            .ok_or_else(|| wrong_kind(key, "integer", value)),
    }
}

fn opt_f64(map: &AnyMap, key: &str) -> ResponsesResult<Option<f64>> {
    match map.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| wrong_kind(key, "number", value)),
    }
}

fn wrong_kind(key: &str, expected: &str, actual: &AnyValue) -> ResponsesError {
    ResponsesError::decode(format!(
        "Schema keyword `{key}` must be {expected}, got {}",
        kind_name(actual)
    ))
}
