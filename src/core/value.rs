//! Purpose: Decode any JSON tree into an explicit, recursive dynamic value.
//! Exports: `GenericValue`, `JsonNode`, `JsonKind`, `decode_value`, `decode_value_with`.
//! Role: Fallback representation for payloads without a registered concrete type.
//! Invariants: Decoding is total; unknown node kinds degrade to `Null` via the diagnostic sink.
//! Invariants: Numbers keep their source literal; no range or precision limit applies.
//! Invariants: Duplicate object keys resolve last-write-wins.
use std::collections::BTreeMap;

use serde_json::{Number, Value};

use crate::core::diagnostic::{DiagnosticSink, TracingSink};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenericValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<GenericValue>),
    Mapping(BTreeMap<String, GenericValue>),
}

impl GenericValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            GenericValue::Null => "null",
            GenericValue::Bool(_) => "boolean",
            GenericValue::Number(_) => "number",
            GenericValue::String(_) => "string",
            GenericValue::Sequence(_) => "sequence",
            GenericValue::Mapping(_) => "mapping",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, GenericValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            GenericValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            GenericValue::Number(number) => Some(number),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::as_i64)
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_number().and_then(Number::as_u64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().and_then(Number::as_f64)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GenericValue::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[GenericValue]> {
        match self {
            GenericValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, GenericValue>> {
        match self {
            GenericValue::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up `key` when this value is a mapping.
    pub fn get(&self, key: &str) -> Option<&GenericValue> {
        self.as_mapping().and_then(|map| map.get(key))
    }
}

impl From<&Value> for GenericValue {
    fn from(value: &Value) -> Self {
        decode_value(value)
    }
}

/// View of one node in a parsed JSON tree.
///
/// `Unknown` exists for tree implementations that carry node kinds outside the
/// six JSON kinds; `serde_json::Value` never produces it.
pub enum JsonKind<'a, N: ?Sized + 'a> {
    Null,
    Bool(bool),
    Number(&'a Number),
    String(&'a str),
    Array(Box<dyn Iterator<Item = &'a N> + 'a>),
    Object(Box<dyn Iterator<Item = (&'a str, &'a N)> + 'a>),
    Unknown(String),
}

/// A parsed JSON tree the generic decoder can walk.
pub trait JsonNode {
    fn kind(&self) -> JsonKind<'_, Self>;
}

impl JsonNode for Value {
    fn kind(&self) -> JsonKind<'_, Self> {
        match self {
            Value::Null => JsonKind::Null,
            Value::Bool(value) => JsonKind::Bool(*value),
            Value::Number(number) => JsonKind::Number(number),
            Value::String(text) => JsonKind::String(text.as_str()),
            Value::Array(items) => JsonKind::Array(Box::new(items.iter())),
            Value::Object(map) => JsonKind::Object(Box::new(
                map.iter().map(|(key, value)| (key.as_str(), value)),
            )),
        }
    }
}

/// Decodes `node`, reporting unknown node kinds through `tracing`.
pub fn decode_value<N: JsonNode + ?Sized>(node: &N) -> GenericValue {
    decode_value_with(node, &TracingSink)
}

pub fn decode_value_with<N: JsonNode + ?Sized>(
    node: &N,
    sink: &dyn DiagnosticSink,
) -> GenericValue {
    match node.kind() {
        JsonKind::Null => GenericValue::Null,
        JsonKind::Bool(value) => GenericValue::Bool(value),
        JsonKind::Number(number) => GenericValue::Number(number.clone()),
        JsonKind::String(text) => GenericValue::String(text.to_string()),
        JsonKind::Array(items) => {
            GenericValue::Sequence(items.map(|item| decode_value_with(item, sink)).collect())
        }
        JsonKind::Object(entries) => GenericValue::Mapping(decode_entries(entries, sink)),
        JsonKind::Unknown(description) => {
            sink.unknown_node(&description);
            GenericValue::Null
        }
    }
}

/// Decodes object entries into a mapping; later duplicates overwrite earlier ones.
pub(crate) fn decode_entries<'a, N, I>(
    entries: I,
    sink: &dyn DiagnosticSink,
) -> BTreeMap<String, GenericValue>
where
    N: JsonNode + ?Sized + 'a,
    I: Iterator<Item = (&'a str, &'a N)>,
{
    let mut map = BTreeMap::new();
    for (key, value) in entries {
        map.insert(key.to_string(), decode_value_with(value, sink));
    }
    map
}
