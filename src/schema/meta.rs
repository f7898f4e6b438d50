//! Display metadata read off a schema object.

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

/// Declared `type` of a schema, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueType {
    Single(String),
    Union(Vec<String>),
}

impl ValueType {
    /// Shown when a schema declares no `type`.
    pub const IMPLICIT: &'static str = "object (implicit)";

    /// Read `type`, if declared in a recognizable form.
    pub fn declared(schema: &Value) -> Option<Self> {
        match schema.get("type")? {
            Value::String(s) => Some(ValueType::Single(s.clone())),
            Value::Array(items) => Some(ValueType::Union(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
            )),
            _ => None,
        }
    }

    /// Read `type`, defaulting to [`ValueType::IMPLICIT`].
    pub fn of(schema: &Value) -> Self {
        Self::declared(schema).unwrap_or_else(|| ValueType::Single(Self::IMPLICIT.to_string()))
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueType::Single(s) => f.write_str(s),
            ValueType::Union(types) => f.write_str(&types.join(", ")),
        }
    }
}

pub fn title(schema: &Value) -> Option<String> {
    schema.get("title").and_then(Value::as_str).map(str::to_string)
}

pub fn description(schema: &Value) -> Option<String> {
    schema
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// The `required` list, keeping only string members.
pub fn required(schema: &Value) -> Option<Vec<String>> {
    schema.get("required").and_then(Value::as_array).map(|names| {
        names
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    })
}

/// Normalize `examples` into display strings.
///
/// Arrays yield one string per element, any other object or `null` a single
/// pretty-printed string, strings and other primitives their plain text.
pub fn examples(schema: &Value) -> Vec<String> {
    match schema.get("examples") {
        None => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(pretty).collect(),
        Some(value @ (Value::Object(_) | Value::Null)) => vec![pretty(value)],
        Some(Value::String(s)) => vec![s.clone()],
        Some(other) => vec![other.to_string()],
    }
}

/// Tab-indented JSON.
pub fn pretty(value: &Value) -> String {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
    match serde::Serialize::serialize(value, &mut ser) {
        Ok(()) => String::from_utf8(buf).unwrap_or_else(|_| value.to_string()),
        Err(_) => value.to_string(),
    }
}
