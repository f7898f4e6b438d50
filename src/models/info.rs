//! Info panel for a selected entry.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::schema::keywords::is_validation_keyword;
use crate::schema::{meta, SchemaEntry, ValueType};

/// Everything the info panel shows about one entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryInfo {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    pub pointer: String,
    pub is_required: bool,
    /// Remaining validation keywords, in schema order.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub validations: IndexMap<String, String>,
}

impl EntryInfo {
    pub fn from_entry(entry: &SchemaEntry) -> Self {
        let schema = &entry.schema;

        let enum_values = schema
            .get("enum")
            .and_then(Value::as_array)
            .map(|values| values.iter().map(display).collect())
            .unwrap_or_default();

        let validations = schema
            .as_object()
            .map(|object| {
                object
                    .iter()
                    .filter(|(k, _)| is_validation_keyword(k))
                    .map(|(k, v)| (k.clone(), display(v)))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            title: meta::title(schema).unwrap_or_else(|| entry.name.clone()),
            value_type: ValueType::declared(schema),
            description: meta::description(schema),
            enum_values,
            examples: meta::examples(schema),
            required: meta::required(schema).unwrap_or_default(),
            pointer: entry.pointer(),
            is_required: entry.is_required,
            validations,
        }
    }
}

/// Strings as-is, anything else as compact JSON.
fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::{build_root_entries, Dereferencer};

    async fn first_child(schema: Value) -> SchemaEntry {
        let name = "doc".to_string();
        let roots = build_root_entries([(&name, &schema)], |s| Dereferencer::new(s.clone())).await;
        roots[0].expand().await.unwrap().remove(0)
    }

    #[tokio::test]
    async fn test_info_fields() {
        let entry = first_child(json!({
            "properties": {
                "age": {
                    "type": ["integer", "null"],
                    "description": "Age in years",
                    "minimum": 0,
                    "maximum": 150,
                    "examples": [42]
                }
            },
            "required": ["age"]
        }))
        .await;

        let info = EntryInfo::from_entry(&entry);
        assert_eq!(info.title, "age");
        assert_eq!(info.value_type.unwrap().to_string(), "integer, null");
        assert_eq!(info.description.as_deref(), Some("Age in years"));
        assert_eq!(info.examples, vec!["42"]);
        assert_eq!(info.pointer, "#/properties/age");
        assert!(info.is_required);

        let validations: Vec<_> = info.validations.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(validations, vec![("minimum", "0"), ("maximum", "150")]);
    }

    #[tokio::test]
    async fn test_enum_and_pattern() {
        let entry = first_child(json!({
            "properties": {
                "color": {"title": "Color", "enum": ["red", 1], "pattern": "^[a-z]+$", "format": "color"}
            }
        }))
        .await;

        let info = EntryInfo::from_entry(&entry);
        assert_eq!(info.title, "Color");
        assert_eq!(info.enum_values, vec!["red", "1"]);
        assert_eq!(info.value_type, None);
        assert!(!info.validations.contains_key("enum"));
        assert_eq!(info.validations["pattern"], "^[a-z]+$");
        assert_eq!(info.validations["format"], "color");
    }

    #[tokio::test]
    async fn test_column_keywords_are_not_validations() {
        let entry = first_child(json!({
            "properties": {"obj": {"properties": {"a": {}}, "required": ["a"], "minProperties": 1}}
        }))
        .await;

        let info = EntryInfo::from_entry(&entry);
        assert_eq!(info.required, vec!["a"]);
        assert_eq!(info.validations.keys().collect::<Vec<_>>(), vec!["minProperties"]);
    }
}
