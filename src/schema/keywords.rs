//! Static keyword classification tables.
//!
//! The graph builder, the column builder and the info panel all ask the same
//! questions about keyword names; they must get the same answers, so every
//! classification lives here as an immutable set.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Keywords whose value is a sub-schema (or a collection of them) that the
/// column browser can open as a new column, in display order.
///
/// The order is significant: it fixes both the visual grouping of a column
/// and the meaning of each entry's `idx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Keyword {
    Properties,
    PatternProperties,
    AdditionalProperties,
    PropertyNames,
    Items,
    AdditionalItems,
    Contains,
    AllOf,
    AnyOf,
    OneOf,
    Not,
    If,
    Then,
    Else,
}

/// How a keyword's value fans out into sub-schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `{name: schema, ...}`
    Map,
    /// `[schema, ...]`
    List,
    /// A single schema.
    Single,
    /// A single schema or a list of them (`items`).
    SingleOrList,
}

impl Keyword {
    /// All column keywords in display order.
    pub fn all() -> &'static [Keyword] {
        &[
            Keyword::Properties,
            Keyword::PatternProperties,
            Keyword::AdditionalProperties,
            Keyword::PropertyNames,
            Keyword::Items,
            Keyword::AdditionalItems,
            Keyword::Contains,
            Keyword::AllOf,
            Keyword::AnyOf,
            Keyword::OneOf,
            Keyword::Not,
            Keyword::If,
            Keyword::Then,
            Keyword::Else,
        ]
    }

    /// The keyword as written in a schema document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Properties => "properties",
            Keyword::PatternProperties => "patternProperties",
            Keyword::AdditionalProperties => "additionalProperties",
            Keyword::PropertyNames => "propertyNames",
            Keyword::Items => "items",
            Keyword::AdditionalItems => "additionalItems",
            Keyword::Contains => "contains",
            Keyword::AllOf => "allOf",
            Keyword::AnyOf => "anyOf",
            Keyword::OneOf => "oneOf",
            Keyword::Not => "not",
            Keyword::If => "if",
            Keyword::Then => "then",
            Keyword::Else => "else",
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            Keyword::Properties | Keyword::PatternProperties => Shape::Map,
            Keyword::AllOf | Keyword::AnyOf | Keyword::OneOf => Shape::List,
            Keyword::Items => Shape::SingleOrList,
            _ => Shape::Single,
        }
    }

    /// Whether entries under this keyword are named by the schema author
    /// rather than by position or by the keyword itself.
    pub fn has_named_members(&self) -> bool {
        self.shape() == Shape::Map
    }

    /// Whether this is a boolean combinator (`allOf`/`anyOf`/`oneOf`).
    pub fn is_retroactive(&self) -> bool {
        matches!(self, Keyword::AllOf | Keyword::AnyOf | Keyword::OneOf)
    }

    pub fn parse(s: &str) -> Option<Keyword> {
        Keyword::all().iter().copied().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

static SUPPORTED: Lazy<HashSet<&'static str>> =
    Lazy::new(|| Keyword::all().iter().map(Keyword::as_str).collect());

static RETROACTIVE: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["allOf", "anyOf", "oneOf"].into_iter().collect());

static JSON_SCHEMA_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "$comment",
        "$id",
        "$ref",
        "$schema",
        "additionalItems",
        "additionalProperties",
        "allOf",
        "anyOf",
        "const",
        "contains",
        "contentEncoding",
        "contentMediaType",
        "default",
        "definitions",
        "dependencies",
        "description",
        "else",
        "enum",
        "examples",
        "exclusiveMaximum",
        "exclusiveMinimum",
        "format",
        "if",
        "items",
        "maxItems",
        "maxLength",
        "maxProperties",
        "maximum",
        "minItems",
        "minLength",
        "minProperties",
        "minimum",
        "multipleOf",
        "not",
        "oneOf",
        "pattern",
        "patternProperties",
        "properties",
        "propertyNames",
        "readOnly",
        "required",
        "then",
        "title",
        "type",
        "uniqueItems",
        "writeOnly",
    ]
    .into_iter()
    .collect()
});

// Shown as their own fields in the info panel.
static ANNOTATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "$comment",
        "$id",
        "$ref",
        "$schema",
        "definitions",
        "description",
        "enum",
        "examples",
        "required",
        "title",
        "type",
    ]
    .into_iter()
    .collect()
});

/// Keywords that can open a new column.
pub fn is_supported_keyword(key: &str) -> bool {
    SUPPORTED.contains(key)
}

/// Boolean combinators, folded into their parent's column.
pub fn is_retro_keyword(key: &str) -> bool {
    RETROACTIVE.contains(key)
}

/// Any draft-07 keyword.
pub fn is_json_schema_keyword(key: &str) -> bool {
    JSON_SCHEMA_KEYWORDS.contains(key)
}

/// Validation keywords listed generically in the info panel: draft-07
/// keywords that neither open a column nor have a dedicated info field.
pub fn is_validation_keyword(key: &str) -> bool {
    is_json_schema_keyword(key) && !is_supported_keyword(key) && !ANNOTATIONS.contains(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_order_starts_with_properties() {
        let names: Vec<_> = Keyword::all().iter().map(Keyword::as_str).collect();
        assert_eq!(names[0], "properties");
        assert_eq!(names.len(), 14);
        let items = names.iter().position(|k| *k == "items").unwrap();
        let all_of = names.iter().position(|k| *k == "allOf").unwrap();
        let if_ = names.iter().position(|k| *k == "if").unwrap();
        assert!(items < all_of && all_of < if_);
    }

    #[test]
    fn test_parse_round_trips_names() {
        for keyword in Keyword::all() {
            assert_eq!(Keyword::parse(keyword.as_str()), Some(*keyword));
        }
        assert_eq!(Keyword::parse("definitions"), None);
    }

    #[test]
    fn test_classification() {
        assert!(is_supported_keyword("patternProperties"));
        assert!(!is_supported_keyword("definitions"));
        assert!(is_retro_keyword("oneOf"));
        assert!(!is_retro_keyword("not"));
        assert!(is_json_schema_keyword("$ref"));
        assert!(!is_json_schema_keyword("foo"));
        assert!(is_validation_keyword("minimum"));
        assert!(!is_validation_keyword("title"));
        assert!(!is_validation_keyword("items"));
    }

    #[test]
    fn test_serializes_as_schema_name() {
        let json = serde_json::to_string(&Keyword::PatternProperties).unwrap();
        assert_eq!(json, "\"patternProperties\"");
    }

    #[test]
    fn test_shapes() {
        assert_eq!(Keyword::Properties.shape(), Shape::Map);
        assert_eq!(Keyword::AnyOf.shape(), Shape::List);
        assert_eq!(Keyword::Items.shape(), Shape::SingleOrList);
        assert_eq!(Keyword::Not.shape(), Shape::Single);
        assert!(Keyword::PatternProperties.has_named_members());
        assert!(!Keyword::Items.has_named_members());
    }
}
