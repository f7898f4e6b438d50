//! Per-column expansion of a schema into navigable entries.
//!
//! Given one selected [`SchemaEntry`], [`build_schema_entries`] produces the
//! next column: every sub-schema reachable through a column keyword, in fixed
//! keyword order, each dereferenced and decorated independently. Nothing
//! beyond the requested column is built, so self-referential schemas expand
//! exactly as deep as the user navigates.

use std::collections::HashSet;

use futures::future::join_all;
use serde::Serialize;
use serde_json::{Map, Value};

use super::deref::Dereferencer;
use super::keywords::{is_retro_keyword, is_supported_keyword, Keyword, Shape};
use super::meta;
use super::uri::{name_from_ref, to_json_pointer};
use crate::error::{AppError, DerefError};

/// One row of a column.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaEntry {
    /// Raw property or keyword name in the parent schema.
    pub key: String,
    /// Title, else the last `$ref` segment, else the key.
    pub name: String,
    /// The entry's schema with its `$ref` target merged in.
    pub schema: Value,
    /// Pointer-style segments from the document root.
    pub path: Vec<String>,
    /// Row index within the column.
    pub idx: usize,
    /// Keyword this entry came from; `None` for document roots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<Keyword>,
    /// Whether selecting this entry opens a non-empty column.
    pub has_children: bool,
    /// Whether the parent lists this property in `required`.
    pub is_required: bool,
    #[serde(skip)]
    deref: Dereferencer,
}

impl SchemaEntry {
    /// The resolver bound to this entry's document.
    pub fn dereferencer(&self) -> &Dereferencer {
        &self.deref
    }

    /// `path` as a JSON pointer fragment.
    pub fn pointer(&self) -> String {
        to_json_pointer(&self.path)
    }

    /// Build the column opened by selecting this entry.
    pub async fn expand(&self) -> Result<Vec<SchemaEntry>, AppError> {
        build_schema_entries(self).await
    }
}

/// Inputs for decorating one entry.
#[derive(Debug, Clone)]
pub struct EntryParams<'a> {
    pub key: String,
    pub schema: Value,
    pub group: Option<Keyword>,
    /// Parent's `required` list.
    pub required: Option<&'a [String]>,
    /// Parent's path.
    pub parent_path: &'a [String],
    /// Segments leading from the parent to this entry.
    pub segments: Vec<String>,
    pub idx: usize,
    pub deref: Dereferencer,
}

/// Turn a (key, schema) pair into a decorated entry.
///
/// Runs the fixed decoration pipeline: dereference, name, children flag,
/// required flag, path, index and group.
pub async fn build_schema_entry(params: EntryParams<'_>) -> SchemaEntry {
    let EntryParams {
        key,
        schema,
        group,
        required,
        parent_path,
        segments,
        idx,
        deref,
    } = params;

    let (schema, deref) = deref_entry_schema(deref, schema, &key).await;
    let name = display_name(&schema, &key);
    let has_children = has_children(&schema);
    let is_required = group == Some(Keyword::Properties)
        && required.is_some_and(|names| names.iter().any(|n| *n == key));

    let mut path = parent_path.to_vec();
    path.extend(segments);

    SchemaEntry {
        key,
        name,
        schema,
        path,
        idx,
        group,
        has_children,
        is_required,
        deref,
    }
}

/// Build one root entry per named document, each with its own dereferencer.
///
/// `make_deref` binds a dereferencer to each document's root.
pub async fn build_root_entries<'a, I, F>(schemas: I, make_deref: F) -> Vec<SchemaEntry>
where
    I: IntoIterator<Item = (&'a String, &'a Value)>,
    F: Fn(&Value) -> Dereferencer,
{
    let builds = schemas
        .into_iter()
        .enumerate()
        .map(|(idx, (name, schema))| {
            build_schema_entry(EntryParams {
                key: name.clone(),
                schema: schema.clone(),
                group: None,
                required: None,
                parent_path: &[],
                segments: Vec::new(),
                idx,
                deref: make_deref(schema),
            })
        })
        .collect::<Vec<_>>();

    join_all(builds).await
}

/// Build the column of children of `parent`.
///
/// Fails only if the parent's schema is not a schema object; a boolean
/// schema has nothing to show and yields an empty column.
pub async fn build_schema_entries(parent: &SchemaEntry) -> Result<Vec<SchemaEntry>, AppError> {
    let parent_schema = match &parent.schema {
        Value::Object(map) => map,
        Value::Bool(_) => return Ok(Vec::new()),
        other => {
            tracing::debug!(pointer = %parent.pointer(), "Parent schema is not a schema");
            return Err(AppError::NotASchema(other.to_string()));
        }
    };

    let required = meta::required(&parent.schema);
    let candidates = collect_candidates(parent_schema);

    let builds = candidates
        .into_iter()
        .enumerate()
        .map(|(idx, candidate)| {
            build_schema_entry(EntryParams {
                key: candidate.key,
                schema: candidate.schema.clone(),
                group: Some(candidate.group),
                required: required.as_deref(),
                parent_path: &parent.path,
                segments: candidate.segments,
                idx,
                deref: parent.deref.clone(),
            })
        })
        .collect::<Vec<_>>();

    Ok(join_all(builds).await)
}

/// A sub-schema found under one of the parent's column keywords.
#[derive(Debug)]
struct Candidate<'a> {
    key: String,
    schema: &'a Value,
    group: Keyword,
    segments: Vec<String>,
}

/// Extract displayable sub-schemas in keyword order, folding pure
/// combinator schemas into their members.
fn collect_candidates(parent: &Map<String, Value>) -> Vec<Candidate<'_>> {
    let mut candidates = Vec::new();

    for &keyword in Keyword::all() {
        let Some(value) = parent.get(keyword.as_str()) else {
            continue;
        };
        let name = keyword.as_str().to_string();

        let members: Vec<(String, Vec<String>, &Value)> = match (keyword.shape(), value) {
            (Shape::Map, Value::Object(map)) => map
                .iter()
                .map(|(k, v)| (k.clone(), vec![name.clone(), k.clone()], v))
                .collect(),
            (Shape::List | Shape::SingleOrList, Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), vec![name.clone(), i.to_string()], v))
                .collect(),
            (Shape::Single | Shape::SingleOrList, v) => vec![(name.clone(), vec![name.clone()], v)],
            _ => Vec::new(),
        };

        for (key, segments, schema) in members {
            if !is_displayable(schema) {
                continue;
            }

            if !keyword.has_named_members() && is_foldable(schema) {
                candidates.extend(fold_members(schema, keyword, &segments));
                continue;
            }

            candidates.push(Candidate {
                key,
                schema,
                group: keyword,
                segments,
            });
        }
    }

    candidates
}

/// Members of a pure combinator schema, grouped under the outer keyword.
fn fold_members<'a>(schema: &'a Value, group: Keyword, segments: &[String]) -> Vec<Candidate<'a>> {
    let Some(object) = schema.as_object() else {
        return Vec::new();
    };

    object
        .iter()
        .filter_map(|(combinator, members)| Some((combinator, members.as_array()?)))
        .flat_map(|(combinator, members)| {
            members
                .iter()
                .enumerate()
                .filter(|(_, member)| is_displayable(member))
                .map(move |(i, member)| {
                    let mut path = segments.to_vec();
                    path.push(combinator.clone());
                    path.push(i.to_string());
                    Candidate {
                        key: i.to_string(),
                        schema: member,
                        group,
                        segments: path,
                    }
                })
        })
        .collect()
}

/// Booleans and empty objects have nothing to display.
fn is_displayable(schema: &Value) -> bool {
    schema.as_object().is_some_and(|m| !m.is_empty())
}

/// A schema made only of combinators, without its own title or `$ref`.
fn is_foldable(schema: &Value) -> bool {
    schema.as_object().is_some_and(|m| {
        !m.is_empty()
            && !m.contains_key("title")
            && !m.contains_key("$ref")
            && m.keys().all(|k| is_retro_keyword(k))
    })
}

/// Whether any column keyword of `schema` holds something displayable.
pub fn has_children(schema: &Value) -> bool {
    let Some(object) = schema.as_object() else {
        return false;
    };

    object
        .iter()
        .filter(|(k, _)| is_supported_keyword(k))
        .any(|(_, v)| match v {
            Value::Object(m) => !m.is_empty(),
            Value::Array(items) => items.iter().any(is_displayable),
            _ => false,
        })
}

fn display_name(schema: &Value, key: &str) -> String {
    meta::title(schema)
        .or_else(|| {
            schema
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(name_from_ref)
        })
        .unwrap_or_else(|| key.to_string())
}

/// Merge the `$ref` target (and any chain of pure `$ref` targets behind it)
/// into `schema`. The schema's own keywords win over the target's.
///
/// Returns the dereferencer bound to the document the last merged target
/// came from, so the entry's children resolve their `$ref`s there. On a
/// resolution error the schema keeps whatever was merged before the failing
/// step.
async fn deref_entry_schema(deref: Dereferencer, schema: Value, key: &str) -> (Value, Dereferencer) {
    let mut merged = match schema {
        Value::Object(map) => map,
        other => return (other, deref),
    };

    let mut current = deref;
    let mut visited = HashSet::new();
    let mut next = merged.get("$ref").and_then(Value::as_str).map(str::to_string);

    while let Some(reference) = next.take() {
        // Fragments repeat across documents; qualify them by base.
        let qualified = format!("{}{}", current.base_uri().unwrap_or_default(), reference);
        if !visited.insert(qualified) {
            let err = DerefError::CyclicReference(reference);
            tracing::warn!(entry = %key, error = %err, "Error dereferencing entry");
            break;
        }

        let (resolved, source) = current.follow(&reference).await;
        if let Some(err) = &resolved.error {
            tracing::warn!(entry = %key, reference = %reference, error = %err, "Error dereferencing entry");
            break;
        }

        let Value::Object(target) = resolved.value else {
            break;
        };
        current = source;

        next = target.get("$ref").and_then(Value::as_str).map(str::to_string);
        for (k, v) in target {
            if !merged.contains_key(&k) {
                merged.insert(k, v);
            }
        }
    }

    (Value::Object(merged), current)
}
