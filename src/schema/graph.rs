//! Whole-document schema graph.
//!
//! Walks every location of one or more schema documents once, producing an
//! arena of [`SchemaNode`]s keyed by absolute URI. Edges are stored as URI
//! sets on both ends, so `$ref` cycles become plain back-references instead of
//! infinitely nested structures.
//!
//! # Reference handling
//!
//! A pure `$ref` location never becomes a node of its own: its parents are
//! linked straight to the target. If the target has not been walked yet, the
//! parents wait in a deref queue keyed by target URI and are linked when the
//! walk reaches it. Whatever is still queued at the end is reported as an
//! unresolved reference.
//!
//! The walk is synchronous, local-only and never fetches remote documents.

use std::borrow::Cow;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::{json, Map, Value};

use super::meta::{self, ValueType};
use super::uri::{escape_token, merge_uris, parse_json_pointer, strip_fragment};
use crate::error::WalkError;

/// URI of the synthetic node above all document roots.
pub const UMBRELLA_URI: &str = "";

/// One addressable location of a schema document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    /// Base URI plus JSON pointer fragment; unique within a graph.
    pub uri: String,
    /// Last path segment, or the base URI at a document root.
    pub key: String,
    /// Incoming edges. Several `$ref`s may target the same node.
    pub parents: IndexSet<String>,
    /// Outgoing edges in discovery order, which is display order.
    pub children: IndexSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub value_type: ValueType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_properties: Option<Vec<String>>,
    pub examples: Vec<String>,
}

impl SchemaNode {
    fn new(uri: String, key: String, schema: &Value) -> Self {
        Self {
            uri,
            key,
            parents: IndexSet::new(),
            children: IndexSet::new(),
            title: meta::title(schema),
            description: meta::description(schema),
            value_type: ValueType::of(schema),
            required_properties: meta::required(schema),
            examples: meta::examples(schema),
        }
    }

    /// Title if present, else the key.
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.key)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Whether this node's key is listed in `parent`'s `required`.
    pub fn is_required_by(&self, parent: &SchemaNode) -> bool {
        parent
            .required_properties
            .as_ref()
            .is_some_and(|required| required.contains(&self.key))
    }
}

/// Mutable state threaded through one walk.
#[derive(Debug, Default)]
struct WalkState {
    nodes: IndexMap<String, SchemaNode>,
    /// Target URI → parents waiting for that target to be built.
    deref_queue: IndexMap<String, IndexSet<String>>,
    errors: Vec<WalkError>,
}

/// Where the walk currently is.
#[derive(Debug, Clone)]
struct Location<'a> {
    base_uri: Cow<'a, str>,
    path: String,
    parents: IndexSet<String>,
    is_definition: bool,
    rebased: bool,
}

impl WalkState {
    fn walk(&mut self, schema: &Value, loc: Location<'_>) -> Option<String> {
        let schema: Cow<'_, Value> = match schema {
            Value::Bool(true) => Cow::Owned(Value::Object(Map::new())),
            Value::Bool(false) => Cow::Owned(json!({"not": {}})),
            Value::Object(_) => Cow::Borrowed(schema),
            other => {
                self.errors.push(WalkError::InvalidSchema {
                    uri: merge_uris(&loc.base_uri, &format!("#{}", loc.path)),
                    found: json_kind(other).to_string(),
                });
                return None;
            }
        };

        // All other properties in a "$ref" object are ignored.
        match schema.get("$ref") {
            Some(Value::String(reference)) => {
                self.enqueue_or_link(merge_uris(&loc.base_uri, reference), &loc.parents);
                return None;
            }
            Some(_) => self.errors.push(WalkError::InvalidKeyword {
                uri: merge_uris(&loc.base_uri, &format!("#{}", loc.path)),
                keyword: "$ref".to_string(),
                expected: "a string",
            }),
            None => {}
        }

        if !loc.rebased {
            if let Some(id) = schema.get("$id").and_then(Value::as_str) {
                let new_base = strip_fragment(&merge_uris(&loc.base_uri, id)).to_string();
                if new_base != loc.base_uri {
                    return self.walk(
                        &schema,
                        Location {
                            base_uri: Cow::Owned(new_base),
                            rebased: true,
                            ..loc
                        },
                    );
                }
            }
        }

        let uri = merge_uris(&loc.base_uri, &format!("#{}", loc.path));

        let mut parents = if loc.is_definition {
            IndexSet::new()
        } else {
            loc.parents
        };
        if let Some(queued) = self.deref_queue.shift_remove(&uri) {
            parents.extend(queued);
        }

        if self.nodes.contains_key(&uri) {
            tracing::debug!(uri = %uri, "Location already built, linking only");
            self.link(&parents, &uri);
            return Some(uri);
        }

        let key = parse_json_pointer(&loc.path)
            .pop()
            .unwrap_or_else(|| loc.base_uri.to_string());
        self.nodes
            .insert(uri.clone(), SchemaNode::new(uri.clone(), key, &schema));
        self.link(&parents, &uri);

        self.walk_children(&schema, &uri, &loc.base_uri, &loc.path);

        Some(uri)
    }

    fn walk_children(&mut self, schema: &Value, uri: &str, base_uri: &str, path: &str) {
        let Some(object) = schema.as_object() else {
            return;
        };

        for (keyword, value) in object {
            match keyword.as_str() {
                "properties" | "patternProperties" | "definitions" => {
                    let Some(members) = self.expect_object(uri, keyword, value) else {
                        continue;
                    };
                    let is_definition = keyword == "definitions";
                    for (name, member) in members {
                        let child_path = format!("{}/{}/{}", path, keyword, escape_token(name));
                        self.walk_child(member, uri, base_uri, child_path, is_definition);
                    }
                }

                "allOf" | "anyOf" | "oneOf" => {
                    let Some(members) = value.as_array() else {
                        self.errors.push(WalkError::InvalidKeyword {
                            uri: uri.to_string(),
                            keyword: keyword.clone(),
                            expected: "an array of schemas",
                        });
                        continue;
                    };
                    for (idx, member) in members.iter().enumerate() {
                        let child_path = format!("{}/{}/{}", path, keyword, idx);
                        self.walk_child(member, uri, base_uri, child_path, false);
                    }
                }

                "additionalProperties" | "additionalItems" | "propertyNames" | "contains"
                | "if" | "then" | "else" | "not" => {
                    let child_path = format!("{}/{}", path, keyword);
                    self.walk_child(value, uri, base_uri, child_path, false);
                }

                "items" => match value {
                    Value::Array(members) => {
                        for (idx, member) in members.iter().enumerate() {
                            let child_path = format!("{}/items/{}", path, idx);
                            self.walk_child(member, uri, base_uri, child_path, false);
                        }
                    }
                    _ => {
                        let child_path = format!("{}/items", path);
                        self.walk_child(value, uri, base_uri, child_path, false);
                    }
                },

                "dependencies" => {
                    let Some(members) = self.expect_object(uri, keyword, value) else {
                        continue;
                    };
                    for (name, member) in members {
                        // Property-list form: names, not a schema.
                        if member.is_array() {
                            continue;
                        }
                        let child_path = format!("{}/dependencies/{}", path, escape_token(name));
                        self.walk_child(member, uri, base_uri, child_path, false);
                    }
                }

                _ => {}
            }
        }
    }

    fn walk_child(
        &mut self,
        schema: &Value,
        parent_uri: &str,
        base_uri: &str,
        path: String,
        is_definition: bool,
    ) {
        let mut parents = IndexSet::new();
        parents.insert(parent_uri.to_string());
        self.walk(
            schema,
            Location {
                base_uri: Cow::Borrowed(base_uri),
                path,
                parents,
                is_definition,
                rebased: false,
            },
        );
    }

    fn expect_object<'v>(
        &mut self,
        uri: &str,
        keyword: &str,
        value: &'v Value,
    ) -> Option<&'v Map<String, Value>> {
        let members = value.as_object();
        if members.is_none() {
            self.errors.push(WalkError::InvalidKeyword {
                uri: uri.to_string(),
                keyword: keyword.to_string(),
                expected: "an object of schemas",
            });
        }
        members
    }

    fn enqueue_or_link(&mut self, target: String, parents: &IndexSet<String>) {
        if self.nodes.contains_key(&target) {
            self.link(parents, &target);
        } else {
            self.deref_queue
                .entry(target)
                .or_default()
                .extend(parents.iter().cloned());
        }
    }

    /// Add bidirectional edges between every parent and `target`.
    fn link(&mut self, parents: &IndexSet<String>, target: &str) {
        if let Some(node) = self.nodes.get_mut(target) {
            node.parents.extend(parents.iter().cloned());
        }
        for parent in parents {
            if let Some(node) = self.nodes.get_mut(parent) {
                node.children.insert(target.to_string());
            }
        }
    }
}

/// Arena of schema nodes for a set of named documents.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaGraph {
    nodes: IndexMap<String, SchemaNode>,
    #[serde(skip)]
    errors: Vec<WalkError>,
}

impl SchemaGraph {
    /// Walk every named document, using its name as the base URI, below a
    /// synthetic umbrella root titled `umbrella_title`.
    pub fn build<'a, I>(schemas: I, umbrella_title: &str) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        let mut state = WalkState::default();

        let mut umbrella = SchemaNode::new(
            UMBRELLA_URI.to_string(),
            "root".to_string(),
            &json!({"type": "object"}),
        );
        umbrella.title = Some(umbrella_title.to_string());
        state.nodes.insert(UMBRELLA_URI.to_string(), umbrella);

        for (name, schema) in schemas {
            tracing::debug!(schema = %name, "Walking schema document");
            let mut parents = IndexSet::new();
            parents.insert(UMBRELLA_URI.to_string());
            state.walk(
                schema,
                Location {
                    base_uri: Cow::Borrowed(name.as_str()),
                    path: String::new(),
                    parents,
                    is_definition: false,
                    rebased: false,
                },
            );
        }

        for (target, referrers) in state.deref_queue.drain(..) {
            state.errors.push(WalkError::UnresolvedReference {
                target,
                referrers: referrers.into_iter().collect(),
            });
        }

        if !state.errors.is_empty() {
            for err in &state.errors {
                tracing::debug!(error = %err, "Schema walk error");
            }
            tracing::warn!(count = state.errors.len(), "Schema walk finished with errors");
        }

        Self {
            nodes: state.nodes,
            errors: state.errors,
        }
    }

    /// Build the graph of a single named document.
    pub fn from_document(name: &str, schema: &Value) -> Self {
        let name = name.to_string();
        Self::build([(&name, schema)], "root")
    }

    /// The synthetic umbrella root.
    pub fn root(&self) -> &SchemaNode {
        &self.nodes[UMBRELLA_URI]
    }

    pub fn node(&self, uri: &str) -> Option<&SchemaNode> {
        self.nodes.get(uri)
    }

    /// All nodes in creation order, umbrella first.
    pub fn nodes(&self) -> impl Iterator<Item = &SchemaNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, uri: &str) -> Vec<&SchemaNode> {
        self.resolve_all(self.nodes.get(uri).map(|n| &n.children))
    }

    pub fn parents(&self, uri: &str) -> Vec<&SchemaNode> {
        self.resolve_all(self.nodes.get(uri).map(|n| &n.parents))
    }

    /// Non-fatal problems found during the walk.
    pub fn errors(&self) -> &[WalkError] {
        &self.errors
    }

    fn resolve_all(&self, uris: Option<&IndexSet<String>>) -> Vec<&SchemaNode> {
        uris.into_iter()
            .flatten()
            .filter_map(|uri| self.nodes.get(uri))
            .collect()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
