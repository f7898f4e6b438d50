//! Integration tests for the eager schema graph.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;

use schemafinder::config::Config;
use schemafinder::context::Context;
use schemafinder::error::{DerefError, WalkError};
use schemafinder::schema::graph::UMBRELLA_URI;
use schemafinder::schema::{SchemaFetcher, SchemaGraph};
use schemafinder::services::FinderService;
use schemafinder::FromRef;

struct OfflineFetcher;

#[async_trait]
impl SchemaFetcher for OfflineFetcher {
    async fn fetch(&self, address: &str) -> Result<Value, DerefError> {
        Err(DerefError::Fetch {
            address: address.to_string(),
            message: "offline".to_string(),
        })
    }
}

fn service(config: Config) -> FinderService {
    let ctx = Context::with_fetcher(config, Arc::new(OfflineFetcher));
    FinderService::from_ref(&ctx)
}

#[tokio::test]
async fn test_graph_over_files() {
    let dir = TempDir::new().unwrap();
    let order = dir.path().join("order.json");
    let customer = dir.path().join("customer.json");
    std::fs::write(
        &order,
        json!({
            "title": "Order",
            "properties": {
                "total": {"type": "number"},
                "lines": {"type": "array", "items": {"$ref": "#/definitions/Line"}}
            },
            "definitions": {"Line": {"properties": {"sku": {"type": "string"}}}}
        })
        .to_string(),
    )
    .unwrap();
    std::fs::write(&customer, json!({"title": "Customer", "type": "object"}).to_string()).unwrap();

    let mut config = Config::default();
    config.viewer.umbrella_title = "Everything".to_string();
    let service = service(config);

    let schemas = service.load_schemas(&[order, customer]).await.unwrap();
    let graph = service.build_graph(&schemas);

    assert_eq!(graph.root().label(), "Everything");
    let roots: Vec<_> = graph.children(UMBRELLA_URI).iter().map(|n| n.label()).collect();
    assert_eq!(roots, vec!["Order", "Customer"]);

    let line = graph.node("order#/definitions/Line").unwrap();
    assert!(line.parents.contains("order#/properties/lines"));
    assert!(graph.node("order#/definitions/Line/properties/sku").is_some());
    assert!(graph.errors().is_empty());
}

#[test]
fn test_forward_reference_gets_parent() {
    // The referencing location is walked before the target exists. A `$ref`
    // location has no node of its own; its parent links straight to the target.
    let schema = json!({
        "properties": {"home": {"$ref": "#/definitions/Address"}},
        "definitions": {"Address": {"properties": {"street": {"type": "string"}}}}
    });
    let graph = SchemaGraph::from_document("S", &schema);

    let address = graph.node("S#/definitions/Address").unwrap();
    assert_eq!(address.parents.iter().collect::<Vec<_>>(), vec!["S#"]);
    assert!(address.has_children());
    assert!(graph.node("S#/properties/home").is_none());
}

#[test]
fn test_unresolved_reference_is_reported() {
    let schema = json!({"properties": {"a": {"$ref": "#/definitions/Nope"}}});
    let graph = SchemaGraph::from_document("S", &schema);

    assert!(matches!(
        &graph.errors()[..],
        [WalkError::UnresolvedReference { target, .. }] if target == "S#/definitions/Nope"
    ));
}

#[test]
fn test_graph_serializes_nodes_in_order() {
    let graph = SchemaGraph::from_document("S", &json!({"properties": {"a": {"type": "string"}}}));
    let value = serde_json::to_value(&graph).unwrap();

    let uris: Vec<_> = value["nodes"]
        .as_object()
        .unwrap()
        .keys()
        .cloned()
        .collect();
    assert_eq!(uris, vec!["", "S#", "S#/properties/a"]);
    assert_eq!(value["nodes"]["S#/properties/a"]["valueType"], "string");
}
