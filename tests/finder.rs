//! Integration tests for loading schema files and browsing them.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use serial_test::serial;
use tempfile::TempDir;

use schemafinder::config::Config;
use schemafinder::context::Context;
use schemafinder::error::{AppError, DerefError};
use schemafinder::navigation::{KeyInput, PathCommand};
use schemafinder::schema::{Keyword, SchemaFetcher};
use schemafinder::services::FinderService;
use schemafinder::FromRef;

/// Counts fetches and serves a fixed document.
#[derive(Default)]
struct StubFetcher {
    calls: AtomicUsize,
}

#[async_trait]
impl SchemaFetcher for StubFetcher {
    async fn fetch(&self, address: &str) -> Result<Value, DerefError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match address {
            "https://schemas.test/common.json" => Ok(json!({
                "definitions": {
                    "Id": {"title": "Identifier", "type": "string", "pattern": "^[0-9a-f]+$"}
                }
            })),
            _ => Err(DerefError::Status {
                address: address.to_string(),
                status: 404,
                reason: "Not Found".to_string(),
            }),
        }
    }
}

fn write_schema(dir: &TempDir, name: &str, schema: &Value) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, serde_json::to_string_pretty(schema).unwrap()).unwrap();
    path
}

fn service(allow_remote: bool) -> (FinderService, Arc<StubFetcher>) {
    let mut config = Config::default();
    config.deref.allow_remote = allow_remote;
    let fetcher = Arc::new(StubFetcher::default());
    let ctx = Context::with_fetcher(config, fetcher.clone());
    (FinderService::from_ref(&ctx), fetcher)
}

fn person() -> Value {
    json!({
        "$id": "https://schemas.test/person.json",
        "title": "Person",
        "type": "object",
        "required": ["name"],
        "properties": {
            "name": {"type": "string", "description": "Full name"},
            "id": {"$ref": "common.json#/definitions/Id"},
            "address": {"$ref": "#/definitions/Address"},
            "pets": {
                "type": "array",
                "items": {"anyOf": [{"title": "Cat"}, {"title": "Dog"}]}
            }
        },
        "definitions": {
            "Address": {
                "type": "object",
                "properties": {"street": {"type": "string"}, "city": {"type": "string"}}
            }
        }
    })
}

#[tokio::test]
async fn test_load_names_roots_by_file_stem() {
    let dir = TempDir::new().unwrap();
    let a = write_schema(&dir, "person.json", &person());
    let b = write_schema(&dir, "flag.schema", &json!(true));
    let (service, _) = service(false);

    let schemas = service.load_schemas(&[a, b]).await.unwrap();
    assert_eq!(schemas.keys().collect::<Vec<_>>(), vec!["person", "flag"]);

    let finder = service.open(&schemas).await;
    let root = &finder.columns()[0];
    assert_eq!(root[0].name, "Person");
    assert!(root[0].has_children);
    assert_eq!(root[1].name, "flag");
    assert!(!root[1].has_children);
}

#[tokio::test]
async fn test_load_rejects_missing_and_non_schema_files() {
    let dir = TempDir::new().unwrap();
    let (service, _) = service(false);

    let missing = dir.path().join("missing.json");
    assert!(matches!(
        service.load_schemas(&[missing]).await,
        Err(AppError::SchemaNotFound(_))
    ));

    let number = write_schema(&dir, "number.json", &json!(42));
    assert!(matches!(
        service.load_schemas(&[number]).await,
        Err(AppError::NotASchema(_))
    ));

    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "{").unwrap();
    assert!(matches!(
        service.load_schemas(&[broken]).await,
        Err(AppError::Json(_))
    ));
}

#[tokio::test]
async fn test_browse_properties_and_refs() {
    let dir = TempDir::new().unwrap();
    let path = write_schema(&dir, "person.json", &person());
    let (service, fetcher) = service(false);

    let schemas = service.load_schemas(&[path]).await.unwrap();
    let mut finder = service.open(&schemas).await;
    service.select(&mut finder, 0, 0).await.unwrap();

    let column = &finder.columns()[1];
    let keys: Vec<_> = column.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["name", "id", "address", "pets"]);
    assert!(column[0].is_required);
    assert_eq!(column[2].name, "Address");
    assert!(column[2].has_children);

    // Remote resolution is off: the entry stays, unmerged, and nothing is fetched
    assert_eq!(column[1].name, "Id");
    assert!(!column[1].has_children);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);

    service.select(&mut finder, 1, 2).await.unwrap();
    let streets: Vec<_> = finder.columns()[2].iter().map(|e| e.pointer()).collect();
    assert_eq!(
        streets,
        vec![
            "#/properties/address/properties/street",
            "#/properties/address/properties/city"
        ]
    );
}

#[tokio::test]
async fn test_remote_ref_resolves_against_root_id() {
    let dir = TempDir::new().unwrap();
    let path = write_schema(&dir, "person.json", &person());
    let (service, fetcher) = service(true);

    let schemas = service.load_schemas(&[path]).await.unwrap();
    let mut finder = service.open(&schemas).await;
    service.select(&mut finder, 0, 0).await.unwrap();
    service.select(&mut finder, 1, 1).await.unwrap();

    let info = service.info(&finder).unwrap();
    assert_eq!(info.title, "Identifier");
    assert_eq!(info.validations["pattern"], "^[0-9a-f]+$");
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_folded_item_combinators() {
    let dir = TempDir::new().unwrap();
    let path = write_schema(&dir, "person.json", &person());
    let (service, _) = service(false);

    let schemas = service.load_schemas(&[path]).await.unwrap();
    let mut finder = service.open(&schemas).await;
    service.select(&mut finder, 0, 0).await.unwrap();
    service.select(&mut finder, 1, 3).await.unwrap();

    let rows: Vec<_> = finder.columns()[2]
        .iter()
        .map(|e| (e.name.as_str(), e.group, e.idx))
        .collect();
    assert_eq!(
        rows,
        vec![("Cat", Some(Keyword::Items), 0), ("Dog", Some(Keyword::Items), 1)]
    );
}

#[tokio::test]
async fn test_arrow_down_clamps_at_last_root() {
    let dir = TempDir::new().unwrap();
    let paths = vec![
        write_schema(&dir, "a.json", &json!({"type": "string"})),
        write_schema(&dir, "b.json", &json!({"type": "number"})),
        write_schema(&dir, "c.json", &json!({"type": "null"})),
    ];
    let (service, _) = service(false);

    let schemas = service.load_schemas(&paths).await.unwrap();
    let mut finder = service.open(&schemas).await;
    service.select(&mut finder, 0, 2).await.unwrap();

    service
        .press(&mut finder, &KeyInput::new("ArrowDown"))
        .await
        .unwrap();
    assert_eq!(finder.path(), &[2]);

    service
        .press(&mut finder, &"C-k".parse().unwrap())
        .await
        .unwrap();
    assert_eq!(finder.path(), &[0]);
}

#[tokio::test]
async fn test_breadcrumbs_and_home() {
    let dir = TempDir::new().unwrap();
    let path = write_schema(&dir, "person.json", &person());
    let (service, _) = service(false);

    let schemas = service.load_schemas(&[path]).await.unwrap();
    let mut finder = service.open(&schemas).await;
    for key in ["l", "l", "j", "j", "l"] {
        service.press(&mut finder, &KeyInput::new(key)).await.unwrap();
    }
    assert_eq!(finder.path(), &[0, 2, 0]);

    let labels: Vec<_> = finder.breadcrumbs().into_iter().map(|b| b.label).collect();
    assert_eq!(labels, vec!["person", "address", "street"]);

    finder.apply(PathCommand::Home);
    assert_eq!(finder.path(), &[0]);
    assert_eq!(finder.columns().len(), 2);
}

#[tokio::test]
#[serial]
async fn test_context_from_env_config() {
    std::env::set_var("SCHEMAFINDER_DEREF__ALLOW_REMOTE", "true");
    let config = Config::load().unwrap();
    std::env::remove_var("SCHEMAFINDER_DEREF__ALLOW_REMOTE");

    let ctx = Context::new(config).unwrap();
    let service = FinderService::from_ref(&ctx);
    assert!(service.deref_options().allow_remote);
}
