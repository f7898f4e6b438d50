//! Finder service: loads schema documents and drives the column browser.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::config::Config;
use crate::context::{AppFetcher, Context};
use crate::di::FromContext;
use crate::error::AppError;
use crate::models::EntryInfo;
use crate::navigation::{Finder, KeyInput};
use crate::schema::{build_root_entries, DerefOptions, Dereferencer, SchemaGraph};

/// Named schema documents in load order.
pub type Schemas = IndexMap<String, Value>;

/// Service wiring configuration and the remote fetcher into browsing.
#[derive(FromContext, Clone)]
pub struct FinderService {
    config: Arc<Config>,
    fetcher: AppFetcher,
}

impl FinderService {
    /// Read schema documents from disk, named by file stem.
    ///
    /// A stem already taken by an earlier file falls back to the full path.
    pub async fn load_schemas<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Schemas, AppError> {
        let mut schemas = Schemas::new();

        for path in paths {
            let path = path.as_ref();
            let content = tokio::fs::read_to_string(path).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AppError::SchemaNotFound(path.display().to_string())
                } else {
                    AppError::Io(e)
                }
            })?;

            let schema: Value = serde_json::from_str(&content)?;
            if !matches!(schema, Value::Object(_) | Value::Bool(_)) {
                return Err(AppError::NotASchema(path.display().to_string()));
            }

            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let name = if schemas.contains_key(&stem) {
                path.display().to_string()
            } else {
                stem
            };

            tracing::debug!(schema = %name, path = %path.display(), "Loaded schema");
            schemas.insert(name, schema);
        }

        Ok(schemas)
    }

    pub fn deref_options(&self) -> DerefOptions {
        DerefOptions {
            allow_remote: self.config.deref.allow_remote,
        }
    }

    /// A dereferencer bound to `schema`, with remote fetches governed by config.
    pub fn dereferencer(&self, schema: &Value) -> Dereferencer {
        Dereferencer::new(schema.clone()).with_fetcher(self.fetcher.clone(), self.deref_options())
    }

    /// A browser whose root column holds one entry per document.
    pub async fn open(&self, schemas: &Schemas) -> Finder {
        let root = build_root_entries(schemas, |schema| self.dereferencer(schema)).await;
        tracing::info!(roots = root.len(), "Opened schema browser");
        Finder::new(root)
    }

    /// Select `row` of column `col` and build its preview column.
    pub async fn select(&self, finder: &mut Finder, col: usize, row: usize) -> Result<(), AppError> {
        if finder.descend(col, row).is_some() {
            finder.refresh().await?;
        }
        Ok(())
    }

    /// Apply one key press. Returns `false` for unbound keys.
    pub async fn press(&self, finder: &mut Finder, key: &KeyInput) -> Result<bool, AppError> {
        let Some(command) = key.command() else {
            tracing::debug!(key = %key.key, "Unbound key");
            return Ok(false);
        };

        if finder.apply(command).is_some() {
            finder.refresh().await?;
        }
        Ok(true)
    }

    /// Info panel for the current selection.
    pub fn info(&self, finder: &Finder) -> Result<EntryInfo, AppError> {
        finder
            .selected()
            .map(EntryInfo::from_entry)
            .ok_or(AppError::NoEntry)
    }

    /// Eager graph of every document below the configured umbrella title.
    pub fn build_graph(&self, schemas: &Schemas) -> SchemaGraph {
        SchemaGraph::build(schemas, &self.config.viewer.umbrella_title)
    }
}
