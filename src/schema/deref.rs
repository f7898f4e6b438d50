//! `$ref` resolution against an in-memory root document.
//!
//! A [`Dereferencer`] is bound to one root document. Fragment-only references
//! are resolved by walking the root; references with an address portion are
//! fetched through a [`SchemaFetcher`] only when remote resolution was
//! explicitly enabled. Failures never escape as `Err`: every call yields a
//! [`Resolved`] holding the best value reached plus an optional error.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::{Mutex, OnceCell};
use url::Url;

use super::fetch::SchemaFetcher;
use super::uri::{parse_json_pointer, split_reference, strip_fragment, to_json_pointer};
use crate::error::DerefError;

/// Options controlling what a [`Dereferencer`] may do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DerefOptions {
    /// Allow network fetches for `$ref` values with an address portion.
    pub allow_remote: bool,
}

/// Outcome of one dereference: a value and, if resolution fell short, why.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub value: Value,
    pub error: Option<DerefError>,
}

impl Resolved {
    pub fn ok(value: Value) -> Self {
        Self { value, error: None }
    }

    pub fn failed(value: Value, error: DerefError) -> Self {
        Self {
            value,
            error: Some(error),
        }
    }

    /// The empty schema, which matches anything.
    pub fn empty() -> Self {
        Self::ok(Value::Object(Map::new()))
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Resolves `$ref` strings relative to one root document.
///
/// Cheap to clone; clones share the root and the remote document cache.
/// A dereferencer rebased onto a fetched document shares the cache too.
#[derive(Clone)]
pub struct Dereferencer {
    root: Arc<Value>,
    root_id: Option<Url>,
    options: DerefOptions,
    fetcher: Option<Arc<dyn SchemaFetcher>>,
    cache: DocumentCache,
}

/// Fetched documents by absolute address. Each address gets one cell, so
/// concurrent lookups of the same document share a single fetch.
type DocumentCache = Arc<Mutex<HashMap<String, Arc<OnceCell<Arc<Value>>>>>>;

impl std::fmt::Debug for Dereferencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dereferencer")
            .field("root_id", &self.root_id)
            .field("options", &self.options)
            .field("has_fetcher", &self.fetcher.is_some())
            .finish()
    }
}

impl Dereferencer {
    /// A local-only dereferencer for `root`.
    pub fn new(root: Value) -> Self {
        Self::with_root(Arc::new(root))
    }

    pub fn with_root(root: Arc<Value>) -> Self {
        let root_id = root
            .get("$id")
            .and_then(Value::as_str)
            .and_then(|id| Url::parse(strip_fragment(id)).ok());

        Self {
            root,
            root_id,
            options: DerefOptions::default(),
            fetcher: None,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Attach a fetch capability and the options governing its use.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn SchemaFetcher>, options: DerefOptions) -> Self {
        self.fetcher = Some(fetcher);
        self.options = options;
        self
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn options(&self) -> DerefOptions {
        self.options
    }

    /// Absolute URI of the root document, if it has one.
    pub fn base_uri(&self) -> Option<&str> {
        self.root_id.as_ref().map(Url::as_str)
    }

    /// A dereferencer for a fetched document, sharing fetcher, options and
    /// cache. Relative addresses inside it resolve against its own `$id`,
    /// else against the address it was fetched from.
    pub fn rebased(&self, address: &str, document: Arc<Value>) -> Self {
        let root_id = document
            .get("$id")
            .and_then(Value::as_str)
            .and_then(|id| Url::parse(strip_fragment(id)).ok())
            .or_else(|| Url::parse(strip_fragment(address)).ok());

        Self {
            root: document,
            root_id,
            options: self.options,
            fetcher: self.fetcher.clone(),
            cache: Arc::clone(&self.cache),
        }
    }

    /// Resolve `reference` to the schema it designates.
    ///
    /// - `None` resolves to the empty schema.
    /// - A fragment-only reference walks the root document and never suspends.
    /// - A reference with an address is fetched only if remote resolution is
    ///   enabled; otherwise it resolves to the empty schema with a
    ///   [`DerefError::RemoteDisabled`] error.
    pub async fn deref(&self, reference: Option<&str>) -> Resolved {
        match reference {
            Some(reference) => self.follow(reference).await.0,
            None => Resolved::empty(),
        }
    }

    /// Resolve `reference` and return the dereferencer bound to the document
    /// the value was found in.
    ///
    /// Further `$ref`s inside the value must be resolved with the returned
    /// dereferencer: a fragment in a fetched document points into that
    /// document, not into this one's root. On failure `self` is returned.
    pub async fn follow(&self, reference: &str) -> (Resolved, Dereferencer) {
        let (address, fragment) = split_reference(reference);
        if address.is_empty() || self.is_root_address(address) {
            return (resolve_pointer(&self.root, fragment), self.clone());
        }

        match self.fetch_document(address).await {
            Ok((address, document)) => {
                let resolved = resolve_pointer(&document, fragment);
                (resolved, self.rebased(&address, document))
            }
            Err(err) => (Resolved::failed(Value::Object(Map::new()), err), self.clone()),
        }
    }

    /// Load the document named by `address`, if remote resolution allows it.
    async fn fetch_document(&self, address: &str) -> Result<(String, Arc<Value>), DerefError> {

        let fetcher = match &self.fetcher {
            Some(fetcher) if self.options.allow_remote => fetcher,
            _ => {
                return Err(DerefError::RemoteDisabled {
                    address: address.to_string(),
                })
            }
        };

        let address = self.absolute_address(address)?;
        let document = self.load_remote(fetcher.as_ref(), &address).await?;
        Ok((address, document))
    }

    fn is_root_address(&self, address: &str) -> bool {
        match (&self.root_id, Url::parse(address)) {
            (Some(id), Ok(url)) => *id == url,
            _ => false,
        }
    }

    /// Resolve a possibly relative address against the root's `$id`.
    fn absolute_address(&self, address: &str) -> Result<String, DerefError> {
        if let Ok(url) = Url::parse(address) {
            return Ok(url.to_string());
        }

        let invalid = |message: String| DerefError::InvalidAddress {
            address: address.to_string(),
            message,
        };

        match &self.root_id {
            Some(base) => base
                .join(address)
                .map(|url| url.to_string())
                .map_err(|e| invalid(e.to_string())),
            None => Err(invalid(
                "relative address and the root document has no absolute $id".to_string(),
            )),
        }
    }

    async fn load_remote(
        &self,
        fetcher: &dyn SchemaFetcher,
        address: &str,
    ) -> Result<Arc<Value>, DerefError> {
        let cell = {
            let mut cache = self.cache.lock().await;
            Arc::clone(cache.entry(address.to_string()).or_default())
        };

        // Failed fetches leave the cell empty; the next lookup retries.
        cell.get_or_try_init(|| async {
            tracing::debug!(address, "Loading remote schema document");
            fetcher.fetch(address).await.map(Arc::new)
        })
        .await
        .map(Arc::clone)
    }
}

/// Walk `document` along the fragment `pointer`.
///
/// On a missing segment, returns the deepest value reached together with a
/// [`DerefError::MissingKey`]. Array elements are addressed by index.
pub fn resolve_pointer(document: &Value, pointer: &str) -> Resolved {
    let segments = parse_json_pointer(pointer);
    let mut current = document;

    for (depth, segment) in segments.iter().enumerate() {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };

        match next {
            Some(value) => current = value,
            None => {
                return Resolved::failed(
                    current.clone(),
                    DerefError::MissingKey {
                        key: segment.clone(),
                        pointer: to_json_pointer(&segments[..depth]),
                    },
                )
            }
        }
    }

    Resolved::ok(current.clone())
}
