//! Error types for schema loading, dereferencing and graph walks.
//!
//! Only [`AppError`] is ever returned as the `Err` side of a public operation.
//! [`DerefError`] and [`WalkError`] are non-fatal: they travel alongside a
//! best-effort result so one broken `$ref` or malformed subtree never takes
//! the whole viewer down.

use thiserror::Error;

/// Application-level errors for schemafinder.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    // Schema errors
    #[error("Schema not found: {0}")]
    SchemaNotFound(String),

    #[error("Parent schema is not a schema: {0}")]
    NotASchema(String),

    #[error("No entry selected")]
    NoEntry,

    // Input errors
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    #[error("Invalid selection '{0}', expected <column>:<row>")]
    InvalidSelection(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// A `$ref` that could not be (fully) resolved.
///
/// Always reported next to the partial value reached so far.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DerefError {
    #[error("No key \"{key}\" at \"{pointer}\"")]
    MissingKey { key: String, pointer: String },

    #[error("Remote resolution disabled, not fetching {address}")]
    RemoteDisabled { address: String },

    #[error("Failed to fetch {address}: {message}")]
    Fetch { address: String, message: String },

    #[error("{status}: {reason} ({address})")]
    Status {
        address: String,
        status: u16,
        reason: String,
    },

    #[error("Invalid address '{address}': {message}")]
    InvalidAddress { address: String, message: String },

    #[error("Cyclic reference: {0}")]
    CyclicReference(String),
}

/// Structural problem found while walking a whole schema document.
///
/// Collected into a list, never aborting the walk.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalkError {
    #[error("{uri}: not a schema ({found})")]
    InvalidSchema { uri: String, found: String },

    #[error("{uri}: keyword \"{keyword}\" expects {expected}")]
    InvalidKeyword {
        uri: String,
        keyword: String,
        expected: &'static str,
    },

    #[error("Unresolved reference {target} (referenced from {referrers:?})")]
    UnresolvedReference {
        target: String,
        referrers: Vec<String>,
    },
}
