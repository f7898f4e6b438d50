//! schemafinder - JSON Schema column browser core
//!
//! Turns draft-07 JSON Schema documents into navigable columns of entries,
//! resolving `$ref` lazily as the user drills down, and optionally into an
//! eager graph of every location in a document.

pub mod cli;
pub mod config;
pub mod context;
pub mod di;
pub mod error;
pub mod models;
pub mod navigation;
pub mod schema;
pub mod services;

// Re-export FromRef at crate root for di-macros generated code
pub use di::FromRef;
