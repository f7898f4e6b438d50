//! Schema traversal core.
//!
//! - [`keywords`] - static keyword classification
//! - [`uri`] - base URI merging and JSON pointer handling
//! - [`deref`] - `$ref` resolution, local and (opt-in) remote
//! - [`entry`] - lazy per-column expansion into [`SchemaEntry`] rows
//! - [`graph`] - eager whole-document [`SchemaGraph`]
//!
//! The column browser is built on [`entry`]; [`graph`] serves whole-document
//! inspection where every location and every incoming `$ref` edge is wanted
//! up front.

pub mod deref;
pub mod entry;
pub mod fetch;
pub mod graph;
pub mod keywords;
pub mod meta;
pub mod uri;

pub use deref::{resolve_pointer, DerefOptions, Dereferencer, Resolved};
pub use entry::{build_root_entries, build_schema_entries, build_schema_entry, EntryParams, SchemaEntry};
pub use fetch::{HttpFetcher, SchemaFetcher};
pub use graph::{SchemaGraph, SchemaNode};
pub use keywords::Keyword;
pub use meta::ValueType;
