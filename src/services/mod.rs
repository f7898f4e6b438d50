//! Services orchestrating schema loading and browsing.
//!
//! Services are built from the [`Context`](crate::context::Context) with the
//! `FromContext` derive.

mod finder;

pub use finder::{FinderService, Schemas};
