//! Column navigation over lazily built schema entries.

mod finder;
mod keys;

pub use finder::{show_name, Breadcrumb, ColumnRequest, Finder, FinderState};
pub use keys::{KeyInput, PathCommand};
