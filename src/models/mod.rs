//! Display models derived from schema entries.

mod info;

pub use info::EntryInfo;
