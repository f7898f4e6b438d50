//! Dependency injection infrastructure.
//!
//! Compile-time dependency injection using the `FromRef` trait and the derive
//! macros from `di-macros`:
//!
//! - `FromRef<T>`: extract a value from a reference to `T`
//! - `#[derive(Context)]`: make each field of a struct extractable
//! - `#[derive(FromContext)]`: build a struct by extracting each field
//!
//! # Example
//!
//! ```ignore
//! use crate::di::{FromContext, FromRef};
//!
//! #[derive(FromContext, Clone)]
//! pub struct FinderService {
//!     config: Arc<Config>,  // resolved via FromRef<Context>
//!     fetcher: AppFetcher,
//! }
//!
//! let ctx = Context::new(Config::load()?)?;
//! let finder = FinderService::from_ref(&ctx);
//! ```

/// Extract a value from a reference to another type.
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

/// Any Clone type can be extracted from itself.
impl<T: Clone> FromRef<T> for T {
    fn from_ref(input: &T) -> Self {
        input.clone()
    }
}

pub use di_macros::{Context, FromContext};
