//! Application context providing dependency injection root.

use std::sync::Arc;

use crate::config::Config;
use crate::di::Context as ContextDerive;
use crate::error::AppError;
use crate::schema::{HttpFetcher, SchemaFetcher};

/// Shared remote document fetcher.
pub type AppFetcher = Arc<dyn SchemaFetcher>;

/// Root application context for dependency injection.
///
/// `#[derive(Context)]` generates a `FromRef` implementation for each field,
/// so services can pull what they need with `#[derive(FromContext)]`.
#[derive(ContextDerive, Clone)]
pub struct Context {
    /// Application configuration.
    pub config: Arc<Config>,
    /// Fetcher used for remote `$ref` targets when enabled.
    pub fetcher: AppFetcher,
}

impl Context {
    /// Creates a context with an HTTP fetcher built from `config`.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let fetcher = HttpFetcher::from_config(&config.deref)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Creates a context around an existing fetcher.
    pub fn with_fetcher(config: Config, fetcher: AppFetcher) -> Self {
        Self {
            config: Arc::new(config),
            fetcher,
        }
    }
}
