//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/schemafinder/config.toml` (XDG) or platform config dir
//! 2. Project config: `.schemafinder.toml`
//! 3. Environment variables: `SCHEMAFINDER_*` (nested keys split on `__`)
//!
//! Every key has a default, so running without any config file is valid.
//!
//! ```toml
//! [deref]
//! allow_remote = false
//! timeout_secs = 10
//!
//! [viewer]
//! umbrella_title = "Master Root Node"
//! ```
//!
//! `deref.allow_remote` turns on network fetches for `$ref` values with an
//! address portion. Remote schemas are untrusted input; leave it off unless the
//! documents being browsed are known ahead of time.

use std::ops::Deref;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub deref: DerefConfig,
    #[serde(default)]
    pub viewer: ViewerConfig,
}

/// `$ref` resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerefConfig {
    /// Allow fetching remote documents named by a `$ref` address.
    #[serde(default)]
    pub allow_remote: bool,
    /// Per-request timeout for remote fetches, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Largest accepted remote document body, in bytes.
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: u64,
}

/// Display settings shared by the eager graph and the column browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Title of the synthetic node above all named roots.
    #[serde(default = "default_umbrella_title")]
    pub umbrella_title: String,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_document_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_umbrella_title() -> String {
    "Master Root Node".to_string()
}

impl Default for DerefConfig {
    fn default() -> Self {
        Self {
            allow_remote: false,
            timeout_secs: default_timeout_secs(),
            max_document_bytes: default_max_document_bytes(),
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            umbrella_title: default_umbrella_title(),
        }
    }
}

impl DerefConfig {
    /// Remote fetch timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load config with layered resolution (defaults → user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// The layered provider chain, exposed so callers can merge more layers.
    pub fn figment() -> Figment {
        let user_config = Self::user_config_path();

        Figment::new()
            // Layer 0: Built-in defaults
            .merge(Serialized::defaults(Config::default()))
            // Layer 1: User config (lowest file priority)
            .merge(Toml::file(user_config))
            // Layer 2: Project config
            .merge(Toml::file(".schemafinder.toml"))
            // Layer 3: Environment variables (highest priority)
            .merge(Env::prefixed("SCHEMAFINDER_").split("__"))
    }

    /// User config path: ~/.config/schemafinder/config.toml (XDG) or platform config dir.
    fn user_config_path() -> std::path::PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home
                .join(".config")
                .join("schemafinder")
                .join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        // Fall back to platform-specific config dir
        dirs::config_dir()
            .map(|p| p.join("schemafinder").join("config.toml"))
            .unwrap_or_default()
    }
}
