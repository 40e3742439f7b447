//! Configuration layer: typed settings with layered precedence (file → env).
//!
//! Nothing here is ambient: `Settings` is built once at startup and handed
//! into constructors. `tavolo.toml` in the working directory is the base
//! layer; `TAVOLO_*` environment variables override it
//! (`TAVOLO_DATABASE__URL`, `TAVOLO_CACHE__TTL_SECS`, ...).

use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use crate::cache::CacheConfig;

const LOCAL_CONFIG_BASENAME: &str = "tavolo";
const ENV_PREFIX: &str = "TAVOLO";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("configuration could not be loaded: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Postgres connection URL. The only setting with no default.
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    DEFAULT_DB_MAX_CONNECTIONS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default tracing filter; `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl Settings {
    /// Load from the optional local file plus environment overrides.
    pub fn load() -> Result<Self, SettingsError> {
        Self::builder(None)
    }

    /// Load with an explicit configuration file layered on top of the
    /// defaults, below the environment.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        Self::builder(Some(path))
    }

    fn builder(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder =
            Config::builder().add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path));
        }
        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
