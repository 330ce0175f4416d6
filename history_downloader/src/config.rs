//! Runtime settings: optional TOML file, then environment overrides.
//!
//! Credentials are never part of this file; see
//! [`FyersCredentials::from_env`](crate::providers::fyers_rest::FyersCredentials::from_env).

use std::num::NonZeroU32;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared_utils::env::{EnvValueError, parse_env_var};
use symbol_catalog::{CatalogCache, cache, loader};
use thiserror::Error;

use crate::{
    history::{MAX_WINDOW_SPAN_DAYS, WindowFailurePolicy},
    providers::fyers_rest::{FyersSettings, provider as fyers},
    session::DEFAULT_MAX_CONCURRENT_SYMBOLS,
};

pub const ENV_CATALOG_URL: &str = "FYERS_CATALOG_URL";
pub const ENV_API_BASE_URL: &str = "FYERS_API_BASE_URL";
pub const ENV_REQUESTS_PER_SECOND: &str = "HISTORY_REQUESTS_PER_SECOND";
pub const ENV_MAX_CONCURRENT_SYMBOLS: &str = "HISTORY_MAX_CONCURRENT_SYMBOLS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Env(#[from] EnvValueError),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    pub url: String,
    pub timeout_secs: u64,
    /// Lifetime of a successfully downloaded catalog.
    pub ttl_secs: u64,
    /// Lifetime of the fallback catalog, so a transient outage is retried soon.
    pub fallback_ttl_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: loader::DEFAULT_CATALOG_URL.to_string(),
            timeout_secs: 30,
            ttl_secs: cache::DEFAULT_TTL.as_secs(),
            fallback_ttl_secs: cache::DEFAULT_FALLBACK_TTL.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub requests_per_second: u32,
    pub window_span_days: u32,
    pub on_window_error: WindowFailurePolicy,
    pub max_concurrent_symbols: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            base_url: fyers::DEFAULT_BASE_URL.to_string(),
            timeout_secs: fyers::DEFAULT_TIMEOUT.as_secs(),
            requests_per_second: fyers::DEFAULT_REQUESTS_PER_SECOND.get(),
            window_span_days: MAX_WINDOW_SPAN_DAYS,
            on_window_error: WindowFailurePolicy::default(),
            max_concurrent_symbols: DEFAULT_MAX_CONCURRENT_SYMBOLS,
        }
    }
}

/// ```toml
/// [catalog]
/// ttl_secs = 3600
///
/// [history]
/// on_window_error = "skip_with_warning"
/// max_concurrent_symbols = 4
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DownloaderConfig {
    pub catalog: CatalogConfig,
    pub history: HistoryConfig,
}

impl DownloaderConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Applies `FYERS_CATALOG_URL`, `FYERS_API_BASE_URL`,
    /// `HISTORY_REQUESTS_PER_SECOND` and `HISTORY_MAX_CONCURRENT_SYMBOLS`.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Some(url) = parse_env_var::<String>(ENV_CATALOG_URL)? {
            self.catalog.url = url;
        }
        if let Some(url) = parse_env_var::<String>(ENV_API_BASE_URL)? {
            self.history.base_url = url;
        }
        if let Some(rps) = parse_env_var::<u32>(ENV_REQUESTS_PER_SECOND)? {
            self.history.requests_per_second = rps;
        }
        if let Some(limit) = parse_env_var::<usize>(ENV_MAX_CONCURRENT_SYMBOLS)? {
            self.history.max_concurrent_symbols = limit;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if self.catalog.timeout_secs == 0 {
            return Err(invalid("catalog.timeout_secs", "must be greater than zero"));
        }
        if self.history.timeout_secs == 0 {
            return Err(invalid("history.timeout_secs", "must be greater than zero"));
        }
        if self.history.requests_per_second == 0 {
            return Err(invalid("history.requests_per_second", "must be greater than zero"));
        }
        if self.history.window_span_days > MAX_WINDOW_SPAN_DAYS {
            return Err(invalid(
                "history.window_span_days",
                format!("must be at most {MAX_WINDOW_SPAN_DAYS}"),
            ));
        }
        if self.history.max_concurrent_symbols == 0 {
            return Err(invalid("history.max_concurrent_symbols", "must be at least 1"));
        }
        Ok(())
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog.timeout_secs)
    }

    /// A cache honouring `catalog.ttl_secs` and `catalog.fallback_ttl_secs`.
    ///
    /// The TTLs only matter to a process that keeps the cache across several
    /// reads. A single `history-downloader` run reads it once, so each
    /// invocation downloads the catalog afresh.
    pub fn catalog_cache(&self) -> CatalogCache {
        CatalogCache::new(
            Duration::from_secs(self.catalog.ttl_secs),
            Duration::from_secs(self.catalog.fallback_ttl_secs),
        )
    }

    pub fn fyers_settings(&self) -> Result<FyersSettings, ConfigError> {
        let requests_per_second = NonZeroU32::new(self.history.requests_per_second).ok_or(
            ConfigError::Invalid {
                field: "history.requests_per_second",
                reason: "must be greater than zero".to_string(),
            },
        )?;
        Ok(FyersSettings {
            base_url: self.history.base_url.clone(),
            timeout: Duration::from_secs(self.history.timeout_secs),
            requests_per_second,
        })
    }
}
