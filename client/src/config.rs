//! Client configuration loaded from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `TODO_API_URL` | `http://127.0.0.1:5000` |
//! | `TODO_RELOAD_INTERVAL_SECS` | `30` |
//! | `TODO_NOTICE_TTL_SECS` | `5` |
//! | `TODO_REQUEST_TIMEOUT_SECS` | `10` |

use crate::reducer::{DEFAULT_NOTICE_TTL, DEFAULT_RELOAD_INTERVAL};
use std::time::Duration;
use thiserror::Error;

/// Errors from configuration loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A duration variable was not a whole number of seconds.
    #[error("Invalid value for {key}: {value:?} (expected whole seconds)")]
    InvalidSeconds {
        /// Variable name
        key: &'static str,
        /// Raw value found
        value: String,
    },
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server root, without the `/api` prefix
    pub api_url: String,
    /// Time between automatic reloads
    pub reload_interval: Duration,
    /// Time a failure notice stays visible
    pub notice_ttl: Duration,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:5000".to_string(),
            reload_interval: DEFAULT_RELOAD_INTERVAL,
            notice_ttl: DEFAULT_NOTICE_TTL,
            request_timeout: Duration::from_secs(10),
        }
    }
}

fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidSeconds { key, value }),
    }
}

impl ClientConfig {
    /// Load from the process environment, reading `.env` first if present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSeconds`] for a malformed duration.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSeconds`] for a malformed duration.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            api_url: lookup("TODO_API_URL").unwrap_or(defaults.api_url),
            reload_interval: seconds(&lookup, "TODO_RELOAD_INTERVAL_SECS", defaults.reload_interval)?,
            notice_ttl: seconds(&lookup, "TODO_NOTICE_TTL_SECS", defaults.notice_ttl)?,
            request_timeout: seconds(&lookup, "TODO_REQUEST_TIMEOUT_SECS", defaults.request_timeout)?,
        })
    }
}
