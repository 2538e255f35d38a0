//! Data-store configuration
//!
//! The remote data store is the only external collaborator and its
//! coordinates are credential material. They must come from the
//! environment; a missing value fails loudly instead of falling back
//! to an embedded default.

use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable holding the data-store base URL
pub const STORE_URL_ENV: &str = "CONSORCIO_STORE_URL";

/// Environment variable holding the data-store access key
pub const STORE_KEY_ENV: &str = "CONSORCIO_STORE_KEY";

/// Default per-request timeout for data-store calls
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(15);

/// Connection settings for the remote data store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the hosted data store, without a trailing slash
    pub base_url: String,
    /// Access key sent as `apikey` and bearer token
    pub api_key: String,
    /// Per-request timeout; expiry is treated as a retryable failure
    pub timeout: Duration,
}

impl StoreConfig {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Read the configuration from the environment.
    ///
    /// Errors when either variable is unset or empty.
    pub fn from_env() -> Result<Self> {
        let base_url = require_env(STORE_URL_ENV)?;
        let api_key = require_env(STORE_KEY_ENV)?;
        Ok(Self::new(&base_url, &api_key))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!(
            "{} is not set; refusing to start without data-store credentials",
            name
        ))),
    }
}
