//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BASE_DELAY_MS, DEFAULT_BASE_URL, DEFAULT_KEYCHAIN_SERVICE, DEFAULT_MAX_DELAY_MS,
    DEFAULT_MAX_RETRIES, DEFAULT_REFRESH_PATH, DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT,
};
use crate::errors::{ConduitError, Result};

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL every request path is appended to (e.g. "https://api.example.com/v1")
    pub base_url: String,
    /// Per-attempt timeout in milliseconds
    pub timeout_ms: u64,
    pub user_agent: String,
    pub retry: RetryConfig,
    pub auth: AuthConfig,
}

/// Backoff configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Additional attempts after the first
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

/// Authentication configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Path of the token refresh endpoint, relative to `base_url`
    pub refresh_path: String,
    /// Keychain service name used by the OS credential store
    pub keychain_service: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry: RetryConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            keychain_service: DEFAULT_KEYCHAIN_SERVICE.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Check that the configuration can produce a working client.
    ///
    /// # Errors
    /// Returns `ConduitError::Config` if:
    /// - `base_url` is not an absolute http(s) URL
    /// - the timeout or base delay is zero
    /// - the refresh path does not start with `/`
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| ConduitError::Config(format!("Invalid base URL {}: {}", self.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConduitError::Config(format!(
                "Unsupported base URL scheme: {}",
                url.scheme()
            )));
        }
        if self.timeout_ms == 0 {
            return Err(ConduitError::Config("timeout_ms must be greater than zero".into()));
        }
        if self.retry.base_delay_ms == 0 {
            return Err(ConduitError::Config("base_delay_ms must be greater than zero".into()));
        }
        if !self.auth.refresh_path.starts_with('/') {
            return Err(ConduitError::Config(format!(
                "refresh_path must start with '/': {}",
                self.auth.refresh_path
            )));
        }
        Ok(())
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}
