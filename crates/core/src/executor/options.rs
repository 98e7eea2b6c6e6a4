//! Per-call options merged over client defaults

use std::time::Duration;

use conduit_domain::{ClientConfig, Method, RequestDescriptor};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Client-level defaults a call starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDefaults {
    pub timeout: Duration,
    pub max_retries: u32,
}

impl From<&ClientConfig> for RequestDefaults {
    fn from(config: &ClientConfig) -> Self {
        Self { timeout: config.timeout(), max_retries: config.retry.max_retries }
    }
}

/// Optional per-call overrides
///
/// ```
/// use std::time::Duration;
/// use conduit_core::CallOptions;
///
/// let options = CallOptions::new()
///     .query("page", "1")
///     .query("limit", "10")
///     .timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
    skip_auth: bool,
    skip_retry: bool,
    idempotent: bool,
    cancel: Option<CancellationToken>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a query parameter (pagination, filters)
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Per-attempt timeout for this call
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Additional attempts allowed after the first
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Send without credentials and never refresh on 401
    #[must_use]
    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    /// Never retry transient failures
    #[must_use]
    pub fn skip_retry(mut self) -> Self {
        self.skip_retry = true;
        self
    }

    /// Declare a POST/PATCH safe to resubmit
    #[must_use]
    pub fn idempotent(mut self) -> Self {
        self.idempotent = true;
        self
    }

    /// Cancel the whole call, including pending backoff and refresh waits
    #[must_use]
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Merge over `defaults` into an immutable descriptor plus the call's
    /// cancellation token.
    pub fn into_descriptor(
        self,
        method: Method,
        path: &str,
        body: Option<Value>,
        defaults: &RequestDefaults,
    ) -> (RequestDescriptor, CancellationToken) {
        let descriptor = RequestDescriptor {
            method,
            path: path.to_string(),
            body,
            query: self.query,
            headers: self.headers,
            timeout: self.timeout.unwrap_or(defaults.timeout),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            skip_auth: self.skip_auth,
            skip_retry: self.skip_retry,
            idempotent: self.idempotent,
        };
        (descriptor, self.cancel.unwrap_or_default())
    }
}
