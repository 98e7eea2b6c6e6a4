//! Error types used throughout Conduit
//!
//! Two error families exist:
//! - [`ClassifiedError`]: the only error a request ever surfaces to callers.
//!   Every failure path (transport exception, non-2xx status, timeout,
//!   cancellation, undecodable body) is converted into exactly one of these.
//! - [`ConduitError`]: failures outside the per-call path (configuration,
//!   credential storage).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constants::{CANCELLED_STATUS, TIMEOUT_STATUS};
use crate::impl_label_conversions;

/// Fixed taxonomy of request failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// No response received (connection refused, DNS, timeout, cancellation)
    Network,
    /// 401 / 403 - resolved by refresh-and-retry before surfacing
    Auth,
    /// 400 / 422 - never retried, carries field-level details when available
    Validation,
    /// 5xx - retried with backoff
    Server,
    /// Anything else
    Unknown,
}

impl_label_conversions!(ErrorKind {
    Network => "network",
    Auth => "auth",
    Validation => "validation",
    Server => "server",
    Unknown => "unknown",
});

impl ErrorKind {
    /// Transient kinds may succeed when the same request is sent again.
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Network | Self::Server)
    }
}

/// Normalized failure handed to callers
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{kind} error: {message}")]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    /// Response status, or a sentinel ([`TIMEOUT_STATUS`], [`CANCELLED_STATUS`])
    /// for `Network` failures that never produced a response
    pub http_status: Option<u16>,
    pub message: String,
    /// Field-level error map for `Validation`, raw error body otherwise
    pub details: Option<Value>,
    /// Rendered underlying error, if any
    pub cause: Option<String>,
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, http_status: None, message: message.into(), details: None, cause: None }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Auth, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    /// A transport attempt that exceeded its own timeout
    pub fn timeout() -> Self {
        Self::network("request timed out").with_status(TIMEOUT_STATUS)
    }

    /// A logical call abandoned by its caller
    pub fn cancelled() -> Self {
        Self::network("request cancelled").with_status(CANCELLED_STATUS)
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::Network && self.http_status == Some(TIMEOUT_STATUS)
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == ErrorKind::Network && self.http_status == Some(CANCELLED_STATUS)
    }

    /// Messages recorded against `field` in a validation error map.
    ///
    /// Accepts both `{"field": ["msg", ...]}` and `{"field": "msg"}`.
    pub fn field_errors(&self, field: &str) -> Vec<String> {
        match self.details.as_ref().and_then(|d| d.get(field)) {
            Some(Value::Array(items)) => {
                items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect()
            }
            Some(Value::String(message)) => vec![message.clone()],
            _ => Vec::new(),
        }
    }
}

/// Errors raised outside the request path
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ConduitError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credential storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for non-request Conduit operations
pub type Result<T> = std::result::Result<T, ConduitError>;
