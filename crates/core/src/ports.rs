//! Port interfaces for the request pipeline
//!
//! The executor and auth coordinator reach transport, persistence, token
//! refresh and timers only through these traits.

use std::time::Duration;

use async_trait::async_trait;
use conduit_domain::{ClassifiedError, Credential, Method, Result};
use serde_json::Value;

/// One wire-level attempt, fully resolved
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    /// Absolute URL without the query string
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: Duration,
}

impl TransportRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Insert or replace a header (names compare case-insensitively).
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value));
    }
}

/// A response that arrived, whatever its status
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    /// Parsed JSON body; a non-JSON body is carried as a string, an empty
    /// body as `None`
    pub body: Option<Value>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Why no response arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection refused, DNS failure, TLS failure
    Connect,
    /// The attempt exceeded its timeout
    Timeout,
    /// Anything else that produced no response
    Other,
}

/// Transport-level failure: the request produced no response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(TransportErrorKind::Timeout, format!("timed out after {}ms", after.as_millis()))
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Executes a single HTTP attempt
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one attempt. Non-2xx statuses are `Ok`; only a missing response
    /// is an `Err`.
    async fn send(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError>;
}

/// Persisted credential storage
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the stored credential, `None` if nothing is stored
    async fn get(&self) -> Result<Option<Credential>>;

    /// Persist a credential, replacing any previous one
    async fn set(&self, credential: &Credential) -> Result<()>;

    /// Remove the stored credential (idempotent)
    async fn clear(&self) -> Result<()>;
}

/// Calls the credential refresh endpoint
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Exchange the current credential for a new one.
    ///
    /// # Errors
    /// Any error means the refresh failed; the coordinator reports it to
    /// queued callers as an `Auth` failure.
    async fn refresh(
        &self,
        current: Credential,
    ) -> std::result::Result<Credential, ClassifiedError>;
}

/// Timer used for inter-retry backoff
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real timer backed by `tokio::time`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
