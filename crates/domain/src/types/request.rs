//! Request descriptors
//!
//! A [`RequestDescriptor`] is the fully-resolved description of one logical
//! call: client defaults with per-call overrides already merged in. It is
//! never mutated after construction; retries re-send the same descriptor.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_MS};
use crate::impl_label_conversions;

/// HTTP verbs exposed by the client facade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl_label_conversions!(Method {
    Get => "GET",
    Post => "POST",
    Put => "PUT",
    Patch => "PATCH",
    Delete => "DELETE",
});

impl Method {
    /// Verbs that are safe to repeat without caller opt-in.
    ///
    /// POST and PATCH are excluded: callers mark them idempotent explicitly.
    pub fn is_idempotent(self) -> bool {
        matches!(self, Self::Get | Self::Put | Self::Delete)
    }
}

/// Immutable description of a single logical call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Path relative to the client base URL, e.g. `/resource/42`
    pub path: String,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Additional attempts allowed after the first
    pub max_retries: u32,
    pub skip_auth: bool,
    pub skip_retry: bool,
    /// Caller opt-in for retrying non-idempotent verbs
    pub idempotent: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
            headers: Vec::new(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            skip_auth: false,
            skip_retry: false,
            idempotent: false,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Whether transient failures of this request may be re-sent at all.
    pub fn is_retry_safe(&self) -> bool {
        !self.skip_retry && (self.method.is_idempotent() || self.idempotent)
    }

    /// Additional attempts the backoff path may spend on this request.
    pub fn retry_budget(&self) -> u32 {
        if self.skip_retry {
            0
        } else {
            self.max_retries
        }
    }
}
