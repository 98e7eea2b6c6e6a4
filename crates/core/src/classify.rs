//! Error classification
//!
//! Maps a failed attempt to exactly one [`ClassifiedError`]. Rules, in
//! priority order:
//! 1. No response → `Network` (timeouts carry [`TIMEOUT_STATUS`](conduit_domain::constants::TIMEOUT_STATUS))
//! 2. 401 / 403 → `Auth`
//! 3. 400 / 422 → `Validation`, `details` from the body's `errors` map
//! 4. >= 500 → `Server`
//! 5. anything else → `Unknown`

use conduit_domain::{ClassifiedError, ErrorKind};
use serde_json::Value;

use crate::ports::{TransportError, TransportErrorKind, TransportResponse};

/// A failed attempt, as seen by the classifier
#[derive(Debug, Clone, Copy)]
pub enum Failure<'a> {
    /// The transport produced no response
    Transport(&'a TransportError),
    /// A response arrived with a status the caller cannot use
    Response(&'a TransportResponse),
}

/// Classify a failed attempt. Total: never panics, always yields one kind.
pub fn classify(failure: Failure<'_>) -> ClassifiedError {
    match failure {
        Failure::Transport(err) => classify_transport(err),
        Failure::Response(response) => classify_response(response),
    }
}

fn classify_transport(err: &TransportError) -> ClassifiedError {
    let classified = match err.kind {
        TransportErrorKind::Timeout => ClassifiedError::timeout(),
        TransportErrorKind::Connect => ClassifiedError::network("connection failed"),
        TransportErrorKind::Other => ClassifiedError::network("no response received"),
    };
    classified.with_cause(err.message.clone())
}

fn classify_response(response: &TransportResponse) -> ClassifiedError {
    let status = response.status;
    let body = response.body.as_ref();
    let message = body_message(body).unwrap_or_else(|| default_message(status));

    let kind = match status {
        401 | 403 => ErrorKind::Auth,
        400 | 422 => ErrorKind::Validation,
        s if s >= 500 => ErrorKind::Server,
        _ => ErrorKind::Unknown,
    };

    let details = match kind {
        ErrorKind::Validation => body.and_then(field_error_map),
        _ => body.filter(|b| !b.is_null()).cloned(),
    };

    let classified = ClassifiedError::new(kind, message).with_status(status);
    match details {
        Some(details) => classified.with_details(details),
        None => classified,
    }
}

/// Field-level error map of a validation body: `errors`, else `details`.
fn field_error_map(body: &Value) -> Option<Value> {
    ["errors", "details"]
        .iter()
        .filter_map(|key| body.get(key))
        .find(|v| v.is_object())
        .cloned()
}

fn body_message(body: Option<&Value>) -> Option<String> {
    let body = body?;
    if let Some(text) = body.as_str() {
        return (!text.trim().is_empty()).then(|| text.trim().to_string());
    }
    ["message", "error"]
        .iter()
        .filter_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::to_string)
        .next()
}

fn default_message(status: u16) -> String {
    let reason = match status {
        400 => "bad request",
        401 => "unauthorized",
        403 => "forbidden",
        404 => "not found",
        409 => "conflict",
        422 => "unprocessable entity",
        429 => "too many requests",
        500 => "internal server error",
        502 => "bad gateway",
        503 => "service unavailable",
        504 => "gateway timeout",
        _ => "request failed",
    };
    format!("HTTP {status}: {reason}")
}
