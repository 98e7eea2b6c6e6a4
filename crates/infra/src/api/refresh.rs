//! Refresh endpoint client
//!
//! Exchanges the current credential for a new one with
//! `POST {base_url}{refresh_path}`. The request carries the current bearer
//! and, when one is held, `{"refresh_token": ...}`.
//!
//! Accepted response shapes (optionally wrapped in `{"data": ...}`):
//! - `{"token": "..."}`
//! - `{"access_token": "...", "refresh_token": "...", "expires_in": 3600}`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use conduit_core::{unwrap_incoming, TokenRefresher, Transport, TransportRequest};
use conduit_domain::constants::AUTHORIZATION_HEADER;
use conduit_domain::{ClassifiedError, Credential, Method};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct RefreshBody {
    #[serde(alias = "access_token")]
    token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// [`TokenRefresher`] that calls the API's refresh endpoint
pub struct HttpTokenRefresher {
    transport: Arc<dyn Transport>,
    url: String,
    timeout: Duration,
}

impl HttpTokenRefresher {
    pub fn new(transport: Arc<dyn Transport>, url: impl Into<String>, timeout: Duration) -> Self {
        Self { transport, url: url.into(), timeout }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(&self, current: Credential) -> Result<Credential, ClassifiedError> {
        let mut request = TransportRequest {
            method: Method::Post,
            url: self.url.clone(),
            query: Vec::new(),
            headers: vec![("Accept".to_string(), "application/json".to_string())],
            body: current.refresh_token.as_ref().map(|token| json!({ "refresh_token": token })),
            timeout: self.timeout,
        };
        request.set_header(AUTHORIZATION_HEADER, current.bearer());

        debug!(url = %self.url, "Calling refresh endpoint");

        let response = self.transport.send(request).await.map_err(|err| {
            warn!(error = %err, "Refresh endpoint unreachable");
            ClassifiedError::auth("refresh endpoint unreachable").with_cause(err.to_string())
        })?;

        if !response.is_success() {
            warn!(status = response.status, "Refresh endpoint rejected credential");
            let mut err = ClassifiedError::auth("refresh endpoint rejected credential")
                .with_status(response.status);
            err.details = response.body;
            return Err(err);
        }

        let data = unwrap_incoming(response.body.unwrap_or(Value::Null)).data;
        let body: RefreshBody = serde_json::from_value(data).map_err(|e| {
            ClassifiedError::auth("refresh response missing token")
                .with_status(response.status)
                .with_cause(e.to_string())
        })?;

        let mut credential = Credential::new(body.token);
        // Keep the old refresh token unless the server rotated it.
        credential.refresh_token = body.refresh_token.or(current.refresh_token);
        if let Some(seconds) = body.expires_in {
            credential = credential.expires_in(seconds);
        }
        Ok(credential)
    }
}
