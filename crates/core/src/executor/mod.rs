//! Request executor
//!
//! Runs one logical call through a fixed pipeline:
//!
//! ```text
//! transform-out → auth-attach → transport → classify → transform-in
//! ```
//!
//! On failure it either re-sends after a backoff delay, waits for a shared
//! credential refresh and re-sends once, or surfaces the classified error.

pub mod options;

use std::sync::Arc;

use conduit_domain::{ApiResponse, ClassifiedError, ErrorKind, RequestDescriptor};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

pub use self::options::{CallOptions, RequestDefaults};
use crate::auth::AuthCoordinator;
use crate::classify::{classify, Failure};
use crate::payload::{prepare_outgoing, unwrap_incoming};
use crate::ports::{Sleeper, TokioSleeper, Transport, TransportError, TransportRequest, TransportResponse};
use crate::retry::{AttemptState, RetryPolicy};

enum AttemptError {
    Transport(TransportError),
    Cancelled,
}

/// Orchestrates attempts, retries and refreshes for logical calls
pub struct RequestExecutor {
    base_url: String,
    transport: Arc<dyn Transport>,
    auth: Arc<AuthCoordinator>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    default_headers: Vec<(String, String)>,
}

impl RequestExecutor {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        auth: Arc<AuthCoordinator>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
            auth,
            policy,
            sleeper: Arc::new(TokioSleeper),
            default_headers: vec![("Accept".to_string(), "application/json".to_string())],
        }
    }

    /// Replace the backoff timer
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn auth(&self) -> &Arc<AuthCoordinator> {
        &self.auth
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Absolute URL for a path relative to the base URL
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Execute one logical call, including all of its retries.
    ///
    /// # Errors
    /// Returns the classified error of the last attempt once retries are
    /// exhausted, the policy declines, a refresh fails, or `cancel` fires.
    #[instrument(
        skip_all,
        fields(
            call_id = %uuid::Uuid::new_v4(),
            method = %descriptor.method,
            path = %descriptor.path,
        )
    )]
    pub async fn execute(
        &self,
        descriptor: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse<Value>, ClassifiedError> {
        let body = descriptor.body.as_ref().map(prepare_outgoing);
        let retry_safe = descriptor.is_retry_safe();
        let mut state = AttemptState::initial();

        loop {
            if cancel.is_cancelled() {
                return Err(ClassifiedError::cancelled());
            }

            let mut request = self.build_request(descriptor, body.clone());
            let generation = (!descriptor.skip_auth).then(|| self.auth.attach(&mut request));

            debug!(attempt = state.attempt_number(), "Sending request");

            let failure = match self.send_attempt(request, cancel).await {
                Ok(response) if response.is_success() => {
                    info!(
                        attempt = state.attempt_number(),
                        status = response.status,
                        "Request succeeded"
                    );
                    return Ok(unwrap_incoming(response.body.unwrap_or(Value::Null)));
                }
                Ok(response) => classify(Failure::Response(&response)),
                Err(AttemptError::Transport(err)) => classify(Failure::Transport(&err)),
                Err(AttemptError::Cancelled) => {
                    debug!("Request cancelled in flight");
                    return Err(ClassifiedError::cancelled());
                }
            };

            warn!(
                attempt = state.attempt_number(),
                kind = %failure.kind,
                status = ?failure.http_status,
                message = %failure.message,
                "Request attempt failed"
            );

            // The post-refresh re-send is final whatever it fails with.
            if state.refreshed {
                return Err(failure);
            }

            if failure.kind == ErrorKind::Auth {
                let Some(generation) = generation else {
                    return Err(failure);
                };
                self.auth.await_refresh(generation, cancel).await?;
                state = state.after_refresh();
                continue;
            }

            let decision = self.policy.should_retry(
                failure.kind,
                state.retries,
                descriptor.retry_budget(),
                retry_safe,
            );
            if !decision.retry {
                return Err(failure);
            }

            debug!(delay_ms = decision.delay.as_millis() as u64, "Backing off before retry");
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(ClassifiedError::cancelled()),
                () = self.sleeper.sleep(decision.delay) => {}
            }
            state = state.after_backoff(decision.delay);
        }
    }

    fn build_request(&self, descriptor: &RequestDescriptor, body: Option<Value>) -> TransportRequest {
        let mut request = TransportRequest {
            method: descriptor.method,
            url: self.url_for(&descriptor.path),
            query: descriptor.query.clone(),
            headers: self.default_headers.clone(),
            body,
            timeout: descriptor.timeout,
        };
        for (name, value) in &descriptor.headers {
            request.set_header(name, value.clone());
        }
        request
    }

    async fn send_attempt(
        &self,
        request: TransportRequest,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse, AttemptError> {
        let timeout = request.timeout;
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(AttemptError::Cancelled),
            result = tokio::time::timeout(timeout, self.transport.send(request)) => match result {
                Ok(Ok(response)) => Ok(response),
                Ok(Err(err)) => Err(AttemptError::Transport(err)),
                Err(_) => Err(AttemptError::Transport(TransportError::timeout(timeout))),
            },
        }
    }
}
