//! Shared test helpers for `conduit-core` integration tests.
//!
//! Lightweight port implementations so the tests can focus on pipeline
//! behaviour instead of boilerplate.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use conduit_core::{
    CredentialStore, TokenRefresher, Transport, TransportError, TransportRequest,
    TransportResponse,
};
use conduit_domain::{ClassifiedError, Credential, Result as DomainResult};
use parking_lot::Mutex;

/// In-memory credential store that counts writes.
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Credential>>,
    pub writes: AtomicUsize,
}

impl MemoryStore {
    pub fn holding(token: &str) -> Arc<Self> {
        Arc::new(Self { slot: Mutex::new(Some(Credential::new(token))), ..Default::default() })
    }

    pub fn current(&self) -> Option<Credential> {
        self.slot.lock().clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self) -> DomainResult<Option<Credential>> {
        Ok(self.slot.lock().clone())
    }

    async fn set(&self, credential: &Credential) -> DomainResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        *self.slot.lock() = Some(credential.clone());
        Ok(())
    }

    async fn clear(&self) -> DomainResult<()> {
        self.slot.lock().take();
        Ok(())
    }
}

/// Refresher that hands out `token-N` after a short delay.
pub struct SlowRefresher {
    delay: Duration,
    pub calls: AtomicUsize,
}

impl SlowRefresher {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self { delay, calls: AtomicUsize::new(0) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRefresher for SlowRefresher {
    async fn refresh(&self, _current: Credential) -> Result<Credential, ClassifiedError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        Ok(Credential::new(format!("token-{n}")))
    }
}

/// Server stand-in: answers 401 unless the request carries `valid_bearer`.
pub struct TokenGate {
    valid_bearer: String,
    latency: Duration,
    pub seen: Mutex<Vec<Option<String>>>,
}

impl TokenGate {
    pub fn accepting(token: &str, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            valid_bearer: format!("Bearer {token}"),
            latency,
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Transport for TokenGate {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let bearer = request.header("Authorization").map(str::to_string);
        self.seen.lock().push(bearer.clone());
        tokio::time::sleep(self.latency).await;

        let status = if bearer.as_deref() == Some(self.valid_bearer.as_str()) { 200 } else { 401 };
        Ok(TransportResponse { status, body: None })
    }
}
