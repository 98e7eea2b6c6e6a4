#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use conduit_core::Sleeper;
use conduit_domain::{ClientConfig, Credential, RetryConfig};
use conduit_infra::{ApiClient, InMemoryCredentialStore};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Base backoff delay used by test clients.
pub const BASE_DELAY: Duration = Duration::from_millis(100);

/// Sleeper that records every requested delay and returns immediately.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    /// All delays requested so far, in order.
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().expect("sleeper mutex poisoned").clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().expect("sleeper mutex poisoned").push(duration);
    }
}

/// Test client configuration pointed at a mock server.
pub fn test_config(server: &MockServer) -> ClientConfig {
    ClientConfig {
        base_url: server.uri(),
        timeout_ms: 2_000,
        retry: RetryConfig { max_retries: 3, base_delay_ms: 100, max_delay_ms: 10_000 },
        ..Default::default()
    }
}

/// Client with a recording sleeper and, optionally, a stored credential.
pub async fn test_client(
    config: ClientConfig,
    token: Option<&str>,
) -> (ApiClient, RecordingSleeper) {
    let sleeper = RecordingSleeper::default();
    let store = match token {
        Some(token) => InMemoryCredentialStore::with_credential(Credential::new(token)),
        None => InMemoryCredentialStore::new(),
    };

    let client = ApiClient::builder()
        .config(config)
        .credential_store(Arc::new(store))
        .sleeper(Arc::new(sleeper.clone()))
        .build()
        .await
        .expect("client should build");

    (client, sleeper)
}

/// Mount the refresh endpoint, answering with `new_token` after `delay`.
pub async fn mount_refresh(server: &MockServer, new_token: &str, delay: Duration, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": new_token })).set_delay(delay),
        )
        .expect(expected)
        .mount(server)
        .await;
}

/// Assert each delay sits in `[base * 2^n, base * 2^n + base)`.
pub fn assert_geometric(delays: &[Duration]) {
    for (n, delay) in delays.iter().enumerate() {
        let floor = BASE_DELAY * 2u32.pow(n as u32);
        assert!(
            *delay >= floor && *delay < floor + BASE_DELAY,
            "delay {n} was {delay:?}, expected [{floor:?}, {:?})",
            floor + BASE_DELAY
        );
    }
}
