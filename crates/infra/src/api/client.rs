//! Typed API client
//!
//! Thin wrappers (`get`, `post`, `put`, `patch`, `delete`) that build a
//! request descriptor, hand it to the [`RequestExecutor`] and decode the
//! response `data` into the caller's type. Callers only ever see
//! `ApiResponse { data, meta }` or a [`ClassifiedError`].

use std::sync::Arc;

use conduit_core::{
    AuthCoordinator, CallOptions, CredentialStore, RequestDefaults, RequestExecutor, RetryPolicy,
    Sleeper, TokenRefresher, Transport,
};
use conduit_domain::{ApiResponse, ClassifiedError, ClientConfig, Credential, Method, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use super::refresh::HttpTokenRefresher;
use crate::credentials::KeychainCredentialStore;
use crate::http::ReqwestTransport;

type CallResult<T> = std::result::Result<ApiResponse<T>, ClassifiedError>;

/// API client with retry, backoff and single-flight credential refresh.
///
/// Cheap to clone; clones share the credential and refresh state.
///
/// ```no_run
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// use conduit_infra::{ApiClient, CallOptions};
/// use serde_json::Value;
///
/// let client = ApiClient::builder().base_url("https://api.example.com/v1").build().await?;
/// let page = client
///     .get_with::<Vec<Value>>("/projects", CallOptions::new().query("page", 1).query("limit", 10))
///     .await?;
/// println!("{} projects", page.page_meta().map_or(0, |m| m.total));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    executor: Arc<RequestExecutor>,
    defaults: RequestDefaults,
}

impl ApiClient {
    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Build a client with the default transport and an in-memory store
    ///
    /// # Errors
    /// Returns `ConduitError::Config` if the configuration is invalid
    pub async fn from_config(config: ClientConfig) -> Result<Self> {
        Self::builder().config(config).build().await
    }

    /// Build a client from environment variables or a config file
    ///
    /// # Errors
    /// Returns `ConduitError::Config` if no valid configuration is found
    pub async fn from_env() -> Result<Self> {
        Self::from_config(crate::config::load()?).await
    }

    /// Execute a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> CallResult<T> {
        self.get_with(path, CallOptions::new()).await
    }

    pub async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        options: CallOptions,
    ) -> CallResult<T> {
        self.call(Method::Get, path, None, options).await
    }

    /// Execute a POST request.
    ///
    /// Not retried on transient failures unless the call is marked
    /// [`CallOptions::idempotent`].
    pub async fn post<T, B>(&self, path: &str, body: &B) -> CallResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.post_with(path, body, CallOptions::new()).await
    }

    pub async fn post_with<T, B>(&self, path: &str, body: &B, options: CallOptions) -> CallResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.call(Method::Post, path, Some(encode(body)?), options).await
    }

    /// Execute a PUT request
    pub async fn put<T, B>(&self, path: &str, body: &B) -> CallResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.put_with(path, body, CallOptions::new()).await
    }

    pub async fn put_with<T, B>(&self, path: &str, body: &B, options: CallOptions) -> CallResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.call(Method::Put, path, Some(encode(body)?), options).await
    }

    /// Execute a PATCH request.
    ///
    /// Retry rules are the same as for [`ApiClient::post`].
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> CallResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.patch_with(path, body, CallOptions::new()).await
    }

    pub async fn patch_with<T, B>(
        &self,
        path: &str,
        body: &B,
        options: CallOptions,
    ) -> CallResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.call(Method::Patch, path, Some(encode(body)?), options).await
    }

    /// Execute a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> CallResult<T> {
        self.delete_with(path, CallOptions::new()).await
    }

    pub async fn delete_with<T: DeserializeOwned>(
        &self,
        path: &str,
        options: CallOptions,
    ) -> CallResult<T> {
        self.call(Method::Delete, path, None, options).await
    }

    /// Install a credential after an explicit login
    ///
    /// # Errors
    /// Returns `ConduitError::Storage` if the credential cannot be persisted
    #[instrument(skip_all)]
    pub async fn set_credential(&self, credential: Credential) -> Result<()> {
        self.executor.auth().set_credential(credential).await
    }

    /// Drop the current credential from memory and the store
    ///
    /// # Errors
    /// Returns `ConduitError::Storage` if the store cannot be cleared
    #[instrument(skip_all)]
    pub async fn logout(&self) -> Result<()> {
        self.executor.auth().clear_credential().await
    }

    pub fn is_authenticated(&self) -> bool {
        self.executor.auth().is_authenticated()
    }

    pub fn auth(&self) -> &Arc<AuthCoordinator> {
        self.executor.auth()
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        options: CallOptions,
    ) -> CallResult<T> {
        let (descriptor, cancel) = options.into_descriptor(method, path, body, &self.defaults);
        let response = self.executor.execute(&descriptor, &cancel).await?;
        decode(response)
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> std::result::Result<Value, ClassifiedError> {
    serde_json::to_value(body).map_err(|e| {
        ClassifiedError::unknown("request body could not be serialized").with_cause(e.to_string())
    })
}

fn decode<T: DeserializeOwned>(response: ApiResponse<Value>) -> CallResult<T> {
    response.try_map(serde_json::from_value).map_err(|e| {
        ClassifiedError::unknown(format!(
            "response data could not be decoded as {}",
            std::any::type_name::<T>()
        ))
        .with_cause(e.to_string())
    })
}

fn default_credential_store(config: &ClientConfig) -> KeychainCredentialStore {
    KeychainCredentialStore::new(config.auth.keychain_service.clone())
}

/// Builder for [`ApiClient`]
///
/// Every collaborator defaults to the production implementation:
/// [`ReqwestTransport`], a [`KeychainCredentialStore`] under
/// `auth.keychain_service` and [`HttpTokenRefresher`] pointed at
/// `auth.refresh_path`.
#[derive(Default)]
pub struct ApiClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    store: Option<Arc<dyn CredentialStore>>,
    refresher: Option<Arc<dyn TokenRefresher>>,
    sleeper: Option<Arc<dyn Sleeper>>,
}

impl ApiClientBuilder {
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn token_refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Replace the backoff timer
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// Validate the configuration, wire the pipeline and load any stored
    /// credential.
    ///
    /// # Errors
    /// - `ConduitError::Config` if the configuration is invalid or the HTTP
    ///   client cannot be built
    /// - `ConduitError::Storage` if the credential store cannot be read
    pub async fn build(self) -> Result<ApiClient> {
        let config = self.config;
        config.validate()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                ReqwestTransport::builder()
                    .user_agent(config.user_agent.clone())
                    .connect_timeout(config.timeout())
                    .build()?,
            ),
        };
        let store = self.store.unwrap_or_else(|| Arc::new(default_credential_store(&config)));
        let refresher = self.refresher.unwrap_or_else(|| {
            Arc::new(HttpTokenRefresher::new(
                transport.clone(),
                format!("{base_url}{}", config.auth.refresh_path),
                config.timeout(),
            ))
        });

        let auth = Arc::new(AuthCoordinator::new(store, refresher));
        auth.initialize().await?;

        let mut executor = RequestExecutor::new(
            base_url.clone(),
            transport,
            auth,
            RetryPolicy::from_config(&config.retry),
        );
        if let Some(sleeper) = self.sleeper {
            executor = executor.with_sleeper(sleeper);
        }

        info!(
            base_url = %base_url,
            timeout_ms = config.timeout_ms,
            max_retries = config.retry.max_retries,
            "API client ready"
        );

        Ok(ApiClient { executor: Arc::new(executor), defaults: RequestDefaults::from(&config) })
    }
}
