//! OS keychain credential store
//!
//! The credential is stored as one JSON document under
//! `(service, account)`, so token, refresh token and expiry are replaced
//! together.

use async_trait::async_trait;
use conduit_core::CredentialStore;
use conduit_domain::constants::DEFAULT_KEYCHAIN_ACCOUNT;
use conduit_domain::{ConduitError, Credential, Result};
use keyring::Entry;
use tracing::debug;

use crate::errors::InfraError;

/// Credential store backed by the platform keychain
pub struct KeychainCredentialStore {
    service: String,
    account: String,
}

impl KeychainCredentialStore {
    /// Store under `service` with the default account name
    pub fn new(service: impl Into<String>) -> Self {
        Self::with_account(service, DEFAULT_KEYCHAIN_ACCOUNT)
    }

    pub fn with_account(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self { service: service.into(), account: account.into() }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Run a blocking keychain operation off the async runtime.
    async fn with_entry<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Entry) -> Result<T> + Send + 'static,
    {
        let service = self.service.clone();
        let account = self.account.clone();

        tokio::task::spawn_blocking(move || {
            let entry = Entry::new(&service, &account).map_err(InfraError::from)?;
            op(entry)
        })
        .await
        .map_err(|e| ConduitError::Internal(format!("keychain task failed: {e}")))?
    }
}

#[async_trait]
impl CredentialStore for KeychainCredentialStore {
    async fn get(&self) -> Result<Option<Credential>> {
        debug!(service = %self.service, account = %self.account, "Reading credential from keychain");

        let raw = self
            .with_entry(|entry| match entry.get_password() {
                Ok(raw) => Ok(Some(raw)),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(e) => Err(InfraError::from(e).into()),
            })
            .await?;
        let Some(raw) = raw else {
            return Ok(None);
        };

        serde_json::from_str(&raw).map(Some).map_err(|e| {
            ConduitError::Storage(format!("stored credential is not valid JSON: {e}"))
        })
    }

    async fn set(&self, credential: &Credential) -> Result<()> {
        debug!(service = %self.service, account = %self.account, "Storing credential in keychain");

        let raw = serde_json::to_string(credential)
            .map_err(|e| ConduitError::Internal(format!("failed to serialize credential: {e}")))?;
        self.with_entry(move |entry| entry.set_password(&raw).map_err(|e| InfraError::from(e).into()))
            .await
    }

    async fn clear(&self) -> Result<()> {
        debug!(service = %self.service, account = %self.account, "Deleting credential from keychain");

        self.with_entry(|entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(InfraError::from(e).into()),
        })
        .await
    }
}
