use async_trait::async_trait;
use conduit_core::CredentialStore;
use conduit_domain::{Credential, Result};
use parking_lot::Mutex;

/// Credential store that lives only as long as the process
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    slot: Mutex<Option<Credential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a credential
    pub fn with_credential(credential: Credential) -> Self {
        Self { slot: Mutex::new(Some(credential)) }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get(&self) -> Result<Option<Credential>> {
        Ok(self.slot.lock().clone())
    }

    async fn set(&self, credential: &Credential) -> Result<()> {
        *self.slot.lock() = Some(credential.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.slot.lock().take();
        Ok(())
    }
}
