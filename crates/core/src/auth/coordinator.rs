//! Auth coordinator with single-flight refresh
//!
//! Owns the current credential and the refresh state machine
//! (`Idle` ⇄ `Refreshing`). At most one refresh call is in flight per
//! coordinator; every request that hits an auth failure while it runs is
//! queued behind it and resumed (or failed) in queue order when it settles.
//!
//! The refresh itself runs on a spawned task, so cancelling any waiter -
//! including the one that started the refresh - never aborts it.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use conduit_domain::constants::AUTHORIZATION_HEADER;
use conduit_domain::{ClassifiedError, Credential, Result};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::ports::{CredentialStore, TokenRefresher, TransportRequest};

/// Refresh state machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Idle,
    Refreshing,
}

type RefreshOutcome = std::result::Result<(), ClassifiedError>;

struct Waiter {
    id: u64,
    tx: oneshot::Sender<RefreshOutcome>,
}

struct AuthState {
    credential: Option<Credential>,
    /// Bumped on every credential replacement or removal
    generation: u64,
    phase: AuthPhase,
    waiters: VecDeque<Waiter>,
    next_waiter_id: u64,
}

impl AuthState {
    fn enqueue(&mut self) -> (u64, oneshot::Receiver<RefreshOutcome>) {
        let (tx, rx) = oneshot::channel();
        let id = self.next_waiter_id;
        self.next_waiter_id += 1;
        self.waiters.push_back(Waiter { id, tx });
        (id, rx)
    }

    fn replace_credential(&mut self, credential: Option<Credential>) {
        self.credential = credential;
        self.generation += 1;
    }
}

/// Shared credential holder and refresh coordinator
pub struct AuthCoordinator {
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    state: Mutex<AuthState>,
}

impl AuthCoordinator {
    pub fn new(store: Arc<dyn CredentialStore>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            store,
            refresher,
            state: Mutex::new(AuthState {
                credential: None,
                generation: 0,
                phase: AuthPhase::Idle,
                waiters: VecDeque::new(),
                next_waiter_id: 0,
            }),
        }
    }

    /// Load the persisted credential into memory.
    ///
    /// # Returns
    /// `true` if a credential was found
    ///
    /// # Errors
    /// Returns error if the credential store cannot be read
    pub async fn initialize(&self) -> Result<bool> {
        let stored = self.store.get().await?;
        let found = stored.is_some();

        match stored.as_ref() {
            Some(credential) if credential.is_expired(Duration::ZERO) => {
                info!(
                    seconds_until_expiry = ?credential.seconds_until_expiry(),
                    "Stored credential is past its expiry hint; first request will refresh it"
                );
            }
            Some(_) => info!("Auth coordinator initialized with stored credential"),
            None => debug!("No stored credential found"),
        }

        self.state.lock().replace_credential(stored);
        Ok(found)
    }

    /// Attach the current bearer credential to an outgoing attempt.
    ///
    /// Leaves the request unauthenticated when no credential is held.
    /// Returns the credential generation the request was sent with.
    pub fn attach(&self, request: &mut TransportRequest) -> u64 {
        let state = self.state.lock();
        if let Some(credential) = state.credential.as_ref() {
            request.set_header(AUTHORIZATION_HEADER, credential.bearer());
        }
        state.generation
    }

    /// Explicitly install a credential (login).
    ///
    /// Re-enables automatic refresh after an earlier refresh failure.
    ///
    /// # Errors
    /// Returns error if the credential cannot be persisted; the in-memory
    /// credential is left unchanged in that case
    pub async fn set_credential(&self, credential: Credential) -> Result<()> {
        self.store.set(&credential).await?;
        self.state.lock().replace_credential(Some(credential));
        info!("Credential installed");
        Ok(())
    }

    /// Forget the current credential (logout).
    ///
    /// # Errors
    /// Returns error if the credential store cannot be cleared; the
    /// in-memory credential is dropped regardless
    pub async fn clear_credential(&self) -> Result<()> {
        self.state.lock().replace_credential(None);
        self.store.clear().await?;
        info!("Credential cleared");
        Ok(())
    }

    pub fn current_credential(&self) -> Option<Credential> {
        self.state.lock().credential.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.lock().credential.is_some()
    }

    pub fn phase(&self) -> AuthPhase {
        self.state.lock().phase
    }

    /// Number of requests suspended behind the in-flight refresh
    pub fn queued(&self) -> usize {
        self.state.lock().waiters.len()
    }

    /// Resolve an auth failure for a request sent with credential `generation`.
    ///
    /// - The credential was replaced since the request was sent: return at
    ///   once so the caller retries with the current one.
    /// - No credential is held: fail, no refresh is attempted.
    /// - Idle: start the refresh and wait for it.
    /// - Refreshing: queue behind the in-flight refresh.
    ///
    /// # Errors
    /// - `Auth` if there is nothing to refresh or the refresh failed
    /// - the cancellation error if `cancel` fires first; the caller is
    ///   removed from the queue and the refresh continues
    pub async fn await_refresh(
        self: &Arc<Self>,
        generation: u64,
        cancel: &CancellationToken,
    ) -> std::result::Result<(), ClassifiedError> {
        let (id, rx) = {
            let mut state = self.state.lock();

            if state.generation != generation {
                return if state.credential.is_some() {
                    debug!("Credential already replaced, retrying with current credential");
                    Ok(())
                } else {
                    Err(ClassifiedError::auth("credential was revoked"))
                };
            }

            let Some(current) = state.credential.clone() else {
                return Err(ClassifiedError::auth("authentication required"));
            };

            let (id, rx) = state.enqueue();
            if state.phase == AuthPhase::Idle {
                state.phase = AuthPhase::Refreshing;
                info!("Auth failure observed, starting credential refresh");
                let this = Arc::clone(self);
                tokio::spawn(async move { this.run_refresh(current).await });
            } else {
                debug!(queued = state.waiters.len(), "Refresh in flight, request queued");
            }
            (id, rx)
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                self.state.lock().waiters.retain(|w| w.id != id);
                debug!("Queued request cancelled while waiting for refresh");
                Err(ClassifiedError::cancelled())
            }
            outcome = rx => outcome.unwrap_or_else(|_| {
                Err(ClassifiedError::auth("credential refresh was abandoned"))
            }),
        }
    }

    async fn run_refresh(self: Arc<Self>, current: Credential) {
        let refresher = Arc::clone(&self.refresher);
        let result = match tokio::spawn(async move { refresher.refresh(current).await }).await {
            Ok(result) => result,
            Err(join_error) => Err(ClassifiedError::auth("credential refresh task failed")
                .with_cause(join_error.to_string())),
        };

        match result {
            Ok(credential) => {
                if let Err(e) = self.store.set(&credential).await {
                    warn!(error = %e, "Failed to persist refreshed credential");
                }
                let waiters = {
                    let mut state = self.state.lock();
                    state.replace_credential(Some(credential));
                    state.phase = AuthPhase::Idle;
                    std::mem::take(&mut state.waiters)
                };
                info!(resumed = waiters.len(), "Credential refreshed");
                for waiter in waiters {
                    let _ = waiter.tx.send(Ok(()));
                }
            }
            Err(err) => {
                if let Err(e) = self.store.clear().await {
                    warn!(error = %e, "Failed to clear rejected credential");
                }
                let waiters = {
                    let mut state = self.state.lock();
                    state.replace_credential(None);
                    state.phase = AuthPhase::Idle;
                    std::mem::take(&mut state.waiters)
                };
                warn!(error = %err, failed = waiters.len(), "Credential refresh failed");

                let failure = ClassifiedError::auth("credential refresh failed")
                    .with_cause(err.to_string());
                let failure = match err.http_status {
                    Some(status) => failure.with_status(status),
                    None => failure,
                };
                for waiter in waiters {
                    let _ = waiter.tx.send(Err(failure.clone()));
                }
            }
        }
    }
}
