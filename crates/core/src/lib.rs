//! # Conduit Core
//!
//! Request pipeline logic - no transport or storage code.
//!
//! This crate contains:
//! - Payload transformation and error classification
//! - The retry / backoff decision engine
//! - The auth coordinator (single-flight credential refresh)
//! - The request executor that ties the stages together
//! - Port interfaces (traits) for transport, storage and refresh
//!
//! ## Architecture Principles
//! - Only depends on `conduit-domain`
//! - All I/O reaches the outside world via traits in [`ports`]
//! - Pipeline stages are plain functions composed in a fixed order

pub mod auth;
pub mod classify;
pub mod executor;
pub mod payload;
pub mod ports;
pub mod retry;

pub use auth::{AuthCoordinator, AuthPhase};
pub use classify::{classify, Failure};
pub use executor::{CallOptions, RequestDefaults, RequestExecutor};
pub use payload::{prepare_outgoing, unwrap_incoming};
pub use ports::{
    CredentialStore, Sleeper, TokenRefresher, TokioSleeper, Transport, TransportError,
    TransportErrorKind, TransportRequest, TransportResponse,
};
pub use retry::{AttemptState, RetryDecision, RetryPolicy};
