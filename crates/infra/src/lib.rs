//! # Conduit Infrastructure
//!
//! Infrastructure implementations of core ports, plus the public client.
//!
//! This crate contains:
//! - The reqwest-backed HTTP transport
//! - The refresh endpoint client
//! - Credential stores (in-memory, OS keychain)
//! - Configuration loading and tracing bootstrap
//! - [`ApiClient`], the typed facade callers use
//!
//! ## Architecture
//! - Implements traits defined in `conduit-core`
//! - Depends on `conduit-domain` and `conduit-core`
//! - Contains all "impure" code (network, keychain, files)

pub mod api;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::{ApiClient, ApiClientBuilder, HttpTokenRefresher};
pub use conduit_core::CallOptions;
pub use credentials::{InMemoryCredentialStore, KeychainCredentialStore};
pub use http::ReqwestTransport;
pub use tokio_util::sync::CancellationToken;
