//! Public API client
//!
//! - [`ApiClient`]: typed facade over the request executor
//! - [`HttpTokenRefresher`]: refresh endpoint client used by the auth
//!   coordinator

pub mod client;
pub mod refresh;

pub use client::{ApiClient, ApiClientBuilder};
pub use refresh::HttpTokenRefresher;
