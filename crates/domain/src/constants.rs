//! Domain-level constants
//!
//! Defaults and sentinel values shared by the client layers.

// Client defaults
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_USER_AGENT: &str = concat!("conduit/", env!("CARGO_PKG_VERSION"));

// Retry defaults: 3 additional attempts after the first, 1s base delay
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;
/// Upper bound on the backoff exponent so `2^n` never overflows.
pub const MAX_BACKOFF_EXPONENT: u32 = 16;

// Auth defaults
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";
pub const DEFAULT_KEYCHAIN_SERVICE: &str = "conduit";
pub const DEFAULT_KEYCHAIN_ACCOUNT: &str = "default";
pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const BEARER_PREFIX: &str = "Bearer ";

/// Status sentinel for an attempt aborted by its per-attempt timeout.
///
/// Only meaningful together with `ErrorKind::Network`; a real 408 response is
/// classified `Unknown`.
pub const TIMEOUT_STATUS: u16 = 408;

/// Status sentinel for a call cancelled by its caller.
pub const CANCELLED_STATUS: u16 = 499;
