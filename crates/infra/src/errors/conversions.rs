//! Conversions from external infrastructure errors into Conduit errors.

use conduit_core::{TransportError, TransportErrorKind};
use conduit_domain::ConduitError;
use keyring::Error as KeyringError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ConduitError);

impl From<InfraError> for ConduitError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ConduitError> for InfraError {
    fn from(value: ConduitError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → ConduitError */
/* -------------------------------------------------------------------------- */

impl From<KeyringError> for InfraError {
    fn from(value: KeyringError) -> Self {
        use KeyringError::*;

        let description = value.to_string();

        let message = match value {
            NoEntry => "keychain entry not found".to_string(),
            BadEncoding(_) => "credential in keychain is not valid UTF-8".to_string(),
            TooLong(name, limit) => {
                format!("keychain attribute '{name}' exceeds platform limit ({limit})")
            }
            Invalid(attr, reason) => format!("keychain attribute '{attr}' is invalid: {reason}"),
            Ambiguous(entries) => {
                format!("multiple keychain entries matched request ({} results)", entries.len())
            }
            PlatformFailure(err) => format!("keychain platform error: {err}"),
            NoStorageAccess(err) => format!("unable to access secure storage: {err}"),
            _ => description,
        };
        InfraError(ConduitError::Storage(message))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TransportError */
/* -------------------------------------------------------------------------- */

/// Map a reqwest failure (no response received) to a transport error
pub fn transport_error(err: &HttpError) -> TransportError {
    if err.is_timeout() {
        return TransportError::new(TransportErrorKind::Timeout, err.to_string());
    }

    #[cfg(not(target_arch = "wasm32"))]
    if err.is_connect() {
        return TransportError::new(TransportErrorKind::Connect, err.to_string());
    }

    TransportError::new(TransportErrorKind::Other, err.to_string())
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(ConduitError::Config(format!("HTTP client error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
