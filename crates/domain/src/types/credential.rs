//! Bearer credential

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::BEARER_PREFIX;

/// Opaque bearer token with optional refresh token and expiry hint
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into(), refresh_token: None, expires_at: None }
    }

    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Set the expiry hint relative to now.
    #[must_use]
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.expires_at = Some(Utc::now() + Duration::seconds(seconds));
        self
    }

    /// `Authorization` header value
    pub fn bearer(&self) -> String {
        format!("{BEARER_PREFIX}{}", self.token)
    }

    /// Whether the expiry hint has passed, or will within `skew`.
    ///
    /// Credentials without a hint never report as expired.
    pub fn is_expired(&self, skew: std::time::Duration) -> bool {
        let Some(at) = self.expires_at else {
            return false;
        };
        match Duration::from_std(skew).ok().and_then(|skew| at.checked_sub_signed(skew)) {
            Some(deadline) => deadline <= Utc::now(),
            None => true,
        }
    }

    pub fn seconds_until_expiry(&self) -> Option<i64> {
        self.expires_at.map(|at| (at - Utc::now()).num_seconds())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[redacted]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
