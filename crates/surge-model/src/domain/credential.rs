use std::{fmt, time::Duration};

use tokio::time::Instant;

/// Access token plus its validity window.
///
/// A credential is fresh while `now - issued_at < expiry`. It is never mutated:
/// a refresh replaces it wholesale.
#[derive(Clone)]
pub struct Credential {
    access_token: String,
    expiry: Duration,
    issued_at: Instant,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, expiry_seconds: u64, issued_at: Instant) -> Self {
        Self {
            access_token: access_token.into(),
            expiry: Duration::from_secs(expiry_seconds),
            issued_at,
        }
    }

    #[inline]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    #[inline]
    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    #[inline]
    pub fn issued_at(&self) -> Instant {
        self.issued_at
    }

    /// Returns `true` if the credential is still valid at `now`.
    pub fn is_fresh_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.issued_at) < self.expiry
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Instant::now())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field("expiry", &self.expiry)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}
