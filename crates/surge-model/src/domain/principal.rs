use std::fmt;

/// Identity/secret pair exchanged for a credential.
///
/// Only `identity` is used as the cache key; the secret is never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    identity: String,
    secret: String,
}

impl Principal {
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            secret: secret.into(),
        }
    }

    #[inline]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    #[inline]
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("identity", &self.identity)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
