use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use tokio::{sync::Mutex, time::Instant};
use tracing::{debug, info, instrument, trace};

use surge_model::{Credential, Principal};

use crate::{authenticator::Authenticator, error::AuthError};

/// Shared, in-memory credential cache with single-flight refresh.
///
/// Created once and shared by `Arc`. Reads of a fresh credential never touch the
/// refresh lock; a stale or missing credential is refreshed by exactly one caller
/// while the rest wait on the lock and then reuse its result (token or error).
pub struct TokenCache {
    authenticator: Authenticator,
    slots: RwLock<HashMap<String, Slot>>,
    /// Serializes token exchanges across all principals.
    refresh: Mutex<()>,
}

#[derive(Default)]
struct Slot {
    credential: Option<Credential>,
    /// Number of failed exchanges so far; lets waiters detect a failure that
    /// happened while they were queued.
    failures: u64,
    last_error: Option<AuthError>,
}

enum Lookup {
    Fresh(String),
    Stale { failures: u64 },
}

impl TokenCache {
    pub fn new(authenticator: Authenticator) -> Self {
        Self {
            authenticator,
            slots: RwLock::new(HashMap::new()),
            refresh: Mutex::new(()),
        }
    }

    fn lookup(&self, identity: &str, now: Instant) -> Lookup {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        match slots.get(identity) {
            Some(slot) => match &slot.credential {
                Some(cred) if cred.is_fresh_at(now) => Lookup::Fresh(cred.access_token().to_string()),
                _ => Lookup::Stale {
                    failures: slot.failures,
                },
            },
            None => Lookup::Stale { failures: 0 },
        }
    }

    /// Return a valid access token for `principal`, refreshing it if needed.
    #[instrument(level = "trace", skip(self, principal), fields(identity = principal.identity()))]
    pub async fn get_current_token(&self, principal: &Principal) -> Result<String, AuthError> {
        let seen_failures = match self.lookup(principal.identity(), Instant::now()) {
            Lookup::Fresh(token) => return Ok(token),
            Lookup::Stale { failures } => failures,
        };

        let _guard = self.refresh.lock().await;

        // A refresh may have completed (or failed) while we were queued.
        let had_credential = {
            let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
            match slots.get(principal.identity()) {
                Some(slot) => {
                    if let Some(cred) = &slot.credential
                        && cred.is_fresh_at(Instant::now())
                    {
                        trace!("credential refreshed by a concurrent caller");
                        return Ok(cred.access_token().to_string());
                    }
                    if slot.failures > seen_failures
                        && let Some(err) = &slot.last_error
                    {
                        debug!("reusing failure of the concurrent refresh");
                        return Err(err.clone());
                    }
                    slot.credential.is_some()
                }
                None => false,
            }
        };

        if had_credential {
            info!("token expired; refreshing");
        } else {
            info!("performing authentication");
        }

        let result = self.authenticator.authenticate(principal).await;

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.entry(principal.identity().to_string()).or_default();
        match result {
            Ok(cred) => {
                let token = cred.access_token().to_string();
                slot.credential = Some(cred);
                Ok(token)
            }
            Err(err) => {
                slot.credential = None;
                slot.failures += 1;
                slot.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Drop the cached credential for `identity`; the next call re-authenticates.
    ///
    /// Returns `true` if a credential was cached.
    pub fn invalidate(&self, identity: &str) -> bool {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots
            .get_mut(identity)
            .and_then(|slot| slot.credential.take())
            .is_some()
    }

    /// Snapshot of the cached credential, fresh or not.
    pub fn cached(&self, identity: &str) -> Option<Credential> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.get(identity).and_then(|slot| slot.credential.clone())
    }
}
