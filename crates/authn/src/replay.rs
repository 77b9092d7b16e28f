//! Replay cache view over a shared backend.
//!
//! [`ReplayCache`] is what the validator talks to: a thin view that
//! encodes [`ReplayKey`]s for the backend and maps its answers to typed
//! errors. The backend itself is owned by the registry and may be shared
//! with other validators in the process.

use std::{sync::Arc, time::Duration};

use wst_cache::CacheBackend;

use crate::{
    credential::ReplayKey,
    error::{AuthError, Result},
};

/// TTL-bounded "seen-once" store for presentation attempts.
#[derive(Clone)]
pub struct ReplayCache {
    backend: Arc<dyn CacheBackend>,
}

impl ReplayCache {
    /// Creates a view over the given backend.
    #[must_use]
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    /// Checks whether this presentation was seen before and records it.
    ///
    /// The check and the recording are a single atomic backend
    /// operation: of any number of concurrent presentations of the same
    /// key, exactly one is admitted.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ReplayDetected`] if the key was already
    /// recorded within its TTL, or
    /// [`AuthError::CacheBackendUnavailable`] if the backend failed.
    pub fn check_and_mark(&self, key: &ReplayKey, ttl: Duration) -> Result<()> {
        let inserted = self.backend.put_if_absent(&key.cache_key(), ttl)?;
        if inserted {
            Ok(())
        } else {
            tracing::debug!(username = %key.username, "nonce replay detected");
            Err(AuthError::replay_detected(&key.username))
        }
    }

    /// Whether a live entry exists for this presentation.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::CacheBackendUnavailable`] if the backend
    /// failed.
    pub fn contains(&self, key: &ReplayKey) -> Result<bool> {
        Ok(self.backend.contains(&key.cache_key())?)
    }
}

impl std::fmt::Debug for ReplayCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayCache").field("backend", &self.backend.name()).finish_non_exhaustive()
    }
}
