//! Wired-together validation front end.
//!
//! [`ValidationPipeline`] owns the plumbing a caller would otherwise
//! assemble by hand: it acquires a named replay backend from a
//! [`CacheBackendRegistry`] at construction, holds the lease for its
//! lifetime, and releases it exactly once on [`shutdown`] (or drop).

use std::sync::Arc;

use parking_lot::Mutex;
use wst_cache::{CacheBackendRegistry, SharedCacheHandle};

use crate::{
    config::ValidatorConfig,
    credential::{Credential, ValidationResult},
    error::Result,
    replay::ReplayCache,
    resolver::CredentialResolver,
    validator::TokenValidator,
};

/// A validator bound to a resolver and a leased replay backend.
pub struct ValidationPipeline {
    validator: TokenValidator,
    resolver: Arc<dyn CredentialResolver>,
    registry: Arc<CacheBackendRegistry>,
    replay: ReplayCache,
    // Taken exactly once; `None` after shutdown.
    handle: Mutex<Option<SharedCacheHandle>>,
}

impl ValidationPipeline {
    /// Builds a pipeline, leasing the replay backend named by the config.
    ///
    /// Acquisition never fails: if no usable backend can be constructed
    /// the registry hands back an ephemeral in-memory one and logs the
    /// degradation.
    #[must_use]
    pub fn new(
        config: ValidatorConfig,
        resolver: Arc<dyn CredentialResolver>,
        registry: Arc<CacheBackendRegistry>,
    ) -> Self {
        let handle = registry.acquire(&config.cache_backend_name, config.cache_settings.as_ref());
        let replay = ReplayCache::new(handle.backend());
        tracing::debug!(backend = handle.name(), "validation pipeline ready");
        Self {
            validator: TokenValidator::new(config),
            resolver,
            registry,
            replay,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// The policy this pipeline enforces.
    #[must_use]
    pub fn config(&self) -> &ValidatorConfig {
        self.validator.config()
    }

    /// Validates one credential presentation.
    ///
    /// # Errors
    ///
    /// See [`TokenValidator::validate_at`].
    pub fn validate(&self, credential: &Credential) -> Result<ValidationResult> {
        self.validator.validate(credential, self.resolver.as_ref(), &self.replay)
    }

    /// Validates against an explicit clock. Intended for tests and
    /// batch reprocessing.
    ///
    /// # Errors
    ///
    /// See [`TokenValidator::validate_at`].
    pub fn validate_at(
        &self,
        credential: &Credential,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<ValidationResult> {
        self.validator.validate_at(credential, self.resolver.as_ref(), &self.replay, now)
    }

    /// Releases the replay backend lease. Safe to call more than once;
    /// only the first call releases.
    ///
    /// # Errors
    ///
    /// [`crate::AuthError::CacheLifecycleError`] if the registry does
    /// not recognize the lease.
    pub fn shutdown(&self) -> Result<()> {
        if let Some(handle) = self.handle.lock().take() {
            self.registry.release(handle)?;
        }
        Ok(())
    }
}

impl Drop for ValidationPipeline {
    fn drop(&mut self) {
        if let Err(error) = self.shutdown() {
            tracing::warn!(%error, "failed to release replay backend on drop");
        }
    }
}

impl std::fmt::Debug for ValidationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationPipeline")
            .field("config", self.validator.config())
            .finish_non_exhaustive()
    }
}
