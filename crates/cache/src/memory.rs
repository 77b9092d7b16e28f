//! In-memory cache backend.
//!
//! [`MemoryCacheBackend`] is the built-in ephemeral default the registry
//! falls back to when no named configuration resolves. It keeps the
//! replay-protection guarantee alive (weaker, non-persistent) rather
//! than disabling validation outright.
//!
//! # Design
//!
//! - **Per-entry expiry**: each key carries its own TTL, so one backend
//!   can serve validators configured with different replay windows.
//! - **Capacity-bounded**: LRU eviction as a safety net beyond TTL.
//! - **Atomic admission**: `put_if_absent` uses the cache's entry API, so
//!   of any number of concurrent insertions for the same key exactly one
//!   is admitted.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use moka::{policy::EvictionPolicy, sync::Cache};

use crate::{
    backend::{CacheBackend, CacheBackendFactory},
    error::CacheResult,
    settings::CacheSettings,
};

/// Per-entry expiry policy that reads the absolute expiration instant
/// stored as the entry value.
struct EntryExpiry;

impl moka::Expiry<String, Instant> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Instant,
        created_at: Instant,
    ) -> Option<Duration> {
        // `value` holds the absolute expiration instant.
        Some(value.saturating_duration_since(created_at))
    }
}

/// In-memory, TTL-bounded "seen-once" store.
///
/// # Thread Safety
///
/// `MemoryCacheBackend` is `Send + Sync` and safe for concurrent use from
/// multiple threads.
pub struct MemoryCacheBackend {
    name: String,
    default_ttl: Duration,
    /// Cache mapping key → expiration instant.
    seen: Cache<String, Instant>,
}

impl MemoryCacheBackend {
    /// Creates a backend registered under `name` with the given settings.
    #[must_use]
    pub fn new(name: impl Into<String>, settings: &CacheSettings) -> Self {
        let seen = Cache::builder()
            .max_capacity(settings.max_entries)
            .eviction_policy(EvictionPolicy::lru())
            .expire_after(EntryExpiry)
            .build();
        Self { name: name.into(), default_ttl: settings.default_ttl, seen }
    }

    /// Number of live entries, for tests and diagnostics.
    ///
    /// Runs pending maintenance first so the count reflects expirations.
    pub fn entry_count(&self) -> u64 {
        self.seen.run_pending_tasks();
        self.seen.entry_count()
    }
}

impl CacheBackend for MemoryCacheBackend {
    fn put_if_absent(&self, key: &str, ttl: Duration) -> CacheResult<bool> {
        let ttl = if ttl.is_zero() { self.default_ttl } else { ttl };
        let expiration = Instant::now() + ttl;
        let entry = self.seen.entry(key.to_owned()).or_insert(expiration);
        Ok(entry.is_fresh())
    }

    fn contains(&self, key: &str) -> CacheResult<bool> {
        Ok(self.seen.contains_key(key))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for MemoryCacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCacheBackend").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Factory producing [`MemoryCacheBackend`] instances.
///
/// Construction is infallible once the settings validate, which is what
/// lets the registry promise an ephemeral default as its last resort.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryBackendFactory;

impl CacheBackendFactory for MemoryBackendFactory {
    fn build(&self, name: &str, settings: &CacheSettings) -> CacheResult<Arc<dyn CacheBackend>> {
        settings.validate()?;
        Ok(Arc::new(MemoryCacheBackend::new(name, settings)))
    }
}
