//! Reference-counted backend registry.
//!
//! Several validators in one process typically share a replay cache
//! under the same logical name. [`CacheBackendRegistry`] constructs the
//! backend on first acquire, counts holders, and tears the backend down
//! exactly when the count returns to zero.
//!
//! The registry is an explicit object: construct one at process start
//! and hand an `Arc` of it to every validation pipeline. There is no
//! hidden process-wide singleton.
//!
//! # Configuration resolution
//!
//! On first acquire of a name, settings are resolved by trying, in
//! order:
//!
//! 1. an explicit caller-supplied [`CacheSettings`],
//! 2. the registry's settings map under the exact name,
//! 3. the settings map under the name with its last `-`-qualifier
//!    stripped (so `nonce-cache-tenant42` can fall back to
//!    `nonce-cache`),
//! 4. the built-in default.
//!
//! The first source whose backend constructs wins; factory failures fall
//! through to the next step. Exhausting the chain yields an ephemeral
//! in-memory default rather than a hard failure, so replay protection
//! degrades instead of disappearing.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

use crate::{
    backend::{CacheBackend, CacheBackendFactory},
    error::{CacheError, CacheResult},
    memory::{MemoryBackendFactory, MemoryCacheBackend},
    settings::CacheSettings,
};

/// A live handle on a shared, named cache backend.
///
/// Obtained from [`CacheBackendRegistry::acquire`] and returned to
/// [`CacheBackendRegistry::release`]. The handle is deliberately not
/// `Clone`: each acquire produces one handle, and releasing consumes it,
/// so a holder cannot decrement the reference count twice.
pub struct SharedCacheHandle {
    name: String,
    backend: Arc<dyn CacheBackend>,
}

impl SharedCacheHandle {
    /// The name this handle was acquired under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shared backend instance.
    #[must_use]
    pub fn backend(&self) -> Arc<dyn CacheBackend> {
        Arc::clone(&self.backend)
    }
}

impl std::fmt::Debug for SharedCacheHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedCacheHandle").field("name", &self.name).finish_non_exhaustive()
    }
}

/// A backend in the live set, together with its holder count.
struct LiveBackend {
    backend: Arc<dyn CacheBackend>,
    refs: usize,
}

/// Reference-counted acquire/release of shared, named cache backends.
///
/// All acquire/release pairs are serialized through a single mutex, so
/// concurrent acquire/acquire, acquire/release, or release/release on
/// the same name can never double-construct or prematurely tear down a
/// backend.
pub struct CacheBackendRegistry {
    live: Mutex<HashMap<String, LiveBackend>>,
    named_settings: HashMap<String, CacheSettings>,
    factory: Box<dyn CacheBackendFactory>,
}

impl CacheBackendRegistry {
    /// Creates a registry with no named settings and the in-memory
    /// backend factory.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(HashMap::new())
    }

    /// Creates a registry with a named settings map.
    ///
    /// The map is the format-independent "named configuration resource"
    /// layer: load it from wherever your deployment keeps configuration
    /// and key it by backend name.
    #[must_use]
    pub fn with_settings(named_settings: HashMap<String, CacheSettings>) -> Self {
        Self::with_factory(named_settings, Box::new(MemoryBackendFactory))
    }

    /// Creates a registry with a named settings map and a custom backend
    /// factory.
    #[must_use]
    pub fn with_factory(
        named_settings: HashMap<String, CacheSettings>,
        factory: Box<dyn CacheBackendFactory>,
    ) -> Self {
        Self { live: Mutex::new(HashMap::new()), named_settings, factory }
    }

    /// Acquires a handle on the backend registered under `name`,
    /// constructing it if this is the first acquire.
    ///
    /// `explicit` overrides name-based settings resolution, mirroring an
    /// explicit configuration location supplied by the caller.
    ///
    /// Acquire never fails: if every configuration source (and the
    /// factory) falls through, the backend degrades to an ephemeral
    /// in-memory default so replay protection stays available.
    pub fn acquire(&self, name: &str, explicit: Option<&CacheSettings>) -> SharedCacheHandle {
        let mut live = self.live.lock();

        if let Some(entry) = live.get_mut(name) {
            entry.refs += 1;
            tracing::debug!(backend = name, refs = entry.refs, "acquired live cache backend");
            return SharedCacheHandle { name: name.to_owned(), backend: Arc::clone(&entry.backend) };
        }

        let backend = self.construct(name, explicit);
        live.insert(name.to_owned(), LiveBackend { backend: Arc::clone(&backend), refs: 1 });
        tracing::debug!(backend = name, "constructed cache backend");
        SharedCacheHandle { name: name.to_owned(), backend }
    }

    /// Releases a handle, tearing the backend down if this was the last
    /// holder.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Lifecycle`] if no live backend exists under
    /// the handle's name, or if the handle refers to a different backend
    /// instance than the live one (release without a matching acquire on
    /// this registry). Counts held by other holders are unaffected.
    pub fn release(&self, handle: SharedCacheHandle) -> CacheResult<()> {
        let mut live = self.live.lock();

        let Some(entry) = live.get_mut(handle.name()) else {
            tracing::warn!(backend = handle.name(), "release without matching acquire");
            return Err(CacheError::lifecycle(format!(
                "no live backend named '{}' to release",
                handle.name()
            )));
        };

        // A handle must point at this registry's live instance; a stale
        // handle whose name happens to collide must not consume another
        // holder's count.
        if !Arc::ptr_eq(&entry.backend, &handle.backend) {
            tracing::warn!(backend = handle.name(), "release of a foreign backend instance");
            return Err(CacheError::lifecycle(format!(
                "handle for '{}' does not match the live backend",
                handle.name()
            )));
        }

        entry.refs -= 1;
        if entry.refs == 0 {
            live.remove(handle.name());
            tracing::debug!(backend = handle.name(), "tore down cache backend");
        }
        Ok(())
    }

    /// Names of the currently live backends.
    #[must_use]
    pub fn live_backends(&self) -> Vec<String> {
        self.live.lock().keys().cloned().collect()
    }

    /// Resolves settings through the fallback chain and constructs the
    /// backend, degrading to the ephemeral default at the end.
    fn construct(&self, name: &str, explicit: Option<&CacheSettings>) -> Arc<dyn CacheBackend> {
        let default_settings = CacheSettings::default();
        let mut candidates = self.candidate_settings(name, explicit);
        candidates.push(&default_settings);

        for settings in candidates {
            match self.factory.build(name, settings) {
                Ok(backend) => return backend,
                Err(err) => {
                    tracing::debug!(backend = name, error = %err, "backend construction failed, trying next source");
                },
            }
        }

        tracing::warn!(
            backend = name,
            "no configuration source produced a backend, using ephemeral in-memory default"
        );
        Arc::new(MemoryCacheBackend::new(name, &default_settings))
    }

    /// Ordered candidate settings for `name`: explicit, exact match,
    /// qualifier-stripped match, built-in default.
    fn candidate_settings<'a>(
        &'a self,
        name: &str,
        explicit: Option<&'a CacheSettings>,
    ) -> Vec<&'a CacheSettings> {
        let mut candidates = Vec::with_capacity(3);
        if let Some(settings) = explicit {
            candidates.push(settings);
        }
        if let Some(settings) = self.named_settings.get(name) {
            candidates.push(settings);
        }
        if let Some(idx) = name.rfind('-') {
            if let Some(settings) = self.named_settings.get(&name[..idx]) {
                candidates.push(settings);
            }
        }
        candidates
    }
}

impl Default for CacheBackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CacheBackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheBackendRegistry")
            .field("live", &self.live_backends())
            .field("named_settings", &self.named_settings.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
