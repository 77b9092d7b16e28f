//! Cache backend contract.
//!
//! A backend is a named key-value store with per-entry TTL. The only
//! semantics validators rely on are `put_if_absent` and `contains`; any
//! store that can provide them atomically (in-process map, Redis,
//! memcached) can stand behind this trait.

use std::{sync::Arc, time::Duration};

use crate::{error::CacheResult, settings::CacheSettings};

/// A named, TTL-capable "seen-once" store.
///
/// Implementations must be safe for concurrent use from multiple threads.
/// Expired entries are logically absent: they must never be reported as
/// present, whether or not they have been physically purged.
pub trait CacheBackend: Send + Sync {
    /// Inserts `key` with the given time-to-live if it is not already
    /// present. A zero `ttl` selects the backend's configured default
    /// (see [`CacheSettings::default_ttl`]).
    ///
    /// Returns `true` if the key was newly inserted by this call, `false`
    /// if a live (non-expired) entry already existed. The check and the
    /// insertion are atomic: of any number of concurrent calls for the
    /// same key, exactly one observes `true`.
    fn put_if_absent(&self, key: &str, ttl: Duration) -> CacheResult<bool>;

    /// Returns whether a live entry exists for `key`.
    fn contains(&self, key: &str) -> CacheResult<bool>;

    /// The logical name this backend was constructed under.
    fn name(&self) -> &str;
}

/// Constructs [`CacheBackend`] instances for the registry.
///
/// A factory failure is not fatal to an acquire: the registry falls
/// through to the next configuration source in its resolution chain and
/// ultimately to the built-in in-memory default.
pub trait CacheBackendFactory: Send + Sync {
    /// Builds a backend registered under `name` from the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Config`](crate::CacheError::Config) if the
    /// settings are invalid, or
    /// [`CacheError::Unavailable`](crate::CacheError::Unavailable) if the
    /// backing store cannot be reached.
    fn build(&self, name: &str, settings: &CacheSettings) -> CacheResult<Arc<dyn CacheBackend>>;
}
