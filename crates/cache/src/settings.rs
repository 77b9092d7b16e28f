//! Backend construction settings.
//!
//! [`CacheSettings`] is the format-independent configuration a backend is
//! built from. The registry resolves one of these per acquire: an
//! explicit caller-supplied value, a named entry from its settings map,
//! or the built-in default.

use std::time::Duration;

use crate::error::{CacheError, CacheResult};

/// Default maximum number of entries a backend tracks (50 000).
///
/// When the bound is exceeded the least-recently-used entry is evicted,
/// capping memory use even under nonce-flooding traffic.
pub const DEFAULT_MAX_ENTRIES: u64 = 50_000;

/// Default time-to-live for entries inserted without an explicit TTL
/// (5 minutes, matching the default replay window).
pub const DEFAULT_ENTRY_TTL: Duration = Duration::from_secs(300);

/// Settings for constructing a cache backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Maximum number of entries before LRU eviction kicks in.
    pub max_entries: u64,
    /// Fallback TTL applied when an insertion supplies a zero duration.
    pub default_ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { max_entries: DEFAULT_MAX_ENTRIES, default_ttl: DEFAULT_ENTRY_TTL }
    }
}

impl CacheSettings {
    /// Creates settings with the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum entry count.
    #[must_use]
    pub fn with_max_entries(mut self, max_entries: u64) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Sets the default entry TTL.
    #[must_use]
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Config`] if `max_entries` is zero or
    /// `default_ttl` is zero — either would make every insertion a no-op
    /// and silently disable replay protection.
    pub fn validate(&self) -> CacheResult<()> {
        if self.max_entries == 0 {
            return Err(CacheError::config("max_entries must be non-zero"));
        }
        if self.default_ttl.is_zero() {
            return Err(CacheError::config("default_ttl must be non-zero"));
        }
        Ok(())
    }
}
