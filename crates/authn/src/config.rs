//! Validation policy configuration.

use std::time::Duration;

use wst_cache::CacheSettings;

/// Default TTL for replay-cache entries (5 minutes).
pub const DEFAULT_REPLAY_WINDOW: Duration = Duration::from_secs(300);

/// Default tolerance for created-timestamp drift across unsynchronized
/// clocks (5 minutes).
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(300);

/// Default logical name for the shared replay cache backend.
pub const DEFAULT_CACHE_BACKEND_NAME: &str = "wst-nonce-cache";

/// Policy knobs for username token validation.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Treat namespace-qualified password type identifiers (e.g.
    /// `wsse:PasswordDigest`) as their base type.
    pub allow_namespace_qualified_password_types: bool,
    /// Delegate unknown password types to the resolver instead of
    /// failing fast. Off by default: unknown types are rejected before
    /// the resolver is ever consulted.
    pub handle_custom_password_types: bool,
    /// Enforce the freshness window and replay check for credentials
    /// that carry a nonce and created timestamp.
    pub verify_nonce_created: bool,
    /// TTL for replay-cache entries.
    pub replay_window: Duration,
    /// Tolerance for created-timestamp drift.
    pub clock_skew: Duration,
    /// Logical name used for registry acquire/release and settings
    /// resolution.
    pub cache_backend_name: String,
    /// Explicit cache settings overriding name-based resolution.
    pub cache_settings: Option<CacheSettings>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            allow_namespace_qualified_password_types: false,
            handle_custom_password_types: false,
            verify_nonce_created: true,
            replay_window: DEFAULT_REPLAY_WINDOW,
            clock_skew: DEFAULT_CLOCK_SKEW,
            cache_backend_name: DEFAULT_CACHE_BACKEND_NAME.to_owned(),
            cache_settings: None,
        }
    }
}

impl ValidatorConfig {
    /// Creates a config with the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allows namespace-qualified password type identifiers.
    #[must_use]
    pub fn with_namespace_qualified_password_types(mut self, allow: bool) -> Self {
        self.allow_namespace_qualified_password_types = allow;
        self
    }

    /// Delegates custom password types to the resolver.
    #[must_use]
    pub fn with_custom_password_types(mut self, handle: bool) -> Self {
        self.handle_custom_password_types = handle;
        self
    }

    /// Enables or disables freshness and replay checking.
    #[must_use]
    pub fn with_nonce_created_verification(mut self, verify: bool) -> Self {
        self.verify_nonce_created = verify;
        self
    }

    /// Sets the replay window.
    #[must_use]
    pub fn with_replay_window(mut self, window: Duration) -> Self {
        self.replay_window = window;
        self
    }

    /// Sets the clock skew tolerance.
    #[must_use]
    pub fn with_clock_skew(mut self, skew: Duration) -> Self {
        self.clock_skew = skew;
        self
    }

    /// Sets the cache backend name.
    #[must_use]
    pub fn with_cache_backend_name(mut self, name: impl Into<String>) -> Self {
        self.cache_backend_name = name.into();
        self
    }

    /// Sets explicit cache settings, overriding name-based resolution.
    #[must_use]
    pub fn with_cache_settings(mut self, settings: CacheSettings) -> Self {
        self.cache_settings = Some(settings);
        self
    }
}
