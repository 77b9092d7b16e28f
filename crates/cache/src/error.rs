//! Cache error types and result alias.
//!
//! All cache backends map their internal failures to these types. The
//! registry itself only surfaces [`CacheError::Lifecycle`] — backend
//! construction failures degrade to the in-memory default instead of
//! propagating.

use std::sync::Arc;

use thiserror::Error;

/// A boxed error type for source chain tracking.
pub type BoxError = Arc<dyn std::error::Error + Send + Sync>;

/// Result type alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors that can occur during cache operations.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]` — new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CacheError {
    /// The backend could not be reached or refused the operation.
    #[error("Cache backend unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// An acquire/release invariant was violated.
    ///
    /// Reported to the offending caller only; reference counts held by
    /// other holders are never corrupted by a lifecycle error.
    #[error("Cache lifecycle error: {message}")]
    Lifecycle {
        /// Description of the violation.
        message: String,
    },

    /// Backend settings were rejected during construction.
    #[error("Cache configuration error: {message}")]
    Config {
        /// Description of the invalid setting.
        message: String,
    },
}

impl CacheError {
    /// Creates a new `Unavailable` error with the given message.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable { message: message.into(), source: None }
    }

    /// Creates a new `Unavailable` error with a message and source error.
    #[must_use]
    pub fn unavailable_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Unavailable { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `Lifecycle` error with the given message.
    #[must_use]
    pub fn lifecycle(message: impl Into<String>) -> Self {
        Self::Lifecycle { message: message.into() }
    }

    /// Creates a new `Config` error with the given message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }
}
