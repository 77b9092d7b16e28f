//! Authentication error types.
//!
//! Every verification failure is terminal for that single validation
//! call and surfaces as one of these typed variants. Nothing here is
//! retried automatically — retrying a failed authentication attempt is
//! attacker-favorable.

use thiserror::Error;
use wst_cache::{BoxError, CacheError};

/// Result type alias for validation operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Credential validation errors.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]` — new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// The credential is missing fields required for the requested check.
    #[error("Malformed credential: {message}")]
    MalformedCredential {
        /// What was missing or unparsable.
        message: String,
    },

    /// The password type is outside the supported set and custom handling
    /// is disabled.
    #[error("Unsupported password type: {password_type}")]
    UnsupportedPasswordType {
        /// The identifier of the rejected type.
        password_type: String,
    },

    /// The resolver has no secret for this username.
    #[error("Credential not found for user: {username}")]
    CredentialNotFound {
        /// The username that was looked up.
        username: String,
    },

    /// The resolver failed while looking the secret up (external I/O).
    ///
    /// Distinct from [`CredentialNotFound`](Self::CredentialNotFound):
    /// the lookup could not be completed at all.
    #[error("Credential resolution failed: {message}")]
    CredentialResolutionFailed {
        /// Description of the failure.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// Plaintext, digest, or custom verification failed.
    #[error("Credential verification failed")]
    CredentialMismatch,

    /// The created timestamp is outside the acceptance window.
    #[error("Stale or future-dated timestamp: {message}")]
    StaleTimestamp {
        /// How the timestamp violated the window.
        message: String,
    },

    /// This nonce was already presented within the replay window.
    #[error("Replay detected for user: {username}")]
    ReplayDetected {
        /// The username on the replayed credential.
        username: String,
    },

    /// The replay cache backend failed during a lookup or insertion.
    ///
    /// Wraps the original [`CacheError`] to preserve the full error
    /// source chain for debugging and structured logging.
    #[error("Cache backend unavailable: {0}")]
    CacheBackendUnavailable(
        /// The underlying cache error.
        #[source]
        CacheError,
    ),

    /// An acquire/release invariant of the shared cache backend was
    /// violated.
    #[error("Cache lifecycle error: {0}")]
    CacheLifecycleError(
        /// The underlying cache error.
        #[source]
        CacheError,
    ),
}

impl AuthError {
    /// Creates a new `MalformedCredential` error.
    #[must_use]
    pub fn malformed_credential(message: impl Into<String>) -> Self {
        Self::MalformedCredential { message: message.into() }
    }

    /// Creates a new `UnsupportedPasswordType` error.
    #[must_use]
    pub fn unsupported_password_type(password_type: impl Into<String>) -> Self {
        Self::UnsupportedPasswordType { password_type: password_type.into() }
    }

    /// Creates a new `CredentialNotFound` error.
    #[must_use]
    pub fn credential_not_found(username: impl Into<String>) -> Self {
        Self::CredentialNotFound { username: username.into() }
    }

    /// Creates a new `CredentialResolutionFailed` error with the given message.
    #[must_use]
    pub fn resolution_failed(message: impl Into<String>) -> Self {
        Self::CredentialResolutionFailed { message: message.into(), source: None }
    }

    /// Creates a new `CredentialResolutionFailed` error with a message and
    /// source error.
    #[must_use]
    pub fn resolution_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::CredentialResolutionFailed {
            message: message.into(),
            source: Some(std::sync::Arc::new(source)),
        }
    }

    /// Creates a new `CredentialMismatch` error.
    #[must_use]
    pub fn credential_mismatch() -> Self {
        Self::CredentialMismatch
    }

    /// Creates a new `StaleTimestamp` error.
    #[must_use]
    pub fn stale_timestamp(message: impl Into<String>) -> Self {
        Self::StaleTimestamp { message: message.into() }
    }

    /// Creates a new `ReplayDetected` error.
    #[must_use]
    pub fn replay_detected(username: impl Into<String>) -> Self {
        Self::ReplayDetected { username: username.into() }
    }
}

impl From<CacheError> for AuthError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Lifecycle { .. } => AuthError::CacheLifecycleError(err),
            _ => AuthError::CacheBackendUnavailable(err),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::malformed_credential("nonce is required for digest passwords");
        assert_eq!(
            err.to_string(),
            "Malformed credential: nonce is required for digest passwords"
        );

        let err = AuthError::credential_not_found("Ann");
        assert_eq!(err.to_string(), "Credential not found for user: Ann");

        let err = AuthError::replay_detected("Ann");
        assert_eq!(err.to_string(), "Replay detected for user: Ann");

        let err = AuthError::credential_mismatch();
        assert_eq!(err.to_string(), "Credential verification failed");
    }

    #[test]
    fn test_cache_error_conversion_splits_lifecycle() {
        let err: AuthError = CacheError::lifecycle("release without acquire").into();
        assert!(matches!(err, AuthError::CacheLifecycleError(_)));

        let err: AuthError = CacheError::unavailable("backend down").into();
        assert!(matches!(err, AuthError::CacheBackendUnavailable(_)));
    }

    #[test]
    fn test_cache_error_preserves_source_chain() {
        use std::error::Error;

        let err: AuthError = CacheError::unavailable("backend down").into();
        let source = err.source().expect("source chain must be preserved");
        assert_eq!(source.to_string(), "Cache backend unavailable: backend down");
    }

    #[test]
    fn test_resolution_failed_source_chain() {
        use std::error::Error;

        let io_err = std::io::Error::new(std::io::ErrorKind::TimedOut, "directory timeout");
        let err = AuthError::resolution_failed_with_source("LDAP lookup failed", io_err);
        assert_eq!(err.to_string(), "Credential resolution failed: LDAP lookup failed");
        assert_eq!(err.source().expect("source exists").to_string(), "directory timeout");
    }
}
