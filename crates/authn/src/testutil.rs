//! Shared helpers for unit and integration tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use crate::{
    credential::{Credential, PasswordType},
    digest::password_digest,
    error::Result,
    resolver::{CredentialResolver, MemoryCredentialResolver},
};

/// Wraps a resolver and counts how many times it is consulted.
pub struct CountingResolver<R> {
    inner: R,
    calls: AtomicUsize,
}

impl<R: CredentialResolver> CountingResolver<R> {
    /// Wraps `inner` with a zeroed counter.
    pub fn new(inner: R) -> Self {
        Self { inner, calls: AtomicUsize::new(0) }
    }

    /// Total resolver invocations so far, across all methods.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<R: CredentialResolver> CredentialResolver for CountingResolver<R> {
    fn secret_for_digest(&self, username: &str) -> Result<Zeroizing<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.secret_for_digest(username)
    }

    fn secret_for_compare(&self, username: &str) -> Result<Zeroizing<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.secret_for_compare(username)
    }

    fn verify_custom(&self, credential: &Credential) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.verify_custom(credential)
    }
}

/// A resolver preloaded with one `(username, secret)` pair.
pub fn single_user_resolver(username: &str, secret: &str) -> MemoryCredentialResolver {
    let mut resolver = MemoryCredentialResolver::new();
    resolver.insert(username, secret);
    resolver
}

/// A well-formed digest credential whose digest matches `secret`.
pub fn digest_credential(username: &str, secret: &str, nonce: &[u8], created: &str) -> Credential {
    Credential::new(username, PasswordType::Digest)
        .with_secret(password_digest(nonce, created, secret))
        .with_nonce(nonce.to_vec())
        .with_created(created)
}

/// A plaintext credential carrying `secret` verbatim.
pub fn plaintext_credential(username: &str, secret: &str) -> Credential {
    Credential::new(username, PasswordType::PlainText).with_secret(secret)
}

/// Parses an RFC 3339 timestamp, panicking on malformed input.
pub fn ts(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
}

/// Asserts that a result is the named [`crate::AuthError`] variant.
#[macro_export]
macro_rules! assert_auth_error {
    ($result:expr, $variant:ident) => {
        match $result {
            Err($crate::AuthError::$variant { .. }) => {},
            other => panic!(
                "expected AuthError::{}, got {:?}",
                stringify!($variant),
                other
            ),
        }
    };
}
