//! Secret resolution extension point.
//!
//! The validator never stores secrets; it asks a [`CredentialResolver`]
//! for them. The trait has one well-defined method per usage kind, so an
//! implementation states at compile time which verification paths it
//! supports — there is no runtime probing of handler objects.

use std::collections::HashMap;

use zeroize::Zeroizing;

use crate::{
    credential::Credential,
    error::{AuthError, Result},
};

/// Supplies secrets (or secret-equivalent decisions) for usernames.
///
/// Implementations may perform blocking external I/O (a directory
/// lookup, a database read). Lookup failures must be reported as
/// [`AuthError::CredentialResolutionFailed`], distinct from
/// [`AuthError::CredentialNotFound`] for an unknown username. Results
/// are used once per validation call and never retained.
pub trait CredentialResolver: Send + Sync {
    /// The plaintext secret needed to recompute a password digest for
    /// `username`.
    ///
    /// # Errors
    ///
    /// [`AuthError::CredentialNotFound`] if the username is unknown,
    /// [`AuthError::CredentialResolutionFailed`] if the lookup itself
    /// failed.
    fn secret_for_digest(&self, username: &str) -> Result<Zeroizing<String>>;

    /// The plaintext secret for direct comparison against a plaintext
    /// credential.
    ///
    /// Defaults to [`secret_for_digest`](Self::secret_for_digest): most
    /// resolvers hold a single secret per user and serve both paths
    /// from it.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`secret_for_digest`](Self::secret_for_digest).
    fn secret_for_compare(&self, username: &str) -> Result<Zeroizing<String>> {
        self.secret_for_digest(username)
    }

    /// Verifies a credential with a custom password type entirely on the
    /// resolver side, returning the accept/reject decision.
    ///
    /// Called only when the policy enables custom password types. The
    /// default implementation rejects the type, so resolvers that never
    /// deal with custom types need not mention them.
    ///
    /// # Errors
    ///
    /// [`AuthError::UnsupportedPasswordType`] by default;
    /// implementations add their own lookup failure modes.
    fn verify_custom(&self, credential: &Credential) -> Result<bool> {
        Err(AuthError::unsupported_password_type(credential.password_type.identifier()))
    }
}

/// In-memory username → secret map.
///
/// Suitable for tests, examples, and small static deployments.
#[derive(Default)]
pub struct MemoryCredentialResolver {
    secrets: HashMap<String, Zeroizing<String>>,
}

impl MemoryCredentialResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a secret for a username, replacing any previous one.
    pub fn insert(&mut self, username: impl Into<String>, secret: impl Into<String>) {
        self.secrets.insert(username.into(), Zeroizing::new(secret.into()));
    }
}

impl CredentialResolver for MemoryCredentialResolver {
    fn secret_for_digest(&self, username: &str) -> Result<Zeroizing<String>> {
        self.secrets
            .get(username)
            .cloned()
            .ok_or_else(|| AuthError::credential_not_found(username))
    }
}

impl std::fmt::Debug for MemoryCredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCredentialResolver")
            .field("users", &self.secrets.len())
            .finish_non_exhaustive()
    }
}
