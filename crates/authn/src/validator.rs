//! Username token validation.
//!
//! [`TokenValidator`] is a pure function of (credential, policy,
//! resolver, replay cache): it owns no shared state of its own, so one
//! validator can serve any number of threads.
//!
//! The checks run in a fixed order that matters:
//! 1. password-type gate — rejected types never reach the resolver, so
//!    configuration leaks nothing about resolver behavior;
//! 2. secret verification — plaintext comparison, digest recomputation,
//!    or delegation to the resolver for custom types;
//! 3. freshness — before the replay check, so a stale presentation that
//!    is doomed to fail never burns a replay slot;
//! 4. replay admission — an atomic put-if-absent on the shared cache.

use chrono::{DateTime, Utc};

use crate::{
    config::ValidatorConfig,
    credential::{AuthMethod, Credential, PasswordType, ValidationResult},
    digest::{constant_time_str_eq, password_digest},
    error::{AuthError, Result},
    replay::ReplayCache,
    resolver::CredentialResolver,
};

/// Verifies username token credentials against a resolver and a replay
/// cache.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    config: ValidatorConfig,
}

impl TokenValidator {
    /// Creates a validator with the given policy.
    #[must_use]
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// The policy this validator enforces.
    #[must_use]
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validates a credential against the current wall clock.
    ///
    /// # Errors
    ///
    /// Any variant of [`AuthError`]; see [`validate_at`](Self::validate_at).
    pub fn validate(
        &self,
        credential: &Credential,
        resolver: &dyn CredentialResolver,
        replay: &ReplayCache,
    ) -> Result<ValidationResult> {
        self.validate_at(credential, resolver, replay, Utc::now())
    }

    /// Validates a credential against an explicit `now`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::UnsupportedPasswordType`] for custom types when the policy rejects them
    /// - [`AuthError::MalformedCredential`] when required fields are absent or unparsable
    /// - [`AuthError::CredentialNotFound`] / [`AuthError::CredentialResolutionFailed`] from the
    ///   resolver
    /// - [`AuthError::CredentialMismatch`] when secret verification fails
    /// - [`AuthError::StaleTimestamp`] when `created` is outside the acceptance window
    /// - [`AuthError::ReplayDetected`] when this presentation was already seen
    /// - [`AuthError::CacheBackendUnavailable`] when the replay backend fails
    #[tracing::instrument(skip_all, fields(username = %credential.username))]
    pub fn validate_at(
        &self,
        credential: &Credential,
        resolver: &dyn CredentialResolver,
        replay: &ReplayCache,
        now: DateTime<Utc>,
    ) -> Result<ValidationResult> {
        let password_type =
            credential.password_type.normalized(self.config.allow_namespace_qualified_password_types);

        let method = match &password_type {
            PasswordType::Custom(identifier) => {
                if !self.config.handle_custom_password_types {
                    tracing::debug!(password_type = %identifier, "custom password types disabled");
                    return Err(AuthError::unsupported_password_type(identifier.as_str()));
                }
                if !resolver.verify_custom(credential)? {
                    return Err(AuthError::credential_mismatch());
                }
                AuthMethod::Custom
            },
            PasswordType::PlainText => {
                let presented = credential.secret.as_deref().ok_or_else(|| {
                    AuthError::malformed_credential("plaintext password is required")
                })?;
                let expected = resolver.secret_for_compare(&credential.username)?;
                if !constant_time_str_eq(presented, &expected) {
                    tracing::debug!("plaintext password mismatch");
                    return Err(AuthError::credential_mismatch());
                }
                AuthMethod::Plaintext
            },
            PasswordType::Digest => {
                let presented = credential
                    .secret
                    .as_deref()
                    .ok_or_else(|| AuthError::malformed_credential("password digest is required"))?;
                if credential.nonce.is_empty() {
                    return Err(AuthError::malformed_credential(
                        "nonce is required for digest passwords",
                    ));
                }
                let created = credential.created.as_deref().ok_or_else(|| {
                    AuthError::malformed_credential("created is required for digest passwords")
                })?;
                let secret = resolver.secret_for_digest(&credential.username)?;
                let expected = password_digest(&credential.nonce, created, &secret);
                if !constant_time_str_eq(presented, &expected) {
                    tracing::debug!("password digest mismatch");
                    return Err(AuthError::credential_mismatch());
                }
                AuthMethod::Digest
            },
        };

        let mut parsed_created = None;
        if self.config.verify_nonce_created && credential.has_nonce_and_created() {
            let created = credential.parsed_created()?;
            self.check_freshness(created, now)?;
            if let Some(key) = credential.replay_key() {
                replay.check_and_mark(&key, self.config.replay_window)?;
            }
            parsed_created = Some(created);
        } else if credential.created.is_some() {
            // Best-effort parse for the result; policy did not require it.
            parsed_created = credential.parsed_created().ok();
        }

        Ok(ValidationResult {
            username: credential.username.clone(),
            method,
            created: parsed_created,
            nonce: credential.nonce.clone(),
        })
    }

    /// Rejects created timestamps outside the acceptance window.
    fn check_freshness(&self, created: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
        let skew = chrono::Duration::seconds(self.config.clock_skew.as_secs() as i64);
        let window = chrono::Duration::seconds(self.config.replay_window.as_secs() as i64);

        if created - now > skew {
            tracing::debug!(%created, %now, "created timestamp is in the future");
            return Err(AuthError::stale_timestamp(format!(
                "created {created} is ahead of now {now} beyond the clock skew"
            )));
        }
        if now - created > skew + window {
            tracing::debug!(%created, %now, "created timestamp is too old");
            return Err(AuthError::stale_timestamp(format!(
                "created {created} is older than the replay window ending at {now}"
            )));
        }
        Ok(())
    }
}
