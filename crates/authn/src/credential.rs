//! Credential model and validation results.
//!
//! A [`Credential`] is the already-parsed content of a username token:
//! the wire format (XML profile, HTTP header, whatever the embedder
//! speaks) is handled by the caller, which populates these fields and
//! hands them to the validator.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Password type URI for plaintext passwords (WSS username token
/// profile 1.0).
pub const PASSWORD_TEXT_URI: &str = "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordText";

/// Password type URI for digested passwords (WSS username token
/// profile 1.0).
pub const PASSWORD_DIGEST_URI: &str = "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordDigest";

/// How the credential's secret is presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PasswordType {
    /// The secret is the plaintext password itself.
    PlainText,
    /// The secret is `Base64(SHA1(nonce ++ created ++ password))`.
    Digest,
    /// Any other type identifier; verification is delegated to the
    /// resolver when the policy allows it.
    Custom(String),
}

impl PasswordType {
    /// The identifier string for this type (the profile URI for the
    /// built-in types, the raw identifier for custom ones).
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::PlainText => PASSWORD_TEXT_URI,
            Self::Digest => PASSWORD_DIGEST_URI,
            Self::Custom(id) => id,
        }
    }

    /// Maps a namespace-qualified custom identifier back to its base
    /// type when `allow_namespace_qualified` is set.
    ///
    /// A `Custom` identifier whose local part (after the last `#`, or
    /// failing that the last `:`) is `PasswordDigest` or `PasswordText`
    /// is treated as the corresponding built-in type. Everything else is
    /// returned unchanged.
    #[must_use]
    pub fn normalized(&self, allow_namespace_qualified: bool) -> Self {
        let Self::Custom(id) = self else {
            return self.clone();
        };
        if !allow_namespace_qualified {
            return self.clone();
        }
        let local = id
            .rsplit_once('#')
            .or_else(|| id.rsplit_once(':'))
            .map_or(id.as_str(), |(_, local)| local);
        match local {
            "PasswordDigest" => Self::Digest,
            "PasswordText" => Self::PlainText,
            _ => self.clone(),
        }
    }
}

/// A presented identity assertion, as produced by the external parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// The asserted username.
    pub username: String,
    /// The presented secret: the plaintext password, the digest string,
    /// or absent for some custom types.
    pub secret: Option<String>,
    /// How the secret is presented.
    pub password_type: PasswordType,
    /// Single-use random value; raw bytes, already base64-decoded by the
    /// parser.
    #[serde(default)]
    pub nonce: Vec<u8>,
    /// Creation timestamp as the exact wire string (RFC 3339 date-time
    /// with offset). Kept verbatim because the digest is computed over
    /// the original bytes, not a re-serialization.
    pub created: Option<String>,
}

impl Credential {
    /// Creates a credential with the given username and password type.
    #[must_use]
    pub fn new(username: impl Into<String>, password_type: PasswordType) -> Self {
        Self {
            username: username.into(),
            secret: None,
            password_type,
            nonce: Vec::new(),
            created: None,
        }
    }

    /// Sets the presented secret.
    #[must_use]
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Sets the nonce bytes.
    #[must_use]
    pub fn with_nonce(mut self, nonce: impl Into<Vec<u8>>) -> Self {
        self.nonce = nonce.into();
        self
    }

    /// Sets the creation timestamp string.
    #[must_use]
    pub fn with_created(mut self, created: impl Into<String>) -> Self {
        self.created = Some(created.into());
        self
    }

    /// Parses the created timestamp as an absolute instant.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MalformedCredential`] if the timestamp is
    /// absent or not a valid RFC 3339 date-time.
    pub fn parsed_created(&self) -> Result<DateTime<Utc>, AuthError> {
        let created = self
            .created
            .as_deref()
            .ok_or_else(|| AuthError::malformed_credential("created timestamp is required"))?;
        DateTime::parse_from_rfc3339(created)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                AuthError::malformed_credential(format!("unparsable created timestamp: {e}"))
            })
    }

    /// Whether both nonce and created are present, i.e. whether this
    /// credential participates in freshness and replay checking.
    #[must_use]
    pub fn has_nonce_and_created(&self) -> bool {
        !self.nonce.is_empty() && self.created.is_some()
    }

    /// The replay key for this presentation, if nonce and created are
    /// present.
    #[must_use]
    pub fn replay_key(&self) -> Option<ReplayKey> {
        let created = self.created.as_ref()?;
        if self.nonce.is_empty() {
            return None;
        }
        Some(ReplayKey {
            username: self.username.clone(),
            nonce: self.nonce.clone(),
            created: created.clone(),
        })
    }
}

/// Uniquely identifies one presentation attempt for replay tracking.
///
/// The full `(username, nonce, created)` tuple is used rather than the
/// nonce alone, so an identical nonce presented by two different users
/// is two distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReplayKey {
    /// The asserted username.
    pub username: String,
    /// The nonce bytes.
    pub nonce: Vec<u8>,
    /// The created timestamp as presented.
    pub created: String,
}

impl ReplayKey {
    /// Stable string encoding of this key for the cache backend.
    ///
    /// The nonce is base64-encoded so arbitrary bytes survive the trip
    /// through string-keyed backends.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("{}:{}:{}", self.username, STANDARD.encode(&self.nonce), self.created)
    }
}

/// Which verification path authenticated the credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMethod {
    /// Direct plaintext comparison.
    Plaintext,
    /// Digest recomputation and comparison.
    Digest,
    /// Verification delegated to the resolver.
    Custom,
}

/// The authenticated principal returned on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// The authenticated username.
    pub username: String,
    /// Which verification path succeeded.
    pub method: AuthMethod,
    /// Parsed creation time, when the credential carried one.
    pub created: Option<DateTime<Utc>>,
    /// The original nonce, for downstream logging.
    pub nonce: Vec<u8>,
}

impl ValidationResult {
    /// Whether authentication used the digest path.
    #[must_use]
    pub fn via_digest(&self) -> bool {
        self.method == AuthMethod::Digest
    }
}
