//! # WST Authn
//!
//! Credential validation for bearer-secret username tokens.
//!
//! This crate authenticates a presented identity assertion — a username
//! plus a plaintext or digested secret, a nonce, and a creation
//! timestamp — against a caller-supplied secret resolver, and rejects
//! reuse of previously seen nonces within a configurable window.
//!
//! It provides:
//! - **Token validation**: plaintext comparison and the
//!   `Base64(SHA1(nonce ++ created ++ secret))` digest check, with
//!   constant-time comparisons throughout
//! - **Freshness policy**: created-timestamp window with clock-skew
//!   tolerance
//! - **Replay protection**: nonce tracking backed by a shared,
//!   reference-counted cache backend from [`wst_cache`]
//!
//! Parsing of the wire format that produces a [`Credential`] is out of
//! scope: the caller extracts the token fields and this crate verifies
//! them.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use wst_authn::{
//!     Credential, MemoryCredentialResolver, PasswordType, ValidationPipeline, ValidatorConfig,
//! };
//! use wst_cache::CacheBackendRegistry;
//!
//! let mut resolver = MemoryCredentialResolver::new();
//! resolver.insert("Ann", "secret");
//!
//! let registry = Arc::new(CacheBackendRegistry::new());
//! let pipeline =
//!     ValidationPipeline::new(ValidatorConfig::default(), Arc::new(resolver), registry);
//!
//! let credential = Credential::new("Ann", PasswordType::PlainText).with_secret("secret");
//! let result = pipeline.validate(&credential).unwrap();
//! assert_eq!(result.username, "Ann");
//!
//! pipeline.shutdown().unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Validation policy configuration.
pub mod config;
/// Credential model and validation results.
pub mod credential;
/// Password digest computation and constant-time comparison.
pub mod digest;
/// Authentication error types.
pub mod error;
/// Validator lifecycle orchestration.
pub mod pipeline;
/// Replay cache view over a shared backend.
pub mod replay;
/// Secret resolution extension point.
pub mod resolver;
/// Test support utilities.
#[cfg(any(test, feature = "testutil"))]
pub mod testutil;
/// Username token validation.
pub mod validator;

pub use config::{
    ValidatorConfig, DEFAULT_CACHE_BACKEND_NAME, DEFAULT_CLOCK_SKEW, DEFAULT_REPLAY_WINDOW,
};
pub use credential::{AuthMethod, Credential, PasswordType, ReplayKey, ValidationResult};
pub use error::{AuthError, Result};
pub use pipeline::ValidationPipeline;
pub use replay::ReplayCache;
pub use resolver::{CredentialResolver, MemoryCredentialResolver};
pub use validator::TokenValidator;
