//! # WST Cache
//!
//! Replay-protection cache backends and the shared backend registry for
//! WS-Security token validation.
//!
//! This crate provides:
//! - **Backend contract**: [`CacheBackend`], a named key-value store with
//!   per-entry TTL and atomic `put_if_absent` semantics
//! - **In-memory backend**: [`MemoryCacheBackend`], capacity-bounded with
//!   TTL-based expiry
//! - **Backend registry**: [`CacheBackendRegistry`], reference-counted
//!   acquire/release of shared, named backend instances
//!
//! ## Lifecycle
//!
//! Multiple validators in one process may share a backend under the same
//! name. The registry constructs the backend on first acquire, hands out
//! [`SharedCacheHandle`]s, and tears the backend down exactly when the
//! last holder releases it.
//!
//! ## Example
//!
//! ```
//! use wst_cache::CacheBackendRegistry;
//!
//! let registry = CacheBackendRegistry::new();
//! let handle = registry.acquire("nonce-cache", None);
//! // ... use handle.backend() ...
//! registry.release(handle).unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Cache backend contract.
pub mod backend;
/// Cache error types.
pub mod error;
/// In-memory backend implementation.
pub mod memory;
/// Reference-counted backend registry.
pub mod registry;
/// Backend construction settings.
pub mod settings;

pub use backend::{CacheBackend, CacheBackendFactory};
pub use error::{BoxError, CacheError, CacheResult};
pub use memory::{MemoryBackendFactory, MemoryCacheBackend};
pub use registry::{CacheBackendRegistry, SharedCacheHandle};
pub use settings::{CacheSettings, DEFAULT_ENTRY_TTL, DEFAULT_MAX_ENTRIES};
