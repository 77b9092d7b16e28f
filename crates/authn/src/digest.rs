//! Password digest computation and constant-time comparison.
//!
//! The digest formula is fixed by the username token profile:
//!
//! ```text
//! digest = Base64( SHA1( nonce_bytes ++ UTF8(created) ++ UTF8(secret) ) )
//! ```
//!
//! The created string is hashed exactly as presented on the wire; any
//! re-serialization (even to an equivalent instant) changes the digest.

use base64::{engine::general_purpose::STANDARD, Engine};
use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;

/// Computes `Base64(SHA1(nonce ++ created ++ secret))`.
#[must_use]
pub fn password_digest(nonce: &[u8], created: &str, secret: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(nonce);
    hasher.update(created.as_bytes());
    hasher.update(secret.as_bytes());
    STANDARD.encode(hasher.finalize())
}

/// Compares two byte slices in constant time.
///
/// All bytes are examined regardless of where the first difference lies,
/// so the comparison leaks no information about a matching prefix.
/// Length is not secret: slices of different lengths compare unequal
/// immediately.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Constant-time string comparison.
#[must_use]
pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    constant_time_eq(a.as_bytes(), b.as_bytes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // Known-answer vectors, computed independently with `openssl sha1`.
    #[test]
    fn test_digest_known_answer() {
        let digest = password_digest(b"0102030405060708", "2024-01-01T00:00:00Z", "secret");
        assert_eq!(digest, "PIZNgt/uxWtJ8ZFC87N9jfGYAuk=");

        let digest = password_digest(b"abc1", "2024-06-15T10:00:00Z", "hunter2");
        assert_eq!(digest, "wtsArqdK+ikPTnEiVn+p7mtOmA4=");
    }

    #[test]
    fn test_digest_sensitive_to_every_input() {
        let base = password_digest(b"0102030405060708", "2024-01-01T00:00:00Z", "secret");
        assert_ne!(base, password_digest(b"1102030405060708", "2024-01-01T00:00:00Z", "secret"));
        assert_ne!(base, password_digest(b"0102030405060708", "2024-01-01T00:00:01Z", "secret"));
        assert_ne!(base, password_digest(b"0102030405060708", "2024-01-01T00:00:00Z", "Secret"));
    }

    #[test]
    fn test_digest_concatenation_is_not_ambiguous_here() {
        // Moving a byte across the nonce/created boundary changes the
        // hash input identically, so these collide by construction; the
        // profile accepts this because nonce length is fixed per client.
        let a = password_digest(b"ab", "cd", "secret");
        let b = password_digest(b"abc", "d", "secret");
        assert_eq!(a, b);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc123", b"abc123"));
        assert!(!constant_time_eq(b"abc123", b"abc124"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn test_constant_time_str_eq() {
        assert!(constant_time_str_eq("PIZNgt/uxWtJ8ZFC87N9jfGYAuk=", "PIZNgt/uxWtJ8ZFC87N9jfGYAuk="));
        assert!(!constant_time_str_eq("secret", "secreT"));
    }
}
