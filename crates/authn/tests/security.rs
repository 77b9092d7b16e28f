//! Security-property integration tests.
//!
//! Each section exercises one property end to end through the public
//! API, the way a deployment would wire it: a pipeline over a shared
//! backend registry, driven with an explicit clock.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Barrier,
};

use wst_authn::{
    assert_auth_error,
    testutil::{digest_credential, plaintext_credential, single_user_resolver, ts, CountingResolver},
    AuthError, Credential, PasswordType, ValidationPipeline, ValidatorConfig,
};
use wst_cache::{CacheBackendRegistry, CacheSettings};

const NONCE: &[u8] = b"0102030405060708";
const CREATED: &str = "2024-01-01T00:00:00Z";

fn ann_pipeline() -> ValidationPipeline {
    ValidationPipeline::new(
        ValidatorConfig::default(),
        Arc::new(single_user_resolver("Ann", "secret")),
        Arc::new(CacheBackendRegistry::new()),
    )
}

// Section 1: secret verification.

#[test]
fn test_plaintext_accepts_matching_secret() {
    let pipeline = ann_pipeline();
    let result = pipeline
        .validate_at(&plaintext_credential("Ann", "secret"), ts("2024-01-01T00:00:05Z"))
        .unwrap();
    assert_eq!(result.username, "Ann");
    assert!(!result.via_digest());
}

#[test]
fn test_plaintext_rejects_wrong_secret() {
    let pipeline = ann_pipeline();
    let result =
        pipeline.validate_at(&plaintext_credential("Ann", "Secret"), ts("2024-01-01T00:00:05Z"));
    assert_auth_error!(result, CredentialMismatch);
}

#[test]
fn test_digest_accepts_known_vector() {
    // Base64(SHA1("0102030405060708" ++ "2024-01-01T00:00:00Z" ++ "secret"))
    let pipeline = ann_pipeline();
    let credential = Credential::new("Ann", PasswordType::Digest)
        .with_secret("PIZNgt/uxWtJ8ZFC87N9jfGYAuk=")
        .with_nonce(NONCE.to_vec())
        .with_created(CREATED);

    let result = pipeline.validate_at(&credential, ts("2024-01-01T00:00:05Z")).unwrap();
    assert_eq!(result.username, "Ann");
    assert!(result.via_digest());
    assert_eq!(result.created, Some(ts(CREATED)));
    assert_eq!(result.nonce, NONCE);
}

#[test]
fn test_digest_rejects_single_character_change() {
    let pipeline = ann_pipeline();
    // Last character of the valid digest flipped.
    let credential = Credential::new("Ann", PasswordType::Digest)
        .with_secret("PIZNgt/uxWtJ8ZFC87N9jfGYAul=")
        .with_nonce(NONCE.to_vec())
        .with_created(CREATED);

    let result = pipeline.validate_at(&credential, ts("2024-01-01T00:00:05Z"));
    assert_auth_error!(result, CredentialMismatch);
}

#[test]
fn test_digest_bound_to_nonce_and_created() {
    let pipeline = ann_pipeline();
    let now = ts("2024-01-01T00:00:05Z");

    // A valid digest presented with a different nonce must fail.
    let mut credential = digest_credential("Ann", "secret", NONCE, CREATED);
    credential.nonce = b"8070605040302010".to_vec();
    assert_auth_error!(pipeline.validate_at(&credential, now), CredentialMismatch);

    // Same for a shifted created timestamp.
    let mut credential = digest_credential("Ann", "secret", NONCE, CREATED);
    credential.created = Some("2024-01-01T00:00:01Z".to_owned());
    assert_auth_error!(pipeline.validate_at(&credential, now), CredentialMismatch);
}

#[test]
fn test_unknown_username_reported_as_not_found() {
    let pipeline = ann_pipeline();
    let result = pipeline
        .validate_at(&plaintext_credential("Mallory", "secret"), ts("2024-01-01T00:00:05Z"));
    assert_auth_error!(result, CredentialNotFound);
}

// Section 2: replay protection.

#[test]
fn test_second_presentation_is_a_replay() {
    let pipeline = ann_pipeline();
    let now = ts("2024-01-01T00:00:05Z");
    let credential = digest_credential("Ann", "secret", NONCE, CREATED);

    pipeline.validate_at(&credential, now).unwrap();
    let result = pipeline.validate_at(&credential, now);
    assert!(matches!(result, Err(AuthError::ReplayDetected { ref username }) if username == "Ann"));
}

#[test]
fn test_fresh_created_escapes_replay() {
    let pipeline = ann_pipeline();
    let credential = digest_credential("Ann", "secret", NONCE, CREATED);
    pipeline.validate_at(&credential, ts("2024-01-01T00:00:05Z")).unwrap();

    // Same nonce but a new created timestamp is a distinct presentation.
    let later = "2024-01-01T00:01:00Z";
    let credential = digest_credential("Ann", "secret", NONCE, later);
    pipeline.validate_at(&credential, ts("2024-01-01T00:01:05Z")).unwrap();
}

#[test]
fn test_same_nonce_different_users_do_not_collide() {
    let mut resolver = single_user_resolver("Ann", "secret");
    resolver.insert("bob", "hunter2");
    let pipeline = ValidationPipeline::new(
        ValidatorConfig::default(),
        Arc::new(resolver),
        Arc::new(CacheBackendRegistry::new()),
    );
    let now = ts("2024-01-01T00:00:05Z");

    pipeline.validate_at(&digest_credential("Ann", "secret", NONCE, CREATED), now).unwrap();
    pipeline.validate_at(&digest_credential("bob", "hunter2", NONCE, CREATED), now).unwrap();
}

// Section 3: freshness policy.

#[test]
fn test_stale_created_rejected_despite_valid_digest() {
    let pipeline = ann_pipeline();
    // Default acceptance ends 600s after created; 11 minutes is out.
    let result = pipeline
        .validate_at(&digest_credential("Ann", "secret", NONCE, CREATED), ts("2024-01-01T00:11:00Z"));
    assert_auth_error!(result, StaleTimestamp);
}

#[test]
fn test_far_future_created_rejected() {
    let pipeline = ann_pipeline();
    let result = pipeline
        .validate_at(&digest_credential("Ann", "secret", NONCE, CREATED), ts("2023-12-31T23:50:00Z"));
    assert_auth_error!(result, StaleTimestamp);
}

#[test]
fn test_unparsable_created_is_malformed() {
    let pipeline = ann_pipeline();
    let credential = digest_credential("Ann", "secret", NONCE, "yesterday-ish");
    let result = pipeline.validate_at(&credential, ts("2024-01-01T00:00:05Z"));
    assert_auth_error!(result, MalformedCredential);
}

// Section 4: password-type policy.

#[test]
fn test_custom_type_rejected_before_resolver() {
    let resolver = Arc::new(CountingResolver::new(single_user_resolver("Ann", "secret")));
    let pipeline = ValidationPipeline::new(
        ValidatorConfig::default(),
        Arc::clone(&resolver) as Arc<dyn wst_authn::CredentialResolver>,
        Arc::new(CacheBackendRegistry::new()),
    );

    let credential = Credential::new("Ann", PasswordType::Custom("urn:x".to_owned()));
    let result = pipeline.validate_at(&credential, ts("2024-01-01T00:00:05Z"));
    assert!(
        matches!(result, Err(AuthError::UnsupportedPasswordType { ref password_type }) if password_type == "urn:x")
    );
    assert_eq!(resolver.calls(), 0);
}

#[test]
fn test_namespace_qualified_types_opt_in() {
    let qualified = |allow: bool| {
        let config =
            ValidatorConfig::default().with_namespace_qualified_password_types(allow);
        let pipeline = ValidationPipeline::new(
            config,
            Arc::new(single_user_resolver("Ann", "secret")),
            Arc::new(CacheBackendRegistry::new()),
        );
        let mut credential = digest_credential("Ann", "secret", NONCE, CREATED);
        credential.password_type = PasswordType::Custom("wsse:PasswordDigest".to_owned());
        pipeline.validate_at(&credential, ts("2024-01-01T00:00:05Z"))
    };

    assert_auth_error!(qualified(false), UnsupportedPasswordType);
    assert!(qualified(true).unwrap().via_digest());
}

// Section 5: backend lifecycle under contention.

#[test]
fn test_concurrent_pipelines_share_one_backend() {
    const THREADS: usize = 8;

    let built = Arc::new(AtomicUsize::new(0));
    let factory = CountingMemoryFactory { built: Arc::clone(&built) };
    let registry =
        Arc::new(CacheBackendRegistry::with_factory(std::collections::HashMap::new(), Box::new(factory)));
    let resolver: Arc<dyn wst_authn::CredentialResolver> =
        Arc::new(single_user_resolver("Ann", "secret"));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let resolver = Arc::clone(&resolver);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                let pipeline = ValidationPipeline::new(
                    ValidatorConfig::default(),
                    resolver,
                    registry,
                );
                let created = format!("2024-01-01T00:00:{i:02}Z");
                let credential =
                    digest_credential("Ann", "secret", format!("n-{i}").as_bytes(), &created);
                pipeline.validate_at(&credential, ts("2024-01-01T00:01:00Z")).unwrap();
                pipeline.shutdown().unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // All pipelines raced to lease the same name; the factory built the
    // backend at most the number of distinct live generations, and a
    // single generation when the first lease outlives the race.
    assert!(built.load(Ordering::SeqCst) >= 1);

    // A pipeline anchored before the race keeps one generation alive.
    built.store(0, Ordering::SeqCst);
    let anchor = ValidationPipeline::new(
        ValidatorConfig::default(),
        Arc::clone(&resolver),
        Arc::clone(&registry),
    );
    assert_eq!(built.load(Ordering::SeqCst), 1);
    let second = ValidationPipeline::new(
        ValidatorConfig::default(),
        Arc::clone(&resolver),
        Arc::clone(&registry),
    );
    assert_eq!(built.load(Ordering::SeqCst), 1, "live backend must be shared, not rebuilt");
    second.shutdown().unwrap();
    anchor.shutdown().unwrap();
}

struct CountingMemoryFactory {
    built: Arc<AtomicUsize>,
}

impl wst_cache::CacheBackendFactory for CountingMemoryFactory {
    fn build(
        &self,
        name: &str,
        settings: &CacheSettings,
    ) -> wst_cache::CacheResult<Arc<dyn wst_cache::CacheBackend>> {
        self.built.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(wst_cache::MemoryCacheBackend::new(name, settings)))
    }
}

// Section 6: end-to-end scenario.

#[test]
fn test_full_token_exchange() {
    let pipeline = ann_pipeline();
    let now = ts("2024-01-01T00:00:05Z");
    let credential = digest_credential("Ann", "secret", NONCE, CREATED);

    let result = pipeline.validate_at(&credential, now).unwrap();
    assert_eq!(result.username, "Ann");
    assert!(result.via_digest());
    assert_eq!(result.created, Some(ts(CREATED)));

    // The accepted presentation is now recorded.
    assert_auth_error!(pipeline.validate_at(&credential, now), ReplayDetected);

    pipeline.shutdown().unwrap();
}
