#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

// End-to-end tests for the envelope engine, key derivation and RSA helpers
use envelope_crypto::{
    cipher::{EnvelopeParts, MIN_ENVELOPE_LEN, VERSION},
    encoding::{decode, encode},
    generate_rsa_keypair, random_bytes, sign_rsa, verify_rsa, AuthenticatedCipher, CryptoConfig,
    CryptoEngine, CryptoError, EncryptionKey, HashAlgorithm, Kdf, OutputEncoding, Secret,
};
use std::sync::Arc;
use std::thread;
use tracing_subscriber::EnvFilter;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Route library logs to the test harness; honours RUST_LOG
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn zero_key() -> EncryptionKey {
    EncryptionKey::from_bytes(&[0u8; 32]).unwrap()
}

fn engine_with(encoding: OutputEncoding) -> CryptoEngine {
    CryptoEngine::new(CryptoConfig {
        default_encoding: encoding,
        ..CryptoConfig::default()
    })
}

/// Replace the last hex digit with a different one
fn flip_last_hex_char(encoded: &mut [u8]) {
    let last = encoded.last_mut().unwrap();
    *last = if *last == b'0' { b'1' } else { b'0' };
}

// =============================================================================
// KEY-MODE ENVELOPES
// =============================================================================

#[test]
fn test_zero_key_hello_world_roundtrip() {
    let engine = engine_with(OutputEncoding::Hex);
    let key = zero_key();

    let sealed = engine.encrypt(b"hello world", &key).unwrap();
    let decrypted = engine.decrypt(&sealed, &key).unwrap();

    assert_eq!(decrypted, b"hello world");
}

#[test]
fn test_flipped_hex_character_fails_integrity() {
    init_tracing();
    let engine = engine_with(OutputEncoding::Hex);
    let key = zero_key();

    let mut sealed = engine.encrypt(b"hello world", &key).unwrap();
    flip_last_hex_char(&mut sealed);

    assert_eq!(
        engine.decrypt(&sealed, &key).unwrap_err(),
        CryptoError::IntegrityCheckFailed
    );
}

#[test]
fn test_envelope_layout() {
    let plaintext = b"layout check";
    let envelope = AuthenticatedCipher::encrypt_with_key(plaintext, &[9u8; 32]).unwrap();

    assert_eq!(envelope.len(), MIN_ENVELOPE_LEN + plaintext.len());
    assert_eq!(&envelope[0..4], &[0xDE, 0xF5, 0x02, 0x00]);

    let parts = EnvelopeParts::parse(&envelope).unwrap();
    assert_eq!(parts.version, &VERSION[..]);
    assert_eq!(parts.salt, &envelope[4..36]);
    assert_eq!(parts.iv, &envelope[36..52]);
    assert_eq!(parts.ciphertext, &envelope[52..52 + plaintext.len()]);
    assert_eq!(parts.mac, &envelope[envelope.len() - 32..]);
}

#[test]
fn test_wrong_key_never_returns_plaintext() {
    let key = EncryptionKey::generate();
    let other = EncryptionKey::generate();
    let engine = CryptoEngine::default();

    let sealed = engine.encrypt(b"for key holders only", &key).unwrap();
    assert_eq!(
        engine.decrypt(&sealed, &other).unwrap_err(),
        CryptoError::IntegrityCheckFailed
    );
}

#[test]
fn test_short_buffers_rejected_before_anything_else() {
    for len in [0usize, 40, 83] {
        let buffer = random_bytes(len);
        assert!(matches!(
            AuthenticatedCipher::decrypt_with_key(&buffer, &[0u8; 32]),
            Err(CryptoError::CiphertextTooShort { min: 84, .. })
        ));
        // Even with a malformed key the length check comes first
        assert!(matches!(
            AuthenticatedCipher::decrypt_with_key(&buffer, b"short"),
            Err(CryptoError::CiphertextTooShort { .. })
        ));
    }
}

#[test]
fn test_every_encoding_roundtrips_through_engine() {
    let key = EncryptionKey::generate();
    let plaintext = random_bytes(300);

    for encoding in [
        OutputEncoding::Raw,
        OutputEncoding::Hex,
        OutputEncoding::Base64,
        OutputEncoding::EscapedHex,
    ] {
        let engine = engine_with(encoding);
        let sealed = engine.encrypt(&plaintext, &key).unwrap();
        assert_eq!(engine.decrypt(&sealed, &key).unwrap(), plaintext, "{}", encoding);

        let raw = decode(&sealed, encoding).unwrap();
        assert_eq!(&raw[..4], &VERSION);
        assert_eq!(encode(&raw, encoding), sealed);
    }
}

#[test]
fn test_concurrent_use_of_one_engine() {
    let engine = Arc::new(CryptoEngine::default());
    let key = Arc::new(EncryptionKey::generate());

    let handles: Vec<_> = (0..8u8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            let key = Arc::clone(&key);
            thread::spawn(move || {
                let plaintext = vec![i; 1000];
                let sealed = engine.encrypt(&plaintext, &key).unwrap();
                assert_eq!(engine.decrypt(&sealed, &key).unwrap(), plaintext);
                sealed
            })
        })
        .collect();

    let sealed: Vec<Vec<u8>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for (i, a) in sealed.iter().enumerate() {
        for b in sealed.iter().skip(i + 1) {
            assert_ne!(a, b);
        }
    }
}

// =============================================================================
// PASSWORD-MODE ENVELOPES
// =============================================================================

#[test]
fn test_password_roundtrip_large_payload() {
    init_tracing();
    let engine = CryptoEngine::default();
    let password = b"correct horse battery staple";
    let plaintext = random_bytes(10_000);

    let sealed = engine.encrypt_with_password(&plaintext, password).unwrap();
    assert_eq!(engine.decrypt_with_password(&sealed, password).unwrap(), plaintext);

    assert_eq!(
        engine.decrypt_with_password(&sealed, b"wrong").unwrap_err(),
        CryptoError::IntegrityCheckFailed
    );
}

#[test]
fn test_empty_password_is_accepted() {
    let sealed = AuthenticatedCipher::encrypt_with_password(b"no password", b"").unwrap();
    assert_eq!(
        AuthenticatedCipher::decrypt_with_password(&sealed, b"").unwrap(),
        b"no password"
    );
}

#[test]
fn test_password_envelope_is_not_a_key_envelope() {
    // A 32-byte password is a valid raw key too, but derives different sub-keys
    let secret = [0x11u8; 32];
    let sealed = AuthenticatedCipher::encrypt(b"mode", Secret::Password(&secret)).unwrap();

    assert_eq!(
        AuthenticatedCipher::decrypt(&sealed, Secret::Key(&secret)).unwrap_err(),
        CryptoError::IntegrityCheckFailed
    );
}

// =============================================================================
// KEY DERIVATION
// =============================================================================

#[test]
fn test_hkdf_rfc5869_test_case_1() {
    let salt: Vec<u8> = (0x00..=0x0c).collect();
    let info: Vec<u8> = (0xf0..=0xf9).collect();

    let okm = Kdf::hkdf(HashAlgorithm::Sha256, &[0x0b; 22], 42, &info, Some(&salt)).unwrap();

    assert_eq!(
        hex::encode(&*okm),
        "3cb25f25faacd57a90434f64d0362f2a2d2d0a90cf1a5a4c5db02d56ecc4c5bf34007208d5b887185865"
    );
}

#[test]
fn test_pbkdf2_rejects_unlisted_algorithms_by_name() {
    for name in ["md5", "md4", "sha3-256", ""] {
        assert!(matches!(
            name.parse::<HashAlgorithm>(),
            Err(CryptoError::UnsupportedAlgorithm(_))
        ));
    }
    let algorithm: HashAlgorithm = "whirlpool".parse().unwrap();
    assert_eq!(
        Kdf::pbkdf2(algorithm, b"pw", b"salt", 10, 16, false).unwrap().len(),
        32
    );
}

// =============================================================================
// RSA
// =============================================================================

#[test]
fn test_rsa_sign_verify_scenario() {
    let keys = generate_rsa_keypair(1024).unwrap();

    let signature = sign_rsa(b"msg", &keys.private_pem).unwrap();
    assert!(verify_rsa(b"msg", &signature, &keys.public_pem).unwrap());
    assert!(!verify_rsa(b"msg2", &signature, &keys.public_pem).unwrap());
}

// =============================================================================
// PASSWORD HASHING
// =============================================================================

#[test]
fn test_engine_password_hashing() {
    let engine = CryptoEngine::new(CryptoConfig {
        password_hashing: envelope_crypto::Argon2Params {
            memory_cost: 2048,
            time_cost: 1,
            parallelism: 1,
        },
        ..CryptoConfig::default()
    });

    let hash = engine.hash_password(b"letmein").unwrap();
    let result = engine.verify_password(b"letmein", &hash).unwrap();
    assert!(result.valid);
    assert!(!result.needs_rehash);

    assert!(!engine.verify_password(b"letmeout", &hash).unwrap().valid);
}
