//! Versioned authenticated encryption, key derivation and RSA helpers.

pub mod asymmetric;
pub mod cipher;
pub mod config;
pub mod constant_time;
pub mod encoding;
pub mod error;
pub mod hash;
pub mod kdf;
pub mod key;
pub mod password;

pub use asymmetric::{
    decrypt_rsa_private, decrypt_rsa_public, encrypt_rsa_private, encrypt_rsa_public,
    generate_rsa_keypair, sign_rsa, verify_rsa, RsaKeyPairPem, RsaPrivateKeyHandle,
    RsaPublicKeyHandle,
};
pub use cipher::{AuthenticatedCipher, EnvelopeParts, Secret};
pub use config::{Argon2Params, CryptoConfig};
pub use encoding::OutputEncoding;
pub use error::*;
pub use hash::HashAlgorithm;
pub use kdf::{DerivedKeys, Kdf};
pub use key::{random_bytes, EncryptionKey};
pub use password::{PasswordHasher, PasswordVerification};

/// Authenticated symmetric encryption and key derivation toolkit
///
/// - Versioned encrypt-then-MAC envelopes (AES-256-CTR + HMAC-SHA256)
///   sealed under a raw 256-bit key or a password
/// - HKDF (RFC 5869) and PBKDF2 (RFC 2898) over a closed set of hashes
/// - RSA-OAEP encryption and PKCS#1 v1.5 SHA-256 signatures
/// - Argon2i password hashing with rehash detection
/// - Hex, base64 and escaped-hex transport encodings
///
/// The engine owns an immutable [`CryptoConfig`] and holds no other state, so
/// one instance can be shared freely across threads.
///
/// # Example
///
/// ```rust
/// use envelope_crypto::{CryptoConfig, CryptoEngine, EncryptionKey, OutputEncoding};
///
/// let crypto = CryptoEngine::new(CryptoConfig {
///     default_encoding: OutputEncoding::Base64,
///     ..CryptoConfig::default()
/// });
/// let key = EncryptionKey::generate();
///
/// let sealed = crypto.encrypt(b"hello world", &key).unwrap();
/// assert_eq!(crypto.decrypt(&sealed, &key).unwrap(), b"hello world");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CryptoEngine {
    config: CryptoConfig,
}

impl CryptoEngine {
    pub fn new(config: CryptoConfig) -> Self {
        Self { config }
    }

    /// Build an engine from `CRYPTO_*` environment variables
    pub fn from_env() -> CryptoResult<Self> {
        Ok(Self::new(CryptoConfig::from_env()?))
    }

    pub fn config(&self) -> &CryptoConfig {
        &self.config
    }

    pub fn default_encoding(&self) -> OutputEncoding {
        self.config.default_encoding
    }

    /// Seal under a raw key and encode with the default encoding
    pub fn encrypt(&self, plaintext: &[u8], key: &EncryptionKey) -> CryptoResult<Vec<u8>> {
        self.encrypt_as(plaintext, Secret::Key(key.as_bytes()), self.config.default_encoding)
    }

    /// Decode with the default encoding and open under a raw key
    pub fn decrypt(&self, encoded: &[u8], key: &EncryptionKey) -> CryptoResult<Vec<u8>> {
        self.decrypt_as(encoded, Secret::Key(key.as_bytes()), self.config.default_encoding)
    }

    pub fn encrypt_with_password(&self, plaintext: &[u8], password: &[u8]) -> CryptoResult<Vec<u8>> {
        self.encrypt_as(plaintext, Secret::Password(password), self.config.default_encoding)
    }

    pub fn decrypt_with_password(&self, encoded: &[u8], password: &[u8]) -> CryptoResult<Vec<u8>> {
        self.decrypt_as(encoded, Secret::Password(password), self.config.default_encoding)
    }

    /// Seal and encode with an explicit encoding
    pub fn encrypt_as(
        &self,
        plaintext: &[u8],
        secret: Secret<'_>,
        encoding: OutputEncoding,
    ) -> CryptoResult<Vec<u8>> {
        let envelope = AuthenticatedCipher::encrypt(plaintext, secret)?;
        Ok(encoding::encode(&envelope, encoding))
    }

    /// Decode with an explicit encoding and open
    pub fn decrypt_as(
        &self,
        encoded: &[u8],
        secret: Secret<'_>,
        encoding: OutputEncoding,
    ) -> CryptoResult<Vec<u8>> {
        let envelope = encoding::decode(encoded, encoding)?;
        AuthenticatedCipher::decrypt(&envelope, secret)
    }

    pub fn password_hasher(&self) -> PasswordHasher {
        PasswordHasher::new(self.config.password_hashing)
    }

    pub fn hash_password(&self, password: &[u8]) -> CryptoResult<String> {
        self.password_hasher().hash(password)
    }

    pub fn verify_password(
        &self,
        password: &[u8],
        stored_hash: &str,
    ) -> CryptoResult<PasswordVerification> {
        self.password_hasher().verify(password, stored_hash)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_uses_configured_encoding() {
        let key = EncryptionKey::generate();

        let hex_engine = CryptoEngine::default();
        let sealed = hex_engine.encrypt(b"payload", &key).unwrap();
        assert!(sealed.iter().all(u8::is_ascii_hexdigit));
        assert_eq!(sealed.len(), 2 * (cipher::MIN_ENVELOPE_LEN + 7));
        assert_eq!(hex_engine.decrypt(&sealed, &key).unwrap(), b"payload");

        let raw_engine = CryptoEngine::new(CryptoConfig {
            default_encoding: OutputEncoding::Raw,
            ..CryptoConfig::default()
        });
        let sealed = raw_engine.encrypt(b"payload", &key).unwrap();
        assert_eq!(&sealed[..4], &cipher::VERSION);
    }

    #[test]
    fn test_engine_rejects_wrong_encoding() {
        let key = EncryptionKey::generate();
        let engine = CryptoEngine::default();
        let sealed = engine
            .encrypt_as(b"payload", Secret::Key(key.as_bytes()), OutputEncoding::Base64)
            .unwrap();

        assert!(matches!(
            engine.decrypt(&sealed, &key),
            Err(CryptoError::DecodingError(_))
        ));
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CryptoEngine>();
    }
}
