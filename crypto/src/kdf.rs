//! HKDF and PBKDF2 over the supported hash set, and the envelope sub-key split.

use crate::error::CryptoError;
use crate::hash::{with_digest, HashAlgorithm};
use hkdf::SimpleHkdf;
use hmac::SimpleHmac;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Key derivation result
pub type KdfResult<T> = Result<T, CryptoError>;

/// HKDF info string for the envelope encryption sub-key
pub const ENCRYPTION_INFO: &[u8] = b"DefusePHP|V2|KeyForEncryption";

/// HKDF info string for the envelope authentication sub-key
pub const AUTHENTICATION_INFO: &[u8] = b"DefusePHP|V2|KeyForAuthentication";

/// Length of each derived envelope sub-key in bytes
pub const DERIVED_KEY_LEN: usize = 32;

/// Independent sub-keys derived from one master secret and salt.
///
/// Recomputed identically on encrypt and decrypt; zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKeys {
    auth_key: [u8; DERIVED_KEY_LEN],
    encrypt_key: [u8; DERIVED_KEY_LEN],
}

impl DerivedKeys {
    /// Derive the authentication and encryption keys with HKDF-SHA256,
    /// separated by [`AUTHENTICATION_INFO`] and [`ENCRYPTION_INFO`].
    pub fn derive(master_key: &[u8], salt: &[u8]) -> KdfResult<Self> {
        let auth = Kdf::hkdf(
            HashAlgorithm::Sha256,
            master_key,
            DERIVED_KEY_LEN,
            AUTHENTICATION_INFO,
            Some(salt),
        )?;
        let encrypt = Kdf::hkdf(
            HashAlgorithm::Sha256,
            master_key,
            DERIVED_KEY_LEN,
            ENCRYPTION_INFO,
            Some(salt),
        )?;

        let mut keys = Self {
            auth_key: [0u8; DERIVED_KEY_LEN],
            encrypt_key: [0u8; DERIVED_KEY_LEN],
        };
        keys.auth_key.copy_from_slice(&auth);
        keys.encrypt_key.copy_from_slice(&encrypt);
        Ok(keys)
    }

    pub fn auth_key(&self) -> &[u8; DERIVED_KEY_LEN] {
        &self.auth_key
    }

    pub fn encrypt_key(&self) -> &[u8; DERIVED_KEY_LEN] {
        &self.encrypt_key
    }
}

/// Key Derivation Function utilities
pub struct Kdf;

impl Kdf {
    /// HKDF (HMAC-based Key Derivation Function) - RFC 5869
    ///
    /// Extract-then-expand over `hash`. A missing salt is replaced by a zero
    /// buffer of the digest length.
    ///
    /// # Arguments
    /// * `ikm` - Input key material (the master key)
    /// * `length` - Length of output key material
    /// * `info` - Context and application specific information
    /// * `salt` - Optional salt value
    ///
    /// # Example
    /// ```
    /// use envelope_crypto::hash::HashAlgorithm;
    /// use envelope_crypto::kdf::Kdf;
    ///
    /// let key = Kdf::hkdf(
    ///     HashAlgorithm::Sha256,
    ///     b"master_secret_key",
    ///     32,
    ///     b"encryption-key-v1",
    ///     Some(b"salt"),
    /// ).unwrap();
    /// assert_eq!(key.len(), 32);
    /// ```
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidLength`] when `length > 255 * digest_len`.
    pub fn hkdf(
        hash: HashAlgorithm,
        ikm: &[u8],
        length: usize,
        info: &[u8],
        salt: Option<&[u8]>,
    ) -> KdfResult<Zeroizing<Vec<u8>>> {
        let max = 255 * hash.digest_len();
        if length > max {
            return Err(CryptoError::InvalidLength {
                requested: length,
                max,
            });
        }

        let mut okm = Zeroizing::new(vec![0u8; length]);
        with_digest!(hash, D => SimpleHkdf::<D>::new(salt, ikm).expand(info, &mut okm))
            .map_err(|_| CryptoError::InvalidLength {
                requested: length,
                max,
            })?;

        Ok(okm)
    }

    /// PBKDF2 - RFC 2898
    ///
    /// With `raw = true` the result is `length` derived bytes. With
    /// `raw = false` the result is the lowercase hex encoding of `length`
    /// derived bytes, so the returned buffer holds `2 * length` characters.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidParameters`] when `iterations` or `length` is zero.
    pub fn pbkdf2(
        hash: HashAlgorithm,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        length: usize,
        raw: bool,
    ) -> KdfResult<Zeroizing<Vec<u8>>> {
        if iterations == 0 || length == 0 {
            return Err(CryptoError::InvalidParameters(format!(
                "PBKDF2 requires positive iterations and length, got {} and {}",
                iterations, length
            )));
        }

        debug!(algorithm = %hash, iterations, length, raw, "Deriving PBKDF2 key");

        let mut derived_key = Zeroizing::new(vec![0u8; length]);
        with_digest!(hash, D => pbkdf2::pbkdf2::<SimpleHmac<D>>(
            password,
            salt,
            iterations,
            &mut derived_key,
        ))
        .map_err(|e| CryptoError::InvalidParameters(e.to_string()))?;

        if raw {
            Ok(derived_key)
        } else {
            Ok(Zeroizing::new(hex::encode(&*derived_key).into_bytes()))
        }
    }
}
