//! Versioned encrypt-then-MAC envelope.
//!
//! ```text
//! offset 0     len 4   VERSION
//! offset 4     len 32  SALT
//! offset 36    len 16  IV
//! offset 52    len N   CIPHERTEXT   (AES-256-CTR, N = plaintext length)
//! offset 52+N  len 32  MAC          (HMAC-SHA256 over everything before it)
//! ```
//!
//! Encryption and authentication keys are derived per envelope from the
//! caller's secret and the envelope salt. The MAC is always verified, in
//! constant time, before any byte is decrypted.

use crate::constant_time::verify_mac;
use crate::error::{CryptoError, CryptoResult};
use crate::hash::HashAlgorithm;
use crate::kdf::{DerivedKeys, Kdf};
use crate::key::{random_bytes, KEY_LEN};
use ctr::cipher::{KeyIvInit, StreamCipher};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::{debug, warn};
use zeroize::Zeroizing;

type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// Envelope format magic
pub const VERSION: [u8; 4] = [0xDE, 0xF5, 0x02, 0x00];
pub const VERSION_LEN: usize = 4;
pub const SALT_LEN: usize = 32;
pub const IV_LEN: usize = 16;
pub const MAC_LEN: usize = 32;
pub const HEADER_LEN: usize = VERSION_LEN + SALT_LEN + IV_LEN;
/// Size of an envelope around an empty plaintext
pub const MIN_ENVELOPE_LEN: usize = HEADER_LEN + MAC_LEN;

/// PBKDF2-SHA256 rounds applied to passwords before HKDF
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// The secret an envelope is sealed under.
///
/// The envelope does not record which kind was used. Opening it with the
/// other kind derives different keys and fails the integrity check.
#[derive(Clone, Copy)]
pub enum Secret<'a> {
    /// A raw 32-byte key, used directly as the HKDF input
    Key(&'a [u8]),
    /// A password of any length, stretched with PBKDF2 first
    Password(&'a [u8]),
}

impl Secret<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Secret::Key(_) => "key",
            Secret::Password(_) => "password",
        }
    }
}

impl fmt::Debug for Secret<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret::{}([REDACTED])", self.kind())
    }
}

/// Borrowed, length-checked view of a serialized envelope
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeParts<'a> {
    pub version: &'a [u8],
    pub salt: &'a [u8],
    pub iv: &'a [u8],
    pub ciphertext: &'a [u8],
    pub mac: &'a [u8],
    authenticated: &'a [u8],
}

impl<'a> EnvelopeParts<'a> {
    /// Split an envelope at its fixed offsets.
    ///
    /// # Errors
    ///
    /// [`CryptoError::CiphertextTooShort`] below [`MIN_ENVELOPE_LEN`] bytes,
    /// [`CryptoError::BadVersionHeader`] when the magic does not match.
    pub fn parse(envelope: &'a [u8]) -> CryptoResult<Self> {
        if envelope.len() < MIN_ENVELOPE_LEN {
            return Err(CryptoError::CiphertextTooShort {
                min: MIN_ENVELOPE_LEN,
                got: envelope.len(),
            });
        }

        let (authenticated, mac) = envelope.split_at(envelope.len() - MAC_LEN);
        let (version, rest) = authenticated.split_at(VERSION_LEN);
        let (salt, rest) = rest.split_at(SALT_LEN);
        let (iv, ciphertext) = rest.split_at(IV_LEN);

        if version != VERSION {
            return Err(CryptoError::BadVersionHeader);
        }

        Ok(Self {
            version,
            salt,
            iv,
            ciphertext,
            mac,
            authenticated,
        })
    }

    /// `VERSION || SALT || IV || CIPHERTEXT`, the bytes covered by the MAC
    pub fn authenticated_data(&self) -> &'a [u8] {
        self.authenticated
    }
}

/// Stateless envelope encryption. Every call is one self-contained
/// transaction with its own salt, IV and derived keys.
pub struct AuthenticatedCipher;

impl AuthenticatedCipher {
    /// Seal `plaintext` into a new envelope.
    ///
    /// # Errors
    ///
    /// [`CryptoError::BadKeyLength`] for a raw key that is not 32 bytes.
    pub fn encrypt(plaintext: &[u8], secret: Secret<'_>) -> CryptoResult<Vec<u8>> {
        check_key_length(secret)?;

        let salt = random_bytes(SALT_LEN);
        let keys = derive_keys(secret, &salt)?;
        let iv = random_bytes(IV_LEN);

        let mut envelope = Vec::with_capacity(MIN_ENVELOPE_LEN + plaintext.len());
        envelope.extend_from_slice(&VERSION);
        envelope.extend_from_slice(&salt);
        envelope.extend_from_slice(&iv);
        envelope.extend_from_slice(plaintext);

        let body = envelope.split_at_mut(HEADER_LEN).1;
        apply_keystream(keys.encrypt_key(), &iv, body)?;

        let mac = compute_mac(keys.auth_key(), &envelope)?;
        envelope.extend_from_slice(&mac);

        debug!(
            secret = secret.kind(),
            plaintext_len = plaintext.len(),
            envelope_len = envelope.len(),
            "Sealed envelope"
        );

        Ok(envelope)
    }

    /// Verify and open an envelope produced by [`AuthenticatedCipher::encrypt`].
    ///
    /// The caller must supply the same kind of [`Secret`] used to seal it.
    ///
    /// # Errors
    ///
    /// [`CryptoError::CiphertextTooShort`], [`CryptoError::BadVersionHeader`],
    /// [`CryptoError::BadKeyLength`], or [`CryptoError::IntegrityCheckFailed`]
    /// for a wrong secret or any modification of the envelope.
    pub fn decrypt(envelope: &[u8], secret: Secret<'_>) -> CryptoResult<Vec<u8>> {
        let parts = EnvelopeParts::parse(envelope)?;
        check_key_length(secret)?;

        let keys = derive_keys(secret, parts.salt)?;
        let expected_mac = compute_mac(keys.auth_key(), parts.authenticated_data())?;

        if !verify_mac(&expected_mac, parts.mac) {
            warn!(
                secret = secret.kind(),
                envelope_len = envelope.len(),
                "Envelope failed integrity check"
            );
            return Err(CryptoError::IntegrityCheckFailed);
        }

        let mut plaintext = parts.ciphertext.to_vec();
        apply_keystream(keys.encrypt_key(), parts.iv, &mut plaintext)?;

        debug!(
            secret = secret.kind(),
            plaintext_len = plaintext.len(),
            "Opened envelope"
        );

        Ok(plaintext)
    }

    pub fn encrypt_with_key(plaintext: &[u8], key: &[u8]) -> CryptoResult<Vec<u8>> {
        Self::encrypt(plaintext, Secret::Key(key))
    }

    pub fn decrypt_with_key(envelope: &[u8], key: &[u8]) -> CryptoResult<Vec<u8>> {
        Self::decrypt(envelope, Secret::Key(key))
    }

    pub fn encrypt_with_password(plaintext: &[u8], password: &[u8]) -> CryptoResult<Vec<u8>> {
        Self::encrypt(plaintext, Secret::Password(password))
    }

    pub fn decrypt_with_password(envelope: &[u8], password: &[u8]) -> CryptoResult<Vec<u8>> {
        Self::decrypt(envelope, Secret::Password(password))
    }
}

fn check_key_length(secret: Secret<'_>) -> CryptoResult<()> {
    match secret {
        Secret::Key(key) if key.len() != KEY_LEN => Err(CryptoError::BadKeyLength {
            expected: KEY_LEN,
            got: key.len(),
        }),
        _ => Ok(()),
    }
}

fn derive_keys(secret: Secret<'_>, salt: &[u8]) -> CryptoResult<DerivedKeys> {
    match secret {
        Secret::Key(key) => DerivedKeys::derive(key, salt),
        Secret::Password(password) => {
            let prehash: Zeroizing<[u8; 32]> = Zeroizing::new(Sha256::digest(password).into());
            let master_key = Kdf::pbkdf2(
                HashAlgorithm::Sha256,
                &prehash[..],
                salt,
                PBKDF2_ITERATIONS,
                KEY_LEN,
                true,
            )?;
            DerivedKeys::derive(&master_key, salt)
        }
    }
}

fn compute_mac(auth_key: &[u8], data: &[u8]) -> CryptoResult<[u8; MAC_LEN]> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(auth_key)
        .map_err(|e| CryptoError::CipherOperationFailed(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().into())
}

fn apply_keystream(key: &[u8], iv: &[u8], buffer: &mut [u8]) -> CryptoResult<()> {
    let mut cipher = Aes256Ctr::new_from_slices(key, iv)
        .map_err(|e| CryptoError::CipherOperationFailed(e.to_string()))?;
    cipher
        .try_apply_keystream(buffer)
        .map_err(|e| CryptoError::CipherOperationFailed(e.to_string()))
}
