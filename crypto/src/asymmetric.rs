//! RSA helpers for small payloads and detached signatures.
//!
//! Keys are loaded from PEM (PKCS#8/SPKI or PKCS#1) into owned handles. A
//! handle releases and zeroizes its key material when it goes out of scope,
//! on success and error paths alike.

use crate::error::{CryptoError, CryptoResult};
use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Oaep, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::Zeroizing;

/// Smallest modulus accepted when generating keys
pub const MIN_RSA_BITS: usize = 1024;

/// Minimum run of 0xFF bytes in PKCS#1 v1.5 type-1 padding
const MIN_TYPE1_PADDING: usize = 8;

fn oaep() -> Oaep {
    Oaep::new::<Sha1>()
}

fn crypto_err(e: rsa::Error) -> CryptoError {
    CryptoError::CryptoOperationError(e.to_string())
}

/// A loaded RSA public key
#[derive(Debug, Clone)]
pub struct RsaPublicKeyHandle {
    key: RsaPublicKey,
}

impl RsaPublicKeyHandle {
    /// Load from an SPKI (`BEGIN PUBLIC KEY`) or PKCS#1 (`BEGIN RSA PUBLIC KEY`) PEM
    ///
    /// # Errors
    ///
    /// [`CryptoError::KeyLoadError`] when neither encoding parses.
    pub fn from_pem(pem: &str) -> CryptoResult<Self> {
        let key = RsaPublicKey::from_public_key_pem(pem)
            .or_else(|spki_err| {
                RsaPublicKey::from_pkcs1_pem(pem).map_err(|pkcs1_err| {
                    CryptoError::KeyLoadError(format!(
                        "not an RSA public key (spki: {}, pkcs1: {})",
                        spki_err, pkcs1_err
                    ))
                })
            })?;

        Ok(Self { key })
    }

    /// Modulus size in bytes
    pub fn size(&self) -> usize {
        self.key.size()
    }

    pub fn to_pem(&self) -> CryptoResult<String> {
        self.key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::CryptoOperationError(e.to_string()))
    }

    /// RSA-OAEP (SHA-1, MGF1-SHA-1) encryption
    pub fn encrypt(&self, data: &[u8]) -> CryptoResult<Vec<u8>> {
        self.key
            .encrypt(&mut OsRng, oaep(), data)
            .map_err(crypto_err)
    }

    /// Recover data produced by [`RsaPrivateKeyHandle::encrypt`]
    pub fn decrypt(&self, ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        let k = self.size();
        if ciphertext.len() != k {
            return Err(CryptoError::CryptoOperationError(format!(
                "ciphertext must be {} bytes, got {}",
                k,
                ciphertext.len()
            )));
        }

        let c = BigUint::from_bytes_be(ciphertext);
        if &c >= self.key.n() {
            return Err(CryptoError::CryptoOperationError(
                "ciphertext out of range for modulus".to_string(),
            ));
        }

        let m = rsa::hazmat::rsa_encrypt(&self.key, &c).map_err(crypto_err)?;
        let m_bytes = m.to_bytes_be();
        let pad = k.checked_sub(m_bytes.len()).ok_or_else(|| {
            CryptoError::CryptoOperationError("message larger than modulus".to_string())
        })?;

        let mut em = vec![0u8; k];
        em.split_at_mut(pad).1.copy_from_slice(&m_bytes);

        strip_type1_padding(&em).map(<[u8]>::to_vec).ok_or_else(|| {
            CryptoError::CryptoOperationError("invalid PKCS#1 type 1 padding".to_string())
        })
    }

    /// Verify a PKCS#1 v1.5 SHA-256 signature.
    ///
    /// Returns `Ok(false)` for a signature that does not match; errors are
    /// reserved for faults that prevent checking at all.
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> CryptoResult<bool> {
        let digest = Sha256::digest(data);
        match self
            .key
            .verify(Pkcs1v15Sign::new::<Sha256>(), &digest, signature)
        {
            Ok(()) => Ok(true),
            Err(rsa::Error::Verification) => Ok(false),
            Err(e) => Err(crypto_err(e)),
        }
    }
}

/// A loaded RSA private key, zeroized on drop
pub struct RsaPrivateKeyHandle {
    key: RsaPrivateKey,
}

impl RsaPrivateKeyHandle {
    /// Load from a PKCS#8 (`BEGIN PRIVATE KEY`) or PKCS#1 (`BEGIN RSA PRIVATE KEY`) PEM
    ///
    /// # Errors
    ///
    /// [`CryptoError::KeyLoadError`] when neither encoding parses.
    pub fn from_pem(pem: &str) -> CryptoResult<Self> {
        let key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|pkcs8_err| {
                RsaPrivateKey::from_pkcs1_pem(pem).map_err(|pkcs1_err| {
                    CryptoError::KeyLoadError(format!(
                        "not an RSA private key (pkcs8: {}, pkcs1: {})",
                        pkcs8_err, pkcs1_err
                    ))
                })
            })?;

        Ok(Self { key })
    }

    /// Generate a fresh key with a `bits`-bit modulus
    pub fn generate(bits: usize) -> CryptoResult<Self> {
        if bits < MIN_RSA_BITS {
            return Err(CryptoError::InvalidParameters(format!(
                "RSA modulus must be at least {} bits, got {}",
                MIN_RSA_BITS, bits
            )));
        }

        debug!(bits, "Generating RSA key");
        let key = RsaPrivateKey::new(&mut OsRng, bits).map_err(crypto_err)?;
        Ok(Self { key })
    }

    pub fn public_key(&self) -> RsaPublicKeyHandle {
        RsaPublicKeyHandle {
            key: self.key.to_public_key(),
        }
    }

    pub fn to_pem(&self) -> CryptoResult<Zeroizing<String>> {
        self.key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| CryptoError::CryptoOperationError(e.to_string()))
    }

    /// Recover data produced by [`RsaPublicKeyHandle::encrypt`]
    pub fn decrypt(&self, ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        self.key
            .decrypt_blinded(&mut OsRng, oaep(), ciphertext)
            .map_err(crypto_err)
    }

    /// Private-key encryption with PKCS#1 v1.5 type-1 padding, the only
    /// padding defined for this direction
    pub fn encrypt(&self, data: &[u8]) -> CryptoResult<Vec<u8>> {
        self.key
            .sign_with_rng(&mut OsRng, Pkcs1v15Sign::new_unprefixed(), data)
            .map_err(crypto_err)
    }

    /// PKCS#1 v1.5 signature over the SHA-256 digest of `data`
    pub fn sign(&self, data: &[u8]) -> CryptoResult<Vec<u8>> {
        let digest = Sha256::digest(data);
        self.key
            .sign_with_rng(&mut OsRng, Pkcs1v15Sign::new::<Sha256>(), &digest)
            .map_err(crypto_err)
    }
}

/// PEM-encoded RSA key pair
pub struct RsaKeyPairPem {
    pub private_pem: Zeroizing<String>,
    pub public_pem: String,
}

fn strip_type1_padding(em: &[u8]) -> Option<&[u8]> {
    let rest = em.strip_prefix(&[0x00, 0x01])?;
    let padding = rest.iter().take_while(|&&b| b == 0xFF).count();
    let data = rest.split_at(padding).1.strip_prefix(&[0x00])?;
    (padding >= MIN_TYPE1_PADDING).then_some(data)
}

/// Generate a key pair and return it as PKCS#8 / SPKI PEM
pub fn generate_rsa_keypair(bits: usize) -> CryptoResult<RsaKeyPairPem> {
    let private = RsaPrivateKeyHandle::generate(bits)?;
    Ok(RsaKeyPairPem {
        private_pem: private.to_pem()?,
        public_pem: private.public_key().to_pem()?,
    })
}

/// OAEP-encrypt `data` to the holder of the private key
pub fn encrypt_rsa_public(data: &[u8], public_key_pem: &str) -> CryptoResult<Vec<u8>> {
    RsaPublicKeyHandle::from_pem(public_key_pem)?.encrypt(data)
}

pub fn decrypt_rsa_private(ciphertext: &[u8], private_key_pem: &str) -> CryptoResult<Vec<u8>> {
    RsaPrivateKeyHandle::from_pem(private_key_pem)?.decrypt(ciphertext)
}

pub fn encrypt_rsa_private(data: &[u8], private_key_pem: &str) -> CryptoResult<Vec<u8>> {
    RsaPrivateKeyHandle::from_pem(private_key_pem)?.encrypt(data)
}

pub fn decrypt_rsa_public(ciphertext: &[u8], public_key_pem: &str) -> CryptoResult<Vec<u8>> {
    RsaPublicKeyHandle::from_pem(public_key_pem)?.decrypt(ciphertext)
}

pub fn sign_rsa(data: &[u8], private_key_pem: &str) -> CryptoResult<Vec<u8>> {
    RsaPrivateKeyHandle::from_pem(private_key_pem)?.sign(data)
}

pub fn verify_rsa(data: &[u8], signature: &[u8], public_key_pem: &str) -> CryptoResult<bool> {
    RsaPublicKeyHandle::from_pem(public_key_pem)?.verify(data, signature)
}
