use crate::encoding::{decode, encode, OutputEncoding};
use crate::error::{CryptoError, CryptoResult};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Raw key length for envelope encryption (AES-256)
pub const KEY_LEN: usize = 32;

/// Fill a fresh buffer from the operating system CSPRNG
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// A 256-bit raw encryption key, zeroized on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    bytes: [u8; KEY_LEN],
}

impl EncryptionKey {
    /// Generate a new random key (cryptographically secure)
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// # Errors
    ///
    /// [`CryptoError::BadKeyLength`] unless `bytes` is exactly 32 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != KEY_LEN {
            return Err(CryptoError::BadKeyLength {
                expected: KEY_LEN,
                got: bytes.len(),
            });
        }

        let mut key = Self {
            bytes: [0u8; KEY_LEN],
        };
        key.bytes.copy_from_slice(bytes);
        Ok(key)
    }

    /// Decode a key previously exported with [`EncryptionKey::to_encoded`]
    pub fn from_encoded(input: &[u8], encoding: OutputEncoding) -> CryptoResult<Self> {
        let raw = Zeroizing::new(decode(input, encoding)?);
        Self::from_bytes(&raw)
    }

    pub fn to_encoded(&self, encoding: OutputEncoding) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(encode(&self.bytes, encoding))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey([REDACTED])")
    }
}
