//! Hash algorithms accepted by the key derivation functions.

use crate::error::CryptoError;
use std::fmt;
use std::str::FromStr;

/// Hash algorithms accepted for key derivation.
///
/// The set is closed: md5 and any other weak or unknown digest has no
/// variant and is rejected while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Ripemd160,
    Ripemd256,
    Ripemd320,
    Whirlpool,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 9] = [
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha224,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
        HashAlgorithm::Ripemd160,
        HashAlgorithm::Ripemd256,
        HashAlgorithm::Ripemd320,
        HashAlgorithm::Whirlpool,
    ];

    /// Output size of the digest in bytes
    pub fn digest_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha224 => 28,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
            HashAlgorithm::Ripemd160 => 20,
            HashAlgorithm::Ripemd256 => 32,
            HashAlgorithm::Ripemd320 => 40,
            HashAlgorithm::Whirlpool => 64,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Ripemd160 => "ripemd160",
            HashAlgorithm::Ripemd256 => "ripemd256",
            HashAlgorithm::Ripemd320 => "ripemd320",
            HashAlgorithm::Whirlpool => "whirlpool",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase();
        HashAlgorithm::ALL
            .iter()
            .copied()
            .find(|algorithm| algorithm.name() == wanted)
            .ok_or_else(|| CryptoError::UnsupportedAlgorithm(s.to_string()))
    }
}

/// Run `$body` with `$digest` bound to the concrete digest type of `$algorithm`.
macro_rules! with_digest {
    ($algorithm:expr, $digest:ident => $body:expr) => {
        match $algorithm {
            $crate::hash::HashAlgorithm::Sha1 => {
                type $digest = ::sha1::Sha1;
                $body
            }
            $crate::hash::HashAlgorithm::Sha224 => {
                type $digest = ::sha2::Sha224;
                $body
            }
            $crate::hash::HashAlgorithm::Sha256 => {
                type $digest = ::sha2::Sha256;
                $body
            }
            $crate::hash::HashAlgorithm::Sha384 => {
                type $digest = ::sha2::Sha384;
                $body
            }
            $crate::hash::HashAlgorithm::Sha512 => {
                type $digest = ::sha2::Sha512;
                $body
            }
            $crate::hash::HashAlgorithm::Ripemd160 => {
                type $digest = ::ripemd::Ripemd160;
                $body
            }
            $crate::hash::HashAlgorithm::Ripemd256 => {
                type $digest = ::ripemd::Ripemd256;
                $body
            }
            $crate::hash::HashAlgorithm::Ripemd320 => {
                type $digest = ::ripemd::Ripemd320;
                $body
            }
            $crate::hash::HashAlgorithm::Whirlpool => {
                type $digest = ::whirlpool::Whirlpool;
                $body
            }
        }
    };
}

pub(crate) use with_digest;
