//! Engine configuration
//!
//! An immutable value handed to [`crate::CryptoEngine`] at construction:
//! - Default output encoding for envelopes
//! - Argon2 parameters for password hashing
//!
//! Envelope constants (salt/IV sizes, PBKDF2 rounds) are part of the wire
//! format and are not configurable.

use crate::encoding::OutputEncoding;
use crate::error::{CryptoError, CryptoResult};
use serde::{Deserialize, Serialize};

/// Argon2 parameters for password hashing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Argon2Params {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Time cost (iterations)
    pub time_cost: u32,
    /// Parallelism factor
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_cost: 19456, // 19 MiB
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl Argon2Params {
    pub fn to_argon2(&self) -> CryptoResult<argon2::Params> {
        argon2::Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|e| CryptoError::ConfigurationError(format!("Invalid Argon2 parameters: {}", e)))
    }
}

/// Crypto engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// Encoding applied to envelopes by the engine facade
    pub default_encoding: OutputEncoding,

    /// Password hashing parameters
    pub password_hashing: Argon2Params,
}

impl CryptoConfig {
    /// Create a configuration from environment variables
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> CryptoResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> CryptoResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(encoding) = lookup("CRYPTO_DEFAULT_ENCODING") {
            config.default_encoding = encoding.parse()?;
        }

        if let Some(memory) = lookup("CRYPTO_ARGON2_MEMORY_KIB") {
            config.password_hashing.memory_cost = parse_u32("CRYPTO_ARGON2_MEMORY_KIB", &memory)?;
        }

        if let Some(time) = lookup("CRYPTO_ARGON2_TIME_COST") {
            config.password_hashing.time_cost = parse_u32("CRYPTO_ARGON2_TIME_COST", &time)?;
        }

        if let Some(lanes) = lookup("CRYPTO_ARGON2_PARALLELISM") {
            config.password_hashing.parallelism = parse_u32("CRYPTO_ARGON2_PARALLELISM", &lanes)?;
        }

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> CryptoResult<()> {
        self.password_hashing.to_argon2().map(|_| ())
    }
}

fn parse_u32(name: &str, value: &str) -> CryptoResult<u32> {
    value
        .trim()
        .parse()
        .map_err(|e| CryptoError::ConfigurationError(format!("Invalid {}: {}", name, e)))
}
