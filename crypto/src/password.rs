//! Argon2i password hashing with rehash detection.

use crate::config::Argon2Params;
use crate::error::{CryptoError, CryptoResult};
use argon2::{
    password_hash::{PasswordHasher as _, SaltString},
    Algorithm, Argon2, PasswordHash, PasswordVerifier, Version,
};
use rand::rngs::OsRng;
use tracing::debug;

/// Outcome of checking a password against a stored hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordVerification {
    /// The password matches the stored hash
    pub valid: bool,
    /// The stored hash was produced with a different algorithm, version or
    /// weaker parameters than the current configuration and should be
    /// regenerated with [`PasswordHasher::hash`]
    pub needs_rehash: bool,
}

/// One-way password hashing with Argon2i (v0x13), PHC string output
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Argon2Params,
}

impl PasswordHasher {
    pub const ALGORITHM: Algorithm = Algorithm::Argon2i;
    pub const VERSION: Version = Version::V0x13;

    pub fn new(params: Argon2Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> CryptoResult<Argon2<'static>> {
        Ok(Argon2::new(
            Self::ALGORITHM,
            Self::VERSION,
            self.params.to_argon2()?,
        ))
    }

    /// Hash a password for storage
    ///
    /// Returns the password hash in PHC string format which includes the
    /// algorithm identifier, parameters, salt and hash.
    pub fn hash(&self, password: &[u8]) -> CryptoResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()?
            .hash_password(password, &salt)
            .map_err(|e| CryptoError::CryptoOperationError(e.to_string()))?
            .to_string();

        Ok(hash)
    }

    /// Verify a password against a stored PHC hash
    ///
    /// # Errors
    ///
    /// [`CryptoError::DecodingError`] when `stored_hash` is not a PHC string.
    pub fn verify(&self, password: &[u8], stored_hash: &str) -> CryptoResult<PasswordVerification> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| CryptoError::DecodingError(format!("Invalid password hash: {}", e)))?;

        // Parameters come from the stored hash itself
        let valid = Argon2::default()
            .verify_password(password, &parsed)
            .is_ok();

        let needs_rehash = valid && self.needs_rehash(&parsed);
        if needs_rehash {
            debug!(algorithm = %parsed.algorithm, "Stored password hash is outdated");
        }

        Ok(PasswordVerification {
            valid,
            needs_rehash,
        })
    }

    fn needs_rehash(&self, parsed: &PasswordHash<'_>) -> bool {
        if parsed.algorithm != Self::ALGORITHM.ident() {
            return true;
        }
        if parsed.version != Some(Self::VERSION.into()) {
            return true;
        }

        match argon2::Params::try_from(parsed) {
            Ok(stored) => {
                stored.m_cost() < self.params.memory_cost
                    || stored.t_cost() < self.params.time_cost
                    || stored.p_cost() != self.params.parallelism
            }
            Err(_) => true,
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(Argon2Params::default())
    }
}
