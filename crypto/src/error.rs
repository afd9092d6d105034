use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid key length: expected {expected}, got {got}")]
    BadKeyLength { expected: usize, got: usize },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Requested output length {requested} exceeds the maximum of {max}")]
    InvalidLength { requested: usize, max: usize },

    #[error("Ciphertext is too short: need at least {min} bytes, got {got}")]
    CiphertextTooShort { min: usize, got: usize },

    #[error("Bad version header")]
    BadVersionHeader,

    /// Wrong key, wrong password, wrong mode or tampered envelope.
    #[error("Integrity check failed")]
    IntegrityCheckFailed,

    #[error("Cipher operation failed: {0}")]
    CipherOperationFailed(String),

    #[error("Failed to load key: {0}")]
    KeyLoadError(String),

    #[error("Cryptographic operation failed: {0}")]
    CryptoOperationError(String),

    #[error("Decoding failed: {0}")]
    DecodingError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
