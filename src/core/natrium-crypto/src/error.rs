//! Cryptographic error types.

use thiserror::Error;

/// Errors that can occur during cryptographic operations.
///
/// Authentication failures on decrypt are not errors: they surface as `None`
/// from the `decrypt`/`unseal` family so callers branch on them explicitly.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key generation or derivation failed.
    #[error("key generation failed: {0}")]
    KeyGenerationFailed(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed.
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// Invalid key format or size.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Key pair material has the wrong length or the halves do not match.
    #[error("invalid key pair: {0}")]
    InvalidKeyPair(String),

    /// Signature input is empty or malformed.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// The algorithm is unavailable or was used in a way it cannot support.
    #[error("cryptographic logic error: {0}")]
    CryptographicLogic(String),

    /// Invalid input data.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Invalid text encoding (base64, hex, envelope).
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),
}

/// Shorthand for results in this crate.
pub type Result<T> = std::result::Result<T, CryptoError>;
