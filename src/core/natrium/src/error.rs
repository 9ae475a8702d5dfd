//! Facade error types.

use thiserror::Error;

/// Errors returned by [`crate::Natrium`].
#[derive(Debug, Error)]
pub enum NatriumError {
    /// Cryptographic error.
    #[error("crypto error: {0}")]
    Crypto(#[from] natrium_crypto::CryptoError),

    /// Token error.
    #[error("paseto error: {0}")]
    Paseto(#[from] natrium_paseto::PasetoError),

    /// A token footer names a key this instance cannot resolve.
    #[error("unknown key id: {0}")]
    UnknownKeyId(String),
}
