//! PASETO error types.

use thiserror::Error;

use natrium_crypto::CryptoError;

use crate::token::Version;

/// Errors that can occur while building, opening or validating tokens.
#[derive(Debug, Error)]
pub enum PasetoError {
    /// The protocol version is recognised but not implemented.
    #[error("unsupported version: {0}")]
    UnsupportedVersion(String),

    /// The token was produced by a different protocol version.
    #[error("version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Version the caller asked for.
        expected: Version,
        /// Version in the token header.
        found: Version,
    },

    /// Local token where a public one was expected, or the reverse.
    #[error("purpose mismatch: expected {expected}, found {found}")]
    PurposeMismatch {
        /// Purpose the operation requires.
        expected: String,
        /// Purpose in the token header.
        found: String,
    },

    /// The token does not have the `version.purpose.payload[.footer]` shape.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// A token segment is not canonical base64url.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// A local token did not authenticate under the given key.
    #[error("token decryption failed")]
    DecryptionFailed,

    /// A public token signature did not verify.
    #[error("token signature is invalid")]
    InvalidSignature,

    /// Implicit assertions were supplied to a version without them.
    #[error("implicit assertions are not supported by {0}")]
    ImplicitAssertion(Version),

    /// Claims could not be encoded, decoded or did not pass validation.
    #[error("invalid claims: {0}")]
    InvalidClaims(String),

    /// A custom claim used a registered claim name.
    #[error("reserved claim name: {0}")]
    ReservedClaim(String),

    /// Underlying cryptographic failure.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}
