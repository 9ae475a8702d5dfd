//! Ed25519 detached signatures.

use ed25519_dalek::Signer;
use subtle::ConstantTimeEq;

use super::keys::{SignatureKeyPair, SignaturePublicKey};
use crate::encoding;
use crate::error::CryptoError;

/// Size of an Ed25519 signature in bytes.
pub const SIGNATURE_BYTES: usize = 64;

/// A detached Ed25519 signature.
#[derive(Clone, Copy)]
pub struct Signature {
    bytes: [u8; SIGNATURE_BYTES],
}

impl Signature {
    /// Parses a signature from raw bytes.
    ///
    /// # Errors
    ///
    /// `InvalidSignature` unless the input is exactly 64 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.is_empty() {
            return Err(CryptoError::InvalidSignature("signature is empty".to_string()));
        }

        let bytes = bytes.try_into().map_err(|_| {
            CryptoError::InvalidSignature(format!(
                "expected {} bytes, got {}",
                SIGNATURE_BYTES,
                bytes.len()
            ))
        })?;

        Ok(Self { bytes })
    }

    /// Returns the raw signature bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_BYTES] {
        &self.bytes
    }

    /// Encodes as base64url without padding.
    pub fn to_b64url(&self) -> String {
        encoding::encode_b64url(&self.bytes)
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl Eq for Signature {}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", self.to_b64url())
    }
}

/// Signs `message` with the secret half of `key_pair`.
pub fn sign(key_pair: &SignatureKeyPair, message: &[u8]) -> Signature {
    let signature = key_pair.secret().signing_key().sign(message);
    Signature {
        bytes: signature.to_bytes(),
    }
}

/// Verifies a detached signature.
///
/// Returns `Ok(false)` for a well-formed signature that does not match.
///
/// # Errors
///
/// `InvalidSignature` for empty or wrong-length signature input,
/// `InvalidKey` if the public key is not a valid curve point.
pub fn verify(
    public_key: &SignaturePublicKey,
    signature: &[u8],
    message: &[u8],
) -> Result<bool, CryptoError> {
    let signature = Signature::from_bytes(signature)?;
    let verifying_key = public_key.verifying_key()?;

    let signature = ed25519_dalek::Signature::from_bytes(&signature.bytes);
    Ok(verifying_key.verify_strict(message, &signature).is_ok())
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify() {
        let pair = SignatureKeyPair::generate();
        let signature = sign(&pair, b"message");

        assert!(verify(pair.public(), signature.as_bytes(), b"message").unwrap());
    }

    #[test]
    fn test_verify_wrong_message_is_false() {
        let pair = SignatureKeyPair::generate();
        let signature = sign(&pair, b"message");

        assert!(!verify(pair.public(), signature.as_bytes(), b"massage").unwrap());
    }

    #[test]
    fn test_verify_wrong_key_is_false() {
        let signature = sign(&SignatureKeyPair::generate(), b"message");
        let other = SignatureKeyPair::generate();

        assert!(!verify(other.public(), signature.as_bytes(), b"message").unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_signature() {
        let pair = SignatureKeyPair::generate();

        assert!(matches!(
            verify(pair.public(), b"", b"message"),
            Err(CryptoError::InvalidSignature(_))
        ));
        assert!(matches!(
            verify(pair.public(), &[0u8; 63], b"message"),
            Err(CryptoError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_signatures_are_deterministic() {
        let pair = SignatureKeyPair::from_seed(&[3u8; 32]);
        assert_eq!(sign(&pair, b"m"), sign(&pair, b"m"));
    }
}
