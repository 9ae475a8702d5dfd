//! Deterministic key derivation from a root key.
//!
//! Every output is `HKDF-SHA256(ikm = root, salt = none, info)` where `info`
//! is the pre-authentication encoding of a purpose string and, when present,
//! the context string. Because the context is a separate PAE piece, `None`,
//! `Some("")` and every distinct context select unrelated outputs.

use zeroize::Zeroizing;

use natrium_crypto::asymmetric::SECRET_KEY_BYTES;
use natrium_crypto::{
    kdf, pae, CryptoError, EncryptionKeyPair, SharedKey, SignatureKeyPair, KEY_BYTES,
};

const SHARED_KEY_PURPOSE: &[u8] = b"natrium-shared-key";
const ENCRYPTION_KEY_PAIR_PURPOSE: &[u8] = b"natrium-encryption-key-pair";
const SIGNATURE_KEY_PAIR_PURPOSE: &[u8] = b"natrium-signature-key-pair";

/// Stateless derivation functions.
pub struct KeyDerivation;

impl KeyDerivation {
    /// Derives `length` bytes from `root` for `info`.
    ///
    /// Longer outputs extend shorter ones for the same `info`.
    pub fn hkdf(
        root: &SharedKey,
        length: usize,
        info: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        kdf::derive_key(root.as_bytes(), None, info, length)
    }

    /// Derives the shared key for `context`.
    pub fn shared(root: &SharedKey, context: Option<&str>) -> Result<SharedKey, CryptoError> {
        let key = Self::hkdf(root, KEY_BYTES, &info(SHARED_KEY_PURPOSE, context))?;
        SharedKey::from_bytes(&key)
    }

    /// Derives the X25519 key pair for `context`.
    pub fn encryption(
        root: &SharedKey,
        context: Option<&str>,
    ) -> Result<EncryptionKeyPair, CryptoError> {
        let seed = seed(root, ENCRYPTION_KEY_PAIR_PURPOSE, context)?;
        Ok(EncryptionKeyPair::from_seed(&seed))
    }

    /// Derives the Ed25519 key pair for `context`.
    pub fn signature(
        root: &SharedKey,
        context: Option<&str>,
    ) -> Result<SignatureKeyPair, CryptoError> {
        let seed = seed(root, SIGNATURE_KEY_PAIR_PURPOSE, context)?;
        Ok(SignatureKeyPair::from_seed(&seed))
    }
}

fn info(purpose: &[u8], context: Option<&str>) -> Vec<u8> {
    match context {
        Some(context) => pae(&[purpose, context.as_bytes()]),
        None => pae(&[purpose]),
    }
}

fn seed(
    root: &SharedKey,
    purpose: &[u8],
    context: Option<&str>,
) -> Result<Zeroizing<[u8; SECRET_KEY_BYTES]>, CryptoError> {
    kdf::derive_array::<SECRET_KEY_BYTES>(root.as_bytes(), None, &info(purpose, context))
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn root() -> SharedKey {
        SharedKey::from_array(&[0x11u8; KEY_BYTES])
    }

    #[test]
    fn test_shared_is_deterministic() {
        let a = KeyDerivation::shared(&root(), Some("billing")).unwrap();
        let b = KeyDerivation::shared(&root(), Some("billing")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_none_empty_and_named_contexts_differ() {
        let none = KeyDerivation::shared(&root(), None).unwrap();
        let empty = KeyDerivation::shared(&root(), Some("")).unwrap();
        let named = KeyDerivation::shared(&root(), Some("billing")).unwrap();

        assert_ne!(none, empty);
        assert_ne!(none, named);
        assert_ne!(empty, named);
    }

    #[test]
    fn test_different_roots_differ() {
        let other = SharedKey::from_array(&[0x22u8; KEY_BYTES]);
        assert_ne!(
            KeyDerivation::shared(&root(), None).unwrap(),
            KeyDerivation::shared(&other, None).unwrap()
        );
    }

    #[test]
    fn test_purposes_are_separated() {
        let shared = KeyDerivation::shared(&root(), None).unwrap();
        let encryption = KeyDerivation::encryption(&root(), None).unwrap();
        let signature = KeyDerivation::signature(&root(), None).unwrap();

        assert_ne!(shared.as_bytes(), encryption.secret().as_bytes());
        assert_ne!(shared.as_bytes(), signature.secret().as_bytes());
        assert_ne!(encryption.secret().as_bytes(), signature.secret().as_bytes());
    }

    #[test]
    fn test_key_pairs_are_deterministic() {
        let a = KeyDerivation::signature(&root(), Some("api")).unwrap();
        let b = KeyDerivation::signature(&root(), Some("api")).unwrap();
        assert_eq!(a.public(), b.public());

        let a = KeyDerivation::encryption(&root(), Some("api")).unwrap();
        let b = KeyDerivation::encryption(&root(), Some("api")).unwrap();
        assert_eq!(a.public(), b.public());
    }

    #[test]
    fn test_hkdf_rejects_zero_length() {
        assert!(KeyDerivation::hkdf(&root(), 0, b"info").is_err());
    }

    proptest! {
        #[test]
        fn longer_output_extends_shorter(
            short in 1usize..64,
            extra in 1usize..64,
            info in any::<Vec<u8>>()
        ) {
            let a = KeyDerivation::hkdf(&root(), short, &info).unwrap();
            let b = KeyDerivation::hkdf(&root(), short + extra, &info).unwrap();
            prop_assert_eq!(&b[..short], &a[..]);
        }
    }
}
