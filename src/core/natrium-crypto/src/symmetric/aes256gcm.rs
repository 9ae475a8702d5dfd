//! AES-256-GCM.
//!
//! Format: `nonce (12 bytes) || ciphertext || tag (16 bytes)`. With a 96-bit
//! random nonce a single key should stay well under 2^32 messages.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::keys::SharedKey;
use crate::random::generate_nonce;

/// GCM nonce length.
pub const NONCE_BYTES: usize = 12;

/// GCM tag length.
pub const TAG_BYTES: usize = 16;

fn cipher(key: &SharedKey) -> Aes256Gcm {
    Aes256Gcm::new(key.as_bytes().into())
}

/// Encrypts with a fresh random nonce.
pub fn encrypt(
    key: &SharedKey,
    plaintext: &[u8],
    associated_data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let nonce = generate_nonce::<NONCE_BYTES>();
    let sealed = cipher(key)
        .encrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: plaintext,
                aad: associated_data,
            },
        )
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    Ok([&nonce[..], &sealed[..]].concat())
}

/// Decrypts `nonce || ciphertext || tag`.
pub fn decrypt(
    key: &SharedKey,
    ciphertext: &[u8],
    associated_data: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if ciphertext.len() < NONCE_BYTES + TAG_BYTES {
        return Err(CryptoError::DecryptionFailed(format!(
            "{} bytes is shorter than nonce and tag",
            ciphertext.len()
        )));
    }

    let (nonce, sealed) = ciphertext.split_at(NONCE_BYTES);
    cipher(key)
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: sealed,
                aad: associated_data,
            },
        )
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::DecryptionFailed("authentication failed".to_string()))
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_binds_associated_data() {
        let key = SharedKey::generate();
        let sealed = encrypt(&key, b"wire transfer", b"account-7").unwrap();

        assert_eq!(
            &*decrypt(&key, &sealed, b"account-7").unwrap(),
            b"wire transfer"
        );
        assert!(matches!(
            decrypt(&key, &sealed, b"account-8"),
            Err(CryptoError::DecryptionFailed(_))
        ));
    }

    #[test]
    fn test_layout() {
        let key = SharedKey::generate();
        let sealed = encrypt(&key, b"abcd", b"").unwrap();
        assert_eq!(sealed.len(), NONCE_BYTES + 4 + TAG_BYTES);
    }

    #[test]
    fn test_short_input_rejected() {
        let key = SharedKey::generate();
        assert!(decrypt(&key, &[0u8; NONCE_BYTES + TAG_BYTES - 1], b"").is_err());
    }
}
