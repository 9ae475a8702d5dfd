//! XSalsa20-Poly1305 (NaCl `secretbox`).
//!
//! Not an AEAD: there is no associated-data input. The dispatcher in
//! [`super::SymmetricAlgorithm`] rejects non-empty associated data before
//! calling into this module.

use crypto_secretbox::{
    aead::{Aead, KeyInit, Nonce},
    XSalsa20Poly1305,
};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::keys::SharedKey;
use crate::random::generate_nonce;

/// Size of an XSalsa20 nonce in bytes.
pub const NONCE_BYTES: usize = 24;

/// Size of a Poly1305 tag in bytes.
pub const TAG_BYTES: usize = 16;

/// Encrypts with a fresh random nonce.
pub fn encrypt(key: &SharedKey, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = XSalsa20Poly1305::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let nonce = generate_nonce::<NONCE_BYTES>();
    let ciphertext = cipher
        .encrypt(Nonce::<XSalsa20Poly1305>::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let mut result = Vec::with_capacity(NONCE_BYTES + ciphertext.len());
    result.extend_from_slice(&nonce);
    result.extend_from_slice(&ciphertext);

    Ok(result)
}

/// Decrypts `nonce || ciphertext || tag`.
pub fn decrypt(key: &SharedKey, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if ciphertext.len() < NONCE_BYTES + TAG_BYTES {
        return Err(CryptoError::DecryptionFailed(
            "ciphertext too short".to_string(),
        ));
    }

    let cipher = XSalsa20Poly1305::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?;

    let (nonce, encrypted) = ciphertext.split_at(NONCE_BYTES);
    cipher
        .decrypt(Nonce::<XSalsa20Poly1305>::from_slice(nonce), encrypted)
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::DecryptionFailed("authentication failed".to_string()))
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let key = SharedKey::generate();
        let ciphertext = encrypt(&key, b"boxed").unwrap();

        assert_eq!(ciphertext.len(), NONCE_BYTES + 5 + TAG_BYTES);
        assert_eq!(&*decrypt(&key, &ciphertext).unwrap(), b"boxed");
    }

    #[test]
    fn test_wrong_key_fails() {
        let ciphertext = encrypt(&SharedKey::generate(), b"boxed").unwrap();
        assert!(decrypt(&SharedKey::generate(), &ciphertext).is_err());
    }
}
