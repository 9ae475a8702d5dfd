//! XChaCha20-Poly1305 authenticated encryption.
//!
//! Format: `nonce (24 bytes) || ciphertext || tag (16 bytes)`. The 192-bit
//! nonce is safe to draw at random for the lifetime of a key.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    XChaCha20Poly1305, XNonce,
};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::keys::SharedKey;
use crate::random::generate_nonce;

/// Size of an XChaCha20 nonce in bytes.
pub const NONCE_BYTES: usize = 24;

/// Size of a Poly1305 tag in bytes.
pub const TAG_BYTES: usize = 16;

/// Encrypts with a fresh random nonce.
pub fn encrypt(
    key: &SharedKey,
    plaintext: &[u8],
    associated_data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let nonce = generate_nonce::<NONCE_BYTES>();
    let ciphertext = encrypt_with_nonce(key.as_bytes(), &nonce, plaintext, associated_data)?;

    let mut result = Vec::with_capacity(NONCE_BYTES + ciphertext.len());
    result.extend_from_slice(&nonce);
    result.extend_from_slice(&ciphertext);

    Ok(result)
}

/// Decrypts `nonce || ciphertext || tag`.
pub fn decrypt(
    key: &SharedKey,
    ciphertext: &[u8],
    associated_data: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if ciphertext.len() < NONCE_BYTES + TAG_BYTES {
        return Err(CryptoError::DecryptionFailed(
            "ciphertext too short".to_string(),
        ));
    }

    let (nonce, encrypted) = ciphertext.split_at(NONCE_BYTES);
    decrypt_with_nonce(key.as_bytes(), nonce, encrypted, associated_data)
}

/// Encrypts under a caller-chosen nonce; returns `ciphertext || tag`.
///
/// Only for constructions that derive their nonce deterministically from
/// fresh randomness (PASETO v2.local). Never call this with a reused nonce.
pub fn encrypt_with_nonce(
    key: &[u8; 32],
    nonce: &[u8; NONCE_BYTES],
    plaintext: &[u8],
    associated_data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = XChaCha20Poly1305::new_from_slice(key)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    cipher
        .encrypt(
            XNonce::from_slice(nonce),
            Payload {
                msg: plaintext,
                aad: associated_data,
            },
        )
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
}

/// Decrypts `ciphertext || tag` under an explicit nonce.
pub fn decrypt_with_nonce(
    key: &[u8; 32],
    nonce: &[u8],
    ciphertext: &[u8],
    associated_data: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if nonce.len() != NONCE_BYTES {
        return Err(CryptoError::InvalidInput(format!(
            "nonce must be {} bytes, got {}",
            NONCE_BYTES,
            nonce.len()
        )));
    }

    let cipher = XChaCha20Poly1305::new_from_slice(key)
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?;

    cipher
        .decrypt(
            XNonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad: associated_data,
            },
        )
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::DecryptionFailed("authentication failed".to_string()))
}
