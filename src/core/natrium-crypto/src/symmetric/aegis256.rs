//! AEGIS-256 authenticated encryption.
//!
//! Compiled only with the `aegis` feature. Format:
//! `nonce (32 bytes) || ciphertext || tag (32 bytes)`

use aegis::aegis256::Aegis256;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::keys::SharedKey;
use crate::random::generate_nonce;

/// Size of an AEGIS-256 nonce in bytes.
pub const NONCE_BYTES: usize = 32;

/// Size of the AEGIS-256 tag in bytes.
pub const TAG_BYTES: usize = 32;

/// Encrypts with a fresh random nonce.
pub fn encrypt(
    key: &SharedKey,
    plaintext: &[u8],
    associated_data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let nonce = generate_nonce::<NONCE_BYTES>();
    let (ciphertext, tag) =
        Aegis256::<TAG_BYTES>::new(key.as_bytes(), &nonce).encrypt(plaintext, associated_data);

    let mut result = Vec::with_capacity(NONCE_BYTES + ciphertext.len() + TAG_BYTES);
    result.extend_from_slice(&nonce);
    result.extend_from_slice(&ciphertext);
    result.extend_from_slice(&tag);

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

    let (nonce, rest) = ciphertext.split_at(NONCE_BYTES);
    let (encrypted, tag) = rest.split_at(rest.len() - TAG_BYTES);

    let nonce: [u8; NONCE_BYTES] = nonce
        .try_into()
        .map_err(|_| CryptoError::InvalidInput("malformed nonce".to_string()))?;
    let tag: [u8; TAG_BYTES] = tag
        .try_into()
        .map_err(|_| CryptoError::InvalidInput("malformed tag".to_string()))?;

    Aegis256::<TAG_BYTES>::new(key.as_bytes(), &nonce)
        .decrypt(encrypted, &tag, associated_data)
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::DecryptionFailed("authentication failed".to_string()))
}
