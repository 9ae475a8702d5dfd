//! XChaCha20 with a keyed BLAKE2b MAC (encrypt-then-MAC).
//!
//! The 256-bit key is never used directly: for every message a fresh 32-byte
//! nonce `n` selects an encryption key, a stream nonce and an authentication
//! key:
//!
//! ```text
//! Ek || n2 = BLAKE2b-56(key = K, encryption_domain || n)
//! Ak       = BLAKE2b-32(key = K, authentication_domain || n)
//! c        = XChaCha20(Ek, n2, m)
//! t        = BLAKE2b-32(key = Ak, pre_auth(n, c))
//! ```
//!
//! Format: `n (32 bytes) || c || t (32 bytes)`. PASETO v4.local is the same
//! construction with its own domain strings and pre-authentication encoding.

use chacha20::{
    cipher::{KeyIvInit, StreamCipher},
    XChaCha20,
};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::hash::{blake2b_32, blake2b_56, verify_blake2b_32};
use crate::keys::SharedKey;
use crate::pae::pae;
use crate::random::generate_nonce;

/// Size of the per-message nonce in bytes.
pub const NONCE_BYTES: usize = 32;

/// Size of the BLAKE2b tag in bytes.
pub const TAG_BYTES: usize = 32;

/// Domain strings that separate the derived encryption and authentication keys.
#[derive(Debug, Clone, Copy)]
pub struct Domains {
    /// Prefix for the encryption key / stream nonce derivation.
    pub encryption: &'static [u8],
    /// Prefix for the authentication key derivation.
    pub authentication: &'static [u8],
}

const NATRIUM_DOMAINS: Domains = Domains {
    encryption: b"natrium-xchacha20-blake2b-encryption-key",
    authentication: b"natrium-xchacha20-blake2b-auth-key",
};

struct MessageKeys {
    encryption: Zeroizing<[u8; 56]>,
    authentication: Zeroizing<[u8; 32]>,
}

impl MessageKeys {
    fn derive(key: &[u8; 32], nonce: &[u8], domains: Domains) -> Result<Self, CryptoError> {
        Ok(Self {
            encryption: blake2b_56(key, &[domains.encryption, nonce])?,
            authentication: blake2b_32(key, &[domains.authentication, nonce])?,
        })
    }

    fn apply_keystream(&self, data: &mut [u8]) -> Result<(), CryptoError> {
        let (ek, n2) = self.encryption.split_at(32);
        let mut cipher = XChaCha20::new_from_slices(ek, n2)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
        cipher.apply_keystream(data);
        Ok(())
    }
}

/// Encrypts under an explicit nonce and returns `(ciphertext, tag)`.
///
/// `pre_auth` receives the ciphertext and returns the bytes the tag covers.
pub fn encrypt_detached<F>(
    key: &[u8; 32],
    nonce: &[u8; NONCE_BYTES],
    plaintext: &[u8],
    domains: Domains,
    pre_auth: F,
) -> Result<(Vec<u8>, Zeroizing<[u8; TAG_BYTES]>), CryptoError>
where
    F: FnOnce(&[u8]) -> Vec<u8>,
{
    let keys = MessageKeys::derive(key, nonce, domains)?;

    let mut ciphertext = plaintext.to_vec();
    keys.apply_keystream(&mut ciphertext)?;

    let tag = blake2b_32(&*keys.authentication, &[&pre_auth(&ciphertext)])?;
    Ok((ciphertext, tag))
}

/// Verifies `tag` and decrypts. Fails with `DecryptionFailed` on a bad tag.
pub fn decrypt_detached<F>(
    key: &[u8; 32],
    nonce: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
    domains: Domains,
    pre_auth: F,
) -> Result<Zeroizing<Vec<u8>>, CryptoError>
where
    F: FnOnce(&[u8]) -> Vec<u8>,
{
    if nonce.len() != NONCE_BYTES {
        return Err(CryptoError::InvalidInput(format!(
            "nonce must be {} bytes, got {}",
            NONCE_BYTES,
            nonce.len()
        )));
    }

    let keys = MessageKeys::derive(key, nonce, domains)?;

    if !verify_blake2b_32(&*keys.authentication, &[&pre_auth(ciphertext)], tag)? {
        return Err(CryptoError::DecryptionFailed(
            "authentication failed".to_string(),
        ));
    }

    let mut plaintext = Zeroizing::new(ciphertext.to_vec());
    keys.apply_keystream(&mut plaintext)?;
    Ok(plaintext)
}

/// Encrypts with a fresh random nonce; the tag covers `PAE(n, c, ad)`.
pub fn encrypt(
    key: &SharedKey,
    plaintext: &[u8],
    associated_data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let nonce = generate_nonce::<NONCE_BYTES>();
    let (ciphertext, tag) =
        encrypt_detached(key.as_bytes(), &nonce, plaintext, NATRIUM_DOMAINS, |c| {
            pae(&[&nonce, c, associated_data])
        })?;

    let mut result = Vec::with_capacity(NONCE_BYTES + ciphertext.len() + TAG_BYTES);
    result.extend_from_slice(&nonce);
    result.extend_from_slice(&ciphertext);
    result.extend_from_slice(&*tag);

    Ok(result)
}

/// Decrypts `n || c || t`.
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

    decrypt_detached(key.as_bytes(), nonce, encrypted, tag, NATRIUM_DOMAINS, |c| {
        pae(&[nonce, c, associated_data])
    })
}
