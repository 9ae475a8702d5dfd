//! Version 2: XChaCha20-Poly1305 and Ed25519.
//!
//! ```text
//! local:  n = BLAKE2b-24(key = random(24), m)
//!         c = XChaCha20-Poly1305(K, n, m, ad = PAE(h, n, f))
//!         body = n || c
//! public: sig = Ed25519(PAE(h, m, f))
//!         body = m || sig
//! ```
//!
//! Version 2 has no implicit assertions; the dispatcher rejects them.

use zeroize::Zeroizing;

use natrium_crypto::asymmetric::{self, SIGNATURE_BYTES};
use natrium_crypto::hash::blake2b_24;
use natrium_crypto::random::generate_nonce;
use natrium_crypto::symmetric::xchacha20poly1305::{
    decrypt_with_nonce, encrypt_with_nonce, NONCE_BYTES, TAG_BYTES,
};
use natrium_crypto::{pae, CryptoError, SharedKey, SignatureKeyPair, SignaturePublicKey};

use crate::error::PasetoError;

const LOCAL_HEADER: &[u8] = b"v2.local.";
const PUBLIC_HEADER: &[u8] = b"v2.public.";

pub(crate) fn encrypt(
    key: &SharedKey,
    message: &[u8],
    footer: &[u8],
) -> Result<Vec<u8>, PasetoError> {
    encrypt_with_nonce_key(key, message, footer, &generate_nonce::<NONCE_BYTES>())
}

/// `nonce_key` keys the BLAKE2b call that derives the real nonce.
fn encrypt_with_nonce_key(
    key: &SharedKey,
    message: &[u8],
    footer: &[u8],
    nonce_key: &[u8; NONCE_BYTES],
) -> Result<Vec<u8>, PasetoError> {
    let nonce = blake2b_24(nonce_key, &[message])?;

    let ciphertext = encrypt_with_nonce(
        key.as_bytes(),
        &nonce,
        message,
        &pae(&[LOCAL_HEADER, &*nonce, footer]),
    )?;

    let mut body = Vec::with_capacity(NONCE_BYTES + ciphertext.len());
    body.extend_from_slice(&*nonce);
    body.extend_from_slice(&ciphertext);
    Ok(body)
}

pub(crate) fn decrypt(
    key: &SharedKey,
    body: &[u8],
    footer: &[u8],
) -> Result<Zeroizing<Vec<u8>>, PasetoError> {
    if body.len() < NONCE_BYTES + TAG_BYTES {
        return Err(PasetoError::MalformedToken("v2.local body too short".to_string()));
    }

    let (nonce, ciphertext) = body.split_at(NONCE_BYTES);
    let pre_auth = pae(&[LOCAL_HEADER, nonce, footer]);

    decrypt_with_nonce(key.as_bytes(), nonce, ciphertext, &pre_auth).map_err(
        |e| match e {
            CryptoError::DecryptionFailed(_) => PasetoError::DecryptionFailed,
            other => PasetoError::Crypto(other),
        },
    )
}

pub(crate) fn sign(key_pair: &SignatureKeyPair, message: &[u8], footer: &[u8]) -> Vec<u8> {
    let signature = asymmetric::sign(key_pair, &pae(&[PUBLIC_HEADER, message, footer]));

    let mut body = Vec::with_capacity(message.len() + SIGNATURE_BYTES);
    body.extend_from_slice(message);
    body.extend_from_slice(signature.as_bytes());
    body
}

pub(crate) fn verify(
    public_key: &SignaturePublicKey,
    body: &[u8],
    footer: &[u8],
) -> Result<Vec<u8>, PasetoError> {
    if body.len() < SIGNATURE_BYTES {
        return Err(PasetoError::MalformedToken("v2.public body too short".to_string()));
    }

    let (message, signature) = body.split_at(body.len() - SIGNATURE_BYTES);

    if !asymmetric::verify(public_key, signature, &pae(&[PUBLIC_HEADER, message, footer]))? {
        return Err(PasetoError::InvalidSignature);
    }
    Ok(message.to_vec())
}
