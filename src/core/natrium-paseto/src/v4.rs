//! Version 4: XChaCha20 + keyed BLAKE2b and Ed25519.
//!
//! ```text
//! local:  Ek || n2 = BLAKE2b-56(key = K, "paseto-encryption-key" || n)
//!         Ak       = BLAKE2b-32(key = K, "paseto-auth-key-for-aead" || n)
//!         c        = XChaCha20(Ek, n2, m)
//!         t        = BLAKE2b-32(key = Ak, PAE(h, n, c, f, i))
//!         body     = n || c || t
//! public: sig  = Ed25519(PAE(h, m, f, i))
//!         body = m || sig
//! ```

use zeroize::Zeroizing;

use natrium_crypto::asymmetric::{self, SIGNATURE_BYTES};
use natrium_crypto::random::generate_nonce;
use natrium_crypto::symmetric::xchacha20blake2b::{
    decrypt_detached, encrypt_detached, Domains, NONCE_BYTES, TAG_BYTES,
};
use natrium_crypto::{pae, CryptoError, SharedKey, SignatureKeyPair, SignaturePublicKey};

use crate::error::PasetoError;

const LOCAL_HEADER: &[u8] = b"v4.local.";
const PUBLIC_HEADER: &[u8] = b"v4.public.";

const DOMAINS: Domains = Domains {
    encryption: b"paseto-encryption-key",
    authentication: b"paseto-auth-key-for-aead",
};

pub(crate) fn encrypt(
    key: &SharedKey,
    message: &[u8],
    footer: &[u8],
    implicit: &[u8],
) -> Result<Vec<u8>, PasetoError> {
    encrypt_with_nonce(
        key,
        message,
        footer,
        implicit,
        &generate_nonce::<NONCE_BYTES>(),
    )
}

fn encrypt_with_nonce(
    key: &SharedKey,
    message: &[u8],
    footer: &[u8],
    implicit: &[u8],
    nonce: &[u8; NONCE_BYTES],
) -> Result<Vec<u8>, PasetoError> {
    let (ciphertext, tag) = encrypt_detached(key.as_bytes(), nonce, message, DOMAINS, |c| {
        pae(&[LOCAL_HEADER, nonce, c, footer, implicit])
    })?;

    let mut body = Vec::with_capacity(NONCE_BYTES + ciphertext.len() + TAG_BYTES);
    body.extend_from_slice(nonce);
    body.extend_from_slice(&ciphertext);
    body.extend_from_slice(&*tag);
    Ok(body)
}

pub(crate) fn decrypt(
    key: &SharedKey,
    body: &[u8],
    footer: &[u8],
    implicit: &[u8],
) -> Result<Zeroizing<Vec<u8>>, PasetoError> {
    if body.len() < NONCE_BYTES + TAG_BYTES {
        return Err(PasetoError::MalformedToken("v4.local body too short".to_string()));
    }

    let (nonce, rest) = body.split_at(NONCE_BYTES);
    let (ciphertext, tag) = rest.split_at(rest.len() - TAG_BYTES);

    decrypt_detached(key.as_bytes(), nonce, ciphertext, tag, DOMAINS, |c| {
        pae(&[LOCAL_HEADER, nonce, c, footer, implicit])
    })
    .map_err(|e| match e {
        CryptoError::DecryptionFailed(_) => PasetoError::DecryptionFailed,
        other => PasetoError::Crypto(other),
    })
}

pub(crate) fn sign(
    key_pair: &SignatureKeyPair,
    message: &[u8],
    footer: &[u8],
    implicit: &[u8],
) -> Vec<u8> {
    let signature = asymmetric::sign(
        key_pair,
        &pae(&[PUBLIC_HEADER, message, footer, implicit]),
    );

    let mut body = Vec::with_capacity(message.len() + SIGNATURE_BYTES);
    body.extend_from_slice(message);
    body.extend_from_slice(signature.as_bytes());
    body
}

pub(crate) fn verify(
    public_key: &SignaturePublicKey,
    body: &[u8],
    footer: &[u8],
    implicit: &[u8],
) -> Result<Vec<u8>, PasetoError> {
    if body.len() < SIGNATURE_BYTES {
        return Err(PasetoError::MalformedToken("v4.public body too short".to_string()));
    }

    let (message, signature) = body.split_at(body.len() - SIGNATURE_BYTES);
    let pre_auth = pae(&[PUBLIC_HEADER, message, footer, implicit]);

    if !asymmetric::verify(public_key, signature, &pre_auth)? {
        return Err(PasetoError::InvalidSignature);
    }
    Ok(message.to_vec())
}
