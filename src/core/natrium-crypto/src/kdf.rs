//! HKDF-SHA256 (RFC 5869).
//!
//! Box keys, shared keys and key-pair seeds all come out of [`derive_key`].
//! For fixed `ikm`, `salt` and `info` the output stream is the same whatever
//! the length, so a longer derivation extends a shorter one.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Largest output HKDF-SHA256 can produce (255 hash blocks).
pub const MAX_OUTPUT_BYTES: usize = 255 * 32;

fn expand_into(
    ikm: &[u8],
    salt: Option<&[u8]>,
    info: &[u8],
    out: &mut [u8],
) -> Result<(), CryptoError> {
    if out.is_empty() {
        return Err(CryptoError::InvalidInput(
            "HKDF output must not be empty".to_string(),
        ));
    }

    Hkdf::<Sha256>::new(salt, ikm)
        .expand(info, out)
        .map_err(|_| {
            CryptoError::InvalidInput(format!(
                "HKDF output of {} bytes exceeds {}",
                out.len(),
                MAX_OUTPUT_BYTES
            ))
        })
}

/// Derives `length` bytes of output key material.
///
/// # Errors
///
/// `InvalidInput` if `length` is zero or above [`MAX_OUTPUT_BYTES`].
pub fn derive_key(
    ikm: &[u8],
    salt: Option<&[u8]>,
    info: &[u8],
    length: usize,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let mut okm = Zeroizing::new(vec![0u8; length]);
    expand_into(ikm, salt, info, &mut okm)?;
    Ok(okm)
}

/// Same as [`derive_key`] with the length fixed by the type.
pub fn derive_array<const N: usize>(
    ikm: &[u8],
    salt: Option<&[u8]>,
    info: &[u8],
) -> Result<Zeroizing<[u8; N]>, CryptoError> {
    let mut okm = Zeroizing::new([0u8; N]);
    expand_into(ikm, salt, info, okm.as_mut_slice())?;
    Ok(okm)
}
