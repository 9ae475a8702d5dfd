//! Keyed BLAKE2b.
//!
//! Output length is part of the BLAKE2b parameter block, so a 24-byte digest
//! is not a prefix of a 32-byte digest over the same input.

use blake2::{
    digest::{
        consts::{U24, U32, U56},
        KeyInit, Mac,
    },
    Blake2bMac,
};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Largest key accepted by keyed BLAKE2b.
pub const MAX_KEY_BYTES: usize = 64;

fn oversized_key(len: usize) -> CryptoError {
    CryptoError::InvalidKey(format!(
        "BLAKE2b key must be at most {} bytes, got {}",
        MAX_KEY_BYTES, len
    ))
}

macro_rules! keyed_blake2b {
    ($(#[$doc:meta])* $name:ident, $size:ty, $len:expr) => {
        $(#[$doc])*
        pub fn $name(key: &[u8], pieces: &[&[u8]]) -> Result<Zeroizing<[u8; $len]>, CryptoError> {
            let mut mac = <Blake2bMac<$size> as KeyInit>::new_from_slice(key)
                .map_err(|_| oversized_key(key.len()))?;
            for piece in pieces {
                Mac::update(&mut mac, piece);
            }

            let mut out = Zeroizing::new([0u8; $len]);
            out.copy_from_slice(&mac.finalize().into_bytes());
            Ok(out)
        }
    };
}

keyed_blake2b!(
    /// BLAKE2b with a 24-byte digest.
    blake2b_24, U24, 24
);
keyed_blake2b!(
    /// BLAKE2b with a 32-byte digest.
    blake2b_32, U32, 32
);
keyed_blake2b!(
    /// BLAKE2b with a 56-byte digest (a 32-byte key followed by a 24-byte nonce).
    blake2b_56, U56, 56
);

/// Verifies a 32-byte keyed BLAKE2b tag in constant time.
pub fn verify_blake2b_32(key: &[u8], pieces: &[&[u8]], tag: &[u8]) -> Result<bool, CryptoError> {
    let mut mac = <Blake2bMac<U32> as KeyInit>::new_from_slice(key)
        .map_err(|_| oversized_key(key.len()))?;
    for piece in pieces {
        Mac::update(&mut mac, piece);
    }
    Ok(mac.verify_slice(tag).is_ok())
}
