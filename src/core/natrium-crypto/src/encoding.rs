//! Text encodings for keys, envelopes and tokens.
//!
//! Decoding is strict: padding, alphabet and trailing bits must be canonical.

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine,
};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Encodes bytes as base64url without padding.
pub fn encode_b64url(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decodes canonical base64url without padding.
pub fn decode_b64url(input: &str) -> Result<Vec<u8>, CryptoError> {
    URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|e| CryptoError::InvalidEncoding(e.to_string()))
}

/// Encodes secret bytes as padded standard base64.
pub fn encode_b64_secret(data: &[u8]) -> Zeroizing<String> {
    Zeroizing::new(STANDARD.encode(data))
}

/// Encodes public bytes as padded standard base64.
pub fn encode_b64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decodes padded standard base64 into an array of exactly `N` bytes.
pub fn decode_b64_exact<const N: usize>(input: &str) -> Result<Zeroizing<[u8; N]>, CryptoError> {
    let decoded = Zeroizing::new(
        STANDARD
            .decode(input.trim())
            .map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?,
    );

    if decoded.len() != N {
        return Err(CryptoError::InvalidKey(format!(
            "expected {} bytes, got {}",
            N,
            decoded.len()
        )));
    }

    let mut out = Zeroizing::new([0u8; N]);
    out.copy_from_slice(&decoded);
    Ok(out)
}
