//! Secure key types with automatic memory zeroization.
//!
//! All secret key types implement `Zeroize` and `ZeroizeOnDrop` to ensure
//! sensitive key material is securely erased from memory when no longer needed.
//! None of them implement `Serialize`; export is always an explicit call.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::encoding;
use crate::error::CryptoError;
use crate::random::secret_array;

/// Size of every symmetric key in bytes.
pub const KEY_BYTES: usize = 32;

/// Size of a key identifier in bytes.
pub const KEY_ID_BYTES: usize = 32;

/// Domain tag mixed into key identifiers.
const KEY_ID_TAG: &[u8] = b"natrium-key-id-v1";

/// A 256-bit symmetric key with automatic zeroization.
///
/// Equality is constant-time. The type is deliberately not `Clone`: a key has
/// exactly one owner, shared access goes through `Arc`.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SharedKey {
    bytes: [u8; KEY_BYTES],
}

impl SharedKey {
    /// Generates a new random key.
    pub fn generate() -> Self {
        let key = secret_array::<KEY_BYTES>();
        Self { bytes: *key }
    }

    /// Creates a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != KEY_BYTES {
            return Err(CryptoError::InvalidKey(format!(
                "expected {} bytes, got {}",
                KEY_BYTES,
                bytes.len()
            )));
        }

        let mut key_bytes = [0u8; KEY_BYTES];
        key_bytes.copy_from_slice(bytes);

        Ok(Self { bytes: key_bytes })
    }

    /// Creates a key from an owned array.
    pub fn from_array(bytes: &[u8; KEY_BYTES]) -> Self {
        Self { bytes: *bytes }
    }

    /// Returns the raw key bytes.
    ///
    /// Use with caution - the caller must not copy them out of a zeroizing
    /// container.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; KEY_BYTES] {
        &self.bytes
    }

    /// Exports the key as standard base64.
    pub fn export(&self) -> Zeroizing<String> {
        encoding::encode_b64_secret(&self.bytes)
    }

    /// Imports a key exported with [`SharedKey::export`].
    ///
    /// # Errors
    ///
    /// Fails unless the input decodes to exactly 32 bytes.
    pub fn import(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = encoding::decode_b64_exact::<KEY_BYTES>(encoded)?;
        Ok(Self::from_array(&bytes))
    }
}

impl PartialEq for SharedKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl Eq for SharedKey {}

impl std::fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Identifier of a public key: `SHA-256(tag || public_key)`.
#[derive(Clone, Copy)]
pub struct KeyId {
    bytes: [u8; KEY_ID_BYTES],
}

impl KeyId {
    /// Computes the identifier of a public key.
    pub fn of(public_key: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(KEY_ID_TAG);
        hasher.update(public_key);

        let mut bytes = [0u8; KEY_ID_BYTES];
        bytes.copy_from_slice(&hasher.finalize());
        Self { bytes }
    }

    /// Parses a hex-encoded identifier.
    pub fn from_hex(input: &str) -> Result<Self, CryptoError> {
        let decoded =
            hex::decode(input).map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?;

        if decoded.len() != KEY_ID_BYTES {
            return Err(CryptoError::InvalidInput(format!(
                "key id must be {} bytes, got {}",
                KEY_ID_BYTES,
                decoded.len()
            )));
        }

        let mut bytes = [0u8; KEY_ID_BYTES];
        bytes.copy_from_slice(&decoded);
        Ok(Self { bytes })
    }

    /// Returns the lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Returns the raw identifier bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_ID_BYTES] {
        &self.bytes
    }
}

impl PartialEq for KeyId {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl Eq for KeyId {}

impl std::fmt::Display for KeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::fmt::Debug for KeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyId({})", self.to_hex())
    }
}
