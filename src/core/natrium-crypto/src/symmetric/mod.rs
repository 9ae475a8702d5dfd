//! Symmetric algorithm suite.
//!
//! Every algorithm takes a 32-byte [`SharedKey`], draws a fresh random nonce
//! per call and prepends it to the output. The set of algorithms is closed:
//! [`SymmetricAlgorithm`] dispatches to one module per variant.
//!
//! ## Envelope Format
//!
//! [`EncryptedMessage`] renders as `natrium:{algorithm}:{base64url}` so the
//! algorithm travels with the ciphertext.

#[cfg(feature = "aegis")]
pub mod aegis256;
pub mod aes256gcm;
pub mod xchacha20blake2b;
pub mod xchacha20poly1305;
pub mod xsalsa20poly1305;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::encoding::{decode_b64url, encode_b64url};
use crate::error::CryptoError;
use crate::keys::{SharedKey, KEY_BYTES};

/// Prefix of the text envelope.
pub const ENVELOPE_PREFIX: &str = "natrium";

/// Supported symmetric algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SymmetricAlgorithm {
    /// AEGIS-256 (requires the `aegis` feature).
    #[serde(rename = "aegis-256")]
    Aegis256,
    /// AES-256-GCM.
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
    /// XChaCha20-Poly1305 (default).
    #[default]
    #[serde(rename = "xchacha20-poly1305")]
    XChaCha20Poly1305,
    /// XChaCha20 with a keyed BLAKE2b MAC.
    #[serde(rename = "xchacha20-blake2b")]
    XChaCha20Blake2b,
    /// XSalsa20-Poly1305 secretbox. Does not accept associated data.
    #[serde(rename = "xsalsa20-poly1305")]
    XSalsa20Poly1305,
}

impl SymmetricAlgorithm {
    /// Every variant, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Aegis256,
        Self::Aes256Gcm,
        Self::XChaCha20Poly1305,
        Self::XChaCha20Blake2b,
        Self::XSalsa20Poly1305,
    ];

    /// Key length in bytes.
    pub const fn key_bytes(self) -> usize {
        KEY_BYTES
    }

    /// Nonce length in bytes.
    pub const fn nonce_bytes(self) -> usize {
        match self {
            Self::Aegis256 => 32,
            Self::Aes256Gcm => aes256gcm::NONCE_BYTES,
            Self::XChaCha20Poly1305 => xchacha20poly1305::NONCE_BYTES,
            Self::XChaCha20Blake2b => xchacha20blake2b::NONCE_BYTES,
            Self::XSalsa20Poly1305 => xsalsa20poly1305::NONCE_BYTES,
        }
    }

    /// Authentication tag length in bytes.
    pub const fn tag_bytes(self) -> usize {
        match self {
            Self::Aegis256 => 32,
            Self::Aes256Gcm => aes256gcm::TAG_BYTES,
            Self::XChaCha20Poly1305 => xchacha20poly1305::TAG_BYTES,
            Self::XChaCha20Blake2b => xchacha20blake2b::TAG_BYTES,
            Self::XSalsa20Poly1305 => xsalsa20poly1305::TAG_BYTES,
        }
    }

    /// Whether the algorithm binds associated data into its tag.
    pub const fn is_aead(self) -> bool {
        !matches!(self, Self::XSalsa20Poly1305)
    }

    /// Whether the algorithm is compiled into this build.
    pub const fn available(self) -> bool {
        match self {
            Self::Aegis256 => cfg!(feature = "aegis"),
            _ => true,
        }
    }

    /// Stable name used in envelopes and configuration.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Aegis256 => "aegis-256",
            Self::Aes256Gcm => "aes-256-gcm",
            Self::XChaCha20Poly1305 => "xchacha20-poly1305",
            Self::XChaCha20Blake2b => "xchacha20-blake2b",
            Self::XSalsa20Poly1305 => "xsalsa20-poly1305",
        }
    }

    pub(crate) fn ensure_usable(self, associated_data: &[u8]) -> Result<(), CryptoError> {
        if !self.available() {
            return Err(CryptoError::CryptographicLogic(format!(
                "{} is not available in this build",
                self
            )));
        }
        if !self.is_aead() && !associated_data.is_empty() {
            return Err(CryptoError::CryptographicLogic(format!(
                "{} does not support additional data",
                self
            )));
        }
        Ok(())
    }

    /// Encrypts `plaintext` under a fresh random nonce.
    ///
    /// # Errors
    ///
    /// `CryptographicLogic` if the algorithm is unavailable, or if associated
    /// data is passed to a non-AEAD algorithm.
    pub fn encrypt(
        self,
        key: &SharedKey,
        plaintext: &[u8],
        associated_data: &[u8],
    ) -> Result<EncryptedMessage, CryptoError> {
        self.ensure_usable(associated_data)?;

        let bytes = match self {
            #[cfg(feature = "aegis")]
            Self::Aegis256 => aegis256::encrypt(key, plaintext, associated_data)?,
            #[cfg(not(feature = "aegis"))]
            Self::Aegis256 => unreachable!("availability checked above"),
            Self::Aes256Gcm => aes256gcm::encrypt(key, plaintext, associated_data)?,
            Self::XChaCha20Poly1305 => {
                xchacha20poly1305::encrypt(key, plaintext, associated_data)?
            }
            Self::XChaCha20Blake2b => xchacha20blake2b::encrypt(key, plaintext, associated_data)?,
            Self::XSalsa20Poly1305 => xsalsa20poly1305::encrypt(key, plaintext)?,
        };

        Ok(EncryptedMessage {
            algorithm: self,
            bytes,
        })
    }

    /// Decrypts `nonce || ciphertext`.
    ///
    /// Returns `Ok(None)` when the input is not longer than the nonce, the
    /// key is wrong, the tag was tampered with, or the associated data does
    /// not match. Never returns partial plaintext.
    ///
    /// # Errors
    ///
    /// Same misuse conditions as [`SymmetricAlgorithm::encrypt`].
    pub fn decrypt(
        self,
        key: &SharedKey,
        ciphertext: &[u8],
        associated_data: &[u8],
    ) -> Result<Option<Zeroizing<Vec<u8>>>, CryptoError> {
        self.ensure_usable(associated_data)?;

        if ciphertext.len() <= self.nonce_bytes() {
            debug!(algorithm = %self, len = ciphertext.len(), "Ciphertext shorter than nonce");
            return Ok(None);
        }

        let result = match self {
            #[cfg(feature = "aegis")]
            Self::Aegis256 => aegis256::decrypt(key, ciphertext, associated_data),
            #[cfg(not(feature = "aegis"))]
            Self::Aegis256 => unreachable!("availability checked above"),
            Self::Aes256Gcm => aes256gcm::decrypt(key, ciphertext, associated_data),
            Self::XChaCha20Poly1305 => {
                xchacha20poly1305::decrypt(key, ciphertext, associated_data)
            }
            Self::XChaCha20Blake2b => xchacha20blake2b::decrypt(key, ciphertext, associated_data),
            Self::XSalsa20Poly1305 => xsalsa20poly1305::decrypt(key, ciphertext),
        };

        match result {
            Ok(plaintext) => Ok(Some(plaintext)),
            Err(CryptoError::DecryptionFailed(reason)) => {
                debug!(algorithm = %self, reason = %reason, "Ciphertext rejected");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl fmt::Display for SymmetricAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SymmetricAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.name() == s)
            .ok_or_else(|| CryptoError::InvalidInput(format!("unknown symmetric algorithm: {}", s)))
    }
}

/// Output of a symmetric encryption: algorithm tag plus `nonce || ciphertext`.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedMessage {
    algorithm: SymmetricAlgorithm,
    bytes: Vec<u8>,
}

impl EncryptedMessage {
    /// Wraps raw `nonce || ciphertext` bytes produced by `algorithm`.
    pub fn new(algorithm: SymmetricAlgorithm, bytes: Vec<u8>) -> Self {
        Self { algorithm, bytes }
    }

    /// Algorithm that produced this message.
    pub fn algorithm(&self) -> SymmetricAlgorithm {
        self.algorithm
    }

    /// Nonce portion (empty if the message is truncated).
    pub fn nonce(&self) -> &[u8] {
        let n = self.algorithm.nonce_bytes().min(self.bytes.len());
        &self.bytes[..n]
    }

    /// Ciphertext portion, including the tag.
    pub fn ciphertext(&self) -> &[u8] {
        let n = self.algorithm.nonce_bytes().min(self.bytes.len());
        &self.bytes[n..]
    }

    /// Raw `nonce || ciphertext` bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Total length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the message carries no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decrypts with the algorithm recorded in the message.
    pub fn decrypt(
        &self,
        key: &SharedKey,
        associated_data: &[u8],
    ) -> Result<Option<Zeroizing<Vec<u8>>>, CryptoError> {
        self.algorithm.decrypt(key, &self.bytes, associated_data)
    }
}

impl fmt::Debug for EncryptedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedMessage")
            .field("algorithm", &self.algorithm)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl fmt::Display for EncryptedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            ENVELOPE_PREFIX,
            self.algorithm,
            encode_b64url(&self.bytes)
        )
    }
}

impl FromStr for EncryptedMessage {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');

        let (Some(prefix), Some(algorithm), Some(payload)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(CryptoError::InvalidEncoding(
                "expected natrium:{algorithm}:{payload}".to_string(),
            ));
        };

        if prefix != ENVELOPE_PREFIX {
            return Err(CryptoError::InvalidEncoding(format!(
                "unexpected envelope prefix: {}",
                prefix
            )));
        }

        Ok(Self {
            algorithm: algorithm.parse()?,
            bytes: decode_b64url(payload)?,
        })
    }
}
