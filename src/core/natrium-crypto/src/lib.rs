//! # Natrium Crypto
//!
//! Core cryptographic primitives for Natrium.
//!
//! This crate provides low-level cryptographic operations including:
//! - Symmetric encryption (AEGIS-256, AES-256-GCM, XChaCha20-Poly1305,
//!   XChaCha20-BLAKE2b, XSalsa20-Poly1305)
//! - Public-key boxes, sealed boxes and multi-recipient envelopes (X25519)
//! - Digital signatures (Ed25519)
//! - Key derivation (HKDF-SHA256) and keyed BLAKE2b
//! - Pre-authentication encoding
//! - Secure random generation

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod asymmetric;
pub mod encoding;
pub mod error;
pub mod hash;
pub mod kdf;
pub mod keys;
pub mod pae;
pub mod random;
pub mod symmetric;

pub use asymmetric::{
    AsymmetricAlgorithm, EncapsulatedKey, EncryptedMessageBox, EncryptionKeyPair,
    EncryptionPublicKey, EncryptionSecretKey, MultiRecipientMessage, SealedMessageBox, Signature,
    SignatureKeyPair, SignaturePublicKey, SignatureSecretKey,
};
pub use error::{CryptoError, Result};
pub use keys::{KeyId, SharedKey, KEY_BYTES};
pub use pae::pae;
pub use symmetric::{EncryptedMessage, SymmetricAlgorithm};
