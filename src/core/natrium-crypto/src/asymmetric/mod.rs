//! Public-key primitives.
//!
//! - Authenticated boxes between two X25519 key pairs
//! - Anonymous sealed boxes to a public key
//! - Ed25519 detached signatures
//! - A multi-recipient envelope built from the two box kinds
//!
//! ## Box Key
//!
//! ```text
//! shared  = X25519(own_secret, peer_public)
//! box_key = HKDF-SHA256(ikm = shared,
//!                       salt = sender_public || recipient_public,
//!                       info = PAE("natrium-box-v1", algorithm))
//! ```
//!
//! The payload is then encrypted with the symmetric half of the
//! [`AsymmetricAlgorithm`]. Shared secrets from low-order points are rejected.

pub mod envelope;
pub mod keys;
pub mod signature;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

pub use envelope::{EncapsulatedKey, MultiRecipientMessage};
pub use keys::{
    EncryptionKeyPair, EncryptionPublicKey, EncryptionSecretKey, SignatureKeyPair,
    SignaturePublicKey, SignatureSecretKey, PUBLIC_KEY_BYTES, SECRET_KEY_BYTES,
};
pub use signature::{sign, verify, Signature, SIGNATURE_BYTES};

use crate::error::CryptoError;
use crate::kdf::derive_array;
use crate::keys::{SharedKey, KEY_BYTES};
use crate::pae::pae;
use crate::symmetric::{EncryptedMessage, SymmetricAlgorithm};

const BOX_INFO: &[u8] = b"natrium-box-v1";

/// X25519 key agreement paired with a symmetric algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AsymmetricAlgorithm {
    /// X25519 + AEGIS-256.
    #[serde(rename = "x25519-aegis-256")]
    X25519Aegis256,
    /// X25519 + AES-256-GCM.
    #[serde(rename = "x25519-aes-256-gcm")]
    X25519Aes256Gcm,
    /// X25519 + XChaCha20-Poly1305 (default).
    #[default]
    #[serde(rename = "x25519-xchacha20-poly1305")]
    X25519XChaCha20Poly1305,
    /// X25519 + XChaCha20-BLAKE2b.
    #[serde(rename = "x25519-xchacha20-blake2b")]
    X25519XChaCha20Blake2b,
    /// X25519 + XSalsa20-Poly1305 (NaCl `box`). No associated data.
    #[serde(rename = "x25519-xsalsa20-poly1305")]
    X25519XSalsa20Poly1305,
}

impl AsymmetricAlgorithm {
    /// Every variant, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::X25519Aegis256,
        Self::X25519Aes256Gcm,
        Self::X25519XChaCha20Poly1305,
        Self::X25519XChaCha20Blake2b,
        Self::X25519XSalsa20Poly1305,
    ];

    /// Symmetric algorithm that encrypts the payload.
    pub const fn symmetric(self) -> SymmetricAlgorithm {
        match self {
            Self::X25519Aegis256 => SymmetricAlgorithm::Aegis256,
            Self::X25519Aes256Gcm => SymmetricAlgorithm::Aes256Gcm,
            Self::X25519XChaCha20Poly1305 => SymmetricAlgorithm::XChaCha20Poly1305,
            Self::X25519XChaCha20Blake2b => SymmetricAlgorithm::XChaCha20Blake2b,
            Self::X25519XSalsa20Poly1305 => SymmetricAlgorithm::XSalsa20Poly1305,
        }
    }

    /// Pairs X25519 with `symmetric`.
    pub const fn with_symmetric(symmetric: SymmetricAlgorithm) -> Self {
        match symmetric {
            SymmetricAlgorithm::Aegis256 => Self::X25519Aegis256,
            SymmetricAlgorithm::Aes256Gcm => Self::X25519Aes256Gcm,
            SymmetricAlgorithm::XChaCha20Poly1305 => Self::X25519XChaCha20Poly1305,
            SymmetricAlgorithm::XChaCha20Blake2b => Self::X25519XChaCha20Blake2b,
            SymmetricAlgorithm::XSalsa20Poly1305 => Self::X25519XSalsa20Poly1305,
        }
    }

    /// Whether the payload cipher binds associated data.
    pub const fn is_aead(self) -> bool {
        self.symmetric().is_aead()
    }

    /// Whether the payload cipher is compiled into this build.
    pub const fn available(self) -> bool {
        self.symmetric().available()
    }

    /// Stable name used in configuration.
    pub const fn name(self) -> &'static str {
        match self {
            Self::X25519Aegis256 => "x25519-aegis-256",
            Self::X25519Aes256Gcm => "x25519-aes-256-gcm",
            Self::X25519XChaCha20Poly1305 => "x25519-xchacha20-poly1305",
            Self::X25519XChaCha20Blake2b => "x25519-xchacha20-blake2b",
            Self::X25519XSalsa20Poly1305 => "x25519-xsalsa20-poly1305",
        }
    }
}

impl fmt::Display for AsymmetricAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AsymmetricAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|alg| alg.name() == s).ok_or_else(|| {
            CryptoError::InvalidInput(format!("unknown asymmetric algorithm: {}", s))
        })
    }
}

/// Box from one key pair to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedMessageBox {
    algorithm: AsymmetricAlgorithm,
    message: EncryptedMessage,
}

impl EncryptedMessageBox {
    /// Wraps raw `nonce || ciphertext` bytes produced under `algorithm`.
    pub fn new(algorithm: AsymmetricAlgorithm, bytes: Vec<u8>) -> Self {
        Self {
            algorithm,
            message: EncryptedMessage::new(algorithm.symmetric(), bytes),
        }
    }

    /// Algorithm that produced this box.
    pub fn algorithm(&self) -> AsymmetricAlgorithm {
        self.algorithm
    }

    /// Encrypted payload.
    pub fn message(&self) -> &EncryptedMessage {
        &self.message
    }
}

/// Anonymous box: carries the ephemeral public key of its sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedMessageBox {
    algorithm: AsymmetricAlgorithm,
    ephemeral: EncryptionPublicKey,
    message: EncryptedMessage,
}

impl SealedMessageBox {
    /// Reassembles a sealed box from its parts.
    pub fn new(
        algorithm: AsymmetricAlgorithm,
        ephemeral: EncryptionPublicKey,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            algorithm,
            ephemeral,
            message: EncryptedMessage::new(algorithm.symmetric(), bytes),
        }
    }

    /// Algorithm that produced this box.
    pub fn algorithm(&self) -> AsymmetricAlgorithm {
        self.algorithm
    }

    /// Ephemeral sender public key.
    pub fn ephemeral_key(&self) -> &EncryptionPublicKey {
        &self.ephemeral
    }

    /// Encrypted payload.
    pub fn message(&self) -> &EncryptedMessage {
        &self.message
    }
}

/// Derives the box key, or `None` if the shared secret is non-contributory.
fn box_key(
    algorithm: AsymmetricAlgorithm,
    own_secret: &EncryptionSecretKey,
    peer_public: &EncryptionPublicKey,
    sender_public: &EncryptionPublicKey,
    recipient_public: &EncryptionPublicKey,
) -> Result<Option<SharedKey>, CryptoError> {
    let shared = own_secret
        .static_secret()
        .diffie_hellman(&peer_public.to_dalek());

    if !shared.was_contributory() {
        return Ok(None);
    }

    let mut salt = [0u8; 2 * PUBLIC_KEY_BYTES];
    salt[..PUBLIC_KEY_BYTES].copy_from_slice(sender_public.as_bytes());
    salt[PUBLIC_KEY_BYTES..].copy_from_slice(recipient_public.as_bytes());

    let info = pae(&[BOX_INFO, algorithm.name().as_bytes()]);
    let key = derive_array::<KEY_BYTES>(shared.as_bytes(), Some(&salt), &info)?;

    Ok(Some(SharedKey::from_array(&key)))
}

fn non_contributory() -> CryptoError {
    CryptoError::InvalidKey("public key yields a non-contributory shared secret".to_string())
}

/// Encrypts `plaintext` from `sender` to `recipient`.
///
/// # Errors
///
/// `InvalidKey` if `recipient` is a low-order point, plus the symmetric
/// misuse errors of [`SymmetricAlgorithm::encrypt`].
pub fn encrypt(
    algorithm: AsymmetricAlgorithm,
    sender: &EncryptionKeyPair,
    recipient: &EncryptionPublicKey,
    plaintext: &[u8],
    associated_data: &[u8],
) -> Result<EncryptedMessageBox, CryptoError> {
    algorithm.symmetric().ensure_usable(associated_data)?;

    let key = box_key(
        algorithm,
        sender.secret(),
        recipient,
        sender.public(),
        recipient,
    )?
    .ok_or_else(non_contributory)?;

    let message = algorithm
        .symmetric()
        .encrypt(&key, plaintext, associated_data)?;

    Ok(EncryptedMessageBox { algorithm, message })
}

/// Opens a box sent by `sender` to `recipient`.
///
/// Returns `Ok(None)` when the box does not authenticate.
pub fn decrypt(
    recipient: &EncryptionKeyPair,
    sender: &EncryptionPublicKey,
    message_box: &EncryptedMessageBox,
    associated_data: &[u8],
) -> Result<Option<Zeroizing<Vec<u8>>>, CryptoError> {
    let algorithm = message_box.algorithm;
    algorithm.symmetric().ensure_usable(associated_data)?;

    let Some(key) = box_key(
        algorithm,
        recipient.secret(),
        sender,
        sender,
        recipient.public(),
    )?
    else {
        debug!(algorithm = %algorithm, "Rejected non-contributory sender key");
        return Ok(None);
    };

    message_box.message.decrypt(&key, associated_data)
}

/// Encrypts `plaintext` to `recipient` under a fresh ephemeral key pair.
pub fn seal(
    algorithm: AsymmetricAlgorithm,
    recipient: &EncryptionPublicKey,
    plaintext: &[u8],
) -> Result<SealedMessageBox, CryptoError> {
    algorithm.symmetric().ensure_usable(&[])?;

    let ephemeral = EncryptionKeyPair::generate();
    let key = box_key(
        algorithm,
        ephemeral.secret(),
        recipient,
        ephemeral.public(),
        recipient,
    )?
    .ok_or_else(non_contributory)?;

    let message = algorithm.symmetric().encrypt(&key, plaintext, &[])?;

    Ok(SealedMessageBox {
        algorithm,
        ephemeral: *ephemeral.public(),
        message,
    })
}

/// Opens a sealed box addressed to `recipient`.
pub fn unseal(
    recipient: &EncryptionKeyPair,
    sealed: &SealedMessageBox,
) -> Result<Option<Zeroizing<Vec<u8>>>, CryptoError> {
    let algorithm = sealed.algorithm;
    algorithm.symmetric().ensure_usable(&[])?;

    let Some(key) = box_key(
        algorithm,
        recipient.secret(),
        &sealed.ephemeral,
        &sealed.ephemeral,
        recipient.public(),
    )?
    else {
        debug!(algorithm = %algorithm, "Rejected non-contributory ephemeral key");
        return Ok(None);
    };

    sealed.message.decrypt(&key, &[])
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    fn usable() -> impl Iterator<Item = AsymmetricAlgorithm> {
        AsymmetricAlgorithm::ALL.into_iter().filter(|a| a.available())
    }

    #[test]
    fn test_box_roundtrip_all_algorithms() {
        let alice = EncryptionKeyPair::generate();
        let bob = EncryptionKeyPair::generate();

        for alg in usable() {
            let ad: &[u8] = if alg.is_aead() { b"header" } else { b"" };
            let sealed = encrypt(alg, &alice, bob.public(), b"hi bob", ad).unwrap();
            let opened = decrypt(&bob, alice.public(), &sealed, ad).unwrap().unwrap();
            assert_eq!(&*opened, b"hi bob", "{}", alg);
        }
    }

    #[test]
    fn test_box_key_agreement_is_symmetric() {
        let alice = EncryptionKeyPair::generate();
        let bob = EncryptionKeyPair::generate();
        let alg = AsymmetricAlgorithm::default();

        let key_a = box_key(alg, alice.secret(), bob.public(), alice.public(), bob.public())
            .unwrap()
            .unwrap();
        let key_b = box_key(alg, bob.secret(), alice.public(), alice.public(), bob.public())
            .unwrap()
            .unwrap();
        assert_eq!(key_a, key_b);

        let message_box = encrypt(alg, &alice, bob.public(), b"note", b"").unwrap();
        let rebuilt = EncryptedMessageBox::new(alg, message_box.message().as_bytes().to_vec());
        assert_eq!(rebuilt, message_box);
        assert!(decrypt(&bob, alice.public(), &rebuilt, b"").unwrap().is_some());
    }

    #[test]
    fn test_box_wrong_sender_returns_none() {
        let alice = EncryptionKeyPair::generate();
        let bob = EncryptionKeyPair::generate();
        let mallory = EncryptionKeyPair::generate();
        let alg = AsymmetricAlgorithm::X25519Aes256Gcm;

        let message_box = encrypt(alg, &alice, bob.public(), b"secret", b"").unwrap();
        assert!(decrypt(&bob, mallory.public(), &message_box, b"")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_box_ad_mismatch_returns_none() {
        let alice = EncryptionKeyPair::generate();
        let bob = EncryptionKeyPair::generate();
        let alg = AsymmetricAlgorithm::X25519XChaCha20Blake2b;

        let message_box = encrypt(alg, &alice, bob.public(), b"secret", b"a").unwrap();
        assert!(decrypt(&bob, alice.public(), &message_box, b"b")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_low_order_point_rejected() {
        let alice = EncryptionKeyPair::generate();
        let bob = EncryptionKeyPair::generate();
        let identity = EncryptionPublicKey::from_bytes(&[0u8; 32]).unwrap();
        let alg = AsymmetricAlgorithm::default();

        assert!(matches!(
            encrypt(alg, &alice, &identity, b"m", b""),
            Err(CryptoError::InvalidKey(_))
        ));
        assert!(matches!(
            seal(alg, &identity, b"m"),
            Err(CryptoError::InvalidKey(_))
        ));

        let message_box = encrypt(alg, &alice, bob.public(), b"m", b"").unwrap();
        assert!(decrypt(&bob, &identity, &message_box, b"").unwrap().is_none());
    }

    #[test]
    fn test_non_aead_box_rejects_associated_data() {
        let alice = EncryptionKeyPair::generate();
        let bob = EncryptionKeyPair::generate();
        let alg = AsymmetricAlgorithm::X25519XSalsa20Poly1305;

        assert!(matches!(
            encrypt(alg, &alice, bob.public(), b"m", b"ad"),
            Err(CryptoError::CryptographicLogic(_))
        ));

        let message_box = encrypt(alg, &alice, bob.public(), b"m", b"").unwrap();
        assert!(matches!(
            decrypt(&bob, alice.public(), &message_box, b"ad"),
            Err(CryptoError::CryptographicLogic(_))
        ));
    }

    #[test]
    fn test_seal_unseal() {
        let bob = EncryptionKeyPair::generate();

        for alg in usable() {
            let sealed = seal(alg, bob.public(), b"anonymous").unwrap();
            assert_eq!(&*unseal(&bob, &sealed).unwrap().unwrap(), b"anonymous", "{}", alg);
        }
    }

    #[test]
    fn test_seal_uses_fresh_ephemeral_keys() {
        let bob = EncryptionKeyPair::generate();
        let a = seal(AsymmetricAlgorithm::default(), bob.public(), b"m").unwrap();
        let b = seal(AsymmetricAlgorithm::default(), bob.public(), b"m").unwrap();
        assert_ne!(a.ephemeral_key(), b.ephemeral_key());
    }

    #[test]
    fn test_unseal_wrong_recipient_returns_none() {
        let bob = EncryptionKeyPair::generate();
        let eve = EncryptionKeyPair::generate();

        let sealed = seal(AsymmetricAlgorithm::default(), bob.public(), b"m").unwrap();
        assert!(unseal(&eve, &sealed).unwrap().is_none());
    }

    #[test]
    fn test_algorithm_names_roundtrip() {
        for alg in AsymmetricAlgorithm::ALL {
            assert_eq!(alg.name().parse::<AsymmetricAlgorithm>().unwrap(), alg);
            assert_eq!(AsymmetricAlgorithm::with_symmetric(alg.symmetric()), alg);
        }
    }
}
