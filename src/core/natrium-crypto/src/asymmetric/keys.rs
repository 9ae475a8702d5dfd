//! X25519 and Ed25519 key types.
//!
//! Secret halves are zeroized on drop and never `Clone`. A key pair always
//! holds `public = f(secret)`: the only way to build one from two halves is
//! [`EncryptionKeyPair::from_parts`] / [`SignatureKeyPair::from_parts`],
//! which recompute the public half and reject a mismatch.

use ed25519_dalek::{SigningKey, VerifyingKey};
use subtle::ConstantTimeEq;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::encoding;
use crate::error::CryptoError;
use crate::keys::KeyId;
use crate::random::secret_array;

/// Size of an X25519 or Ed25519 public key in bytes.
pub const PUBLIC_KEY_BYTES: usize = 32;

/// Size of an X25519 secret or Ed25519 seed in bytes.
pub const SECRET_KEY_BYTES: usize = 32;

fn to_array(bytes: &[u8], what: &str) -> Result<[u8; 32], CryptoError> {
    bytes.try_into().map_err(|_| {
        CryptoError::InvalidKey(format!(
            "{} must be {} bytes, got {}",
            what,
            SECRET_KEY_BYTES,
            bytes.len()
        ))
    })
}

macro_rules! public_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy)]
        pub struct $name {
            bytes: [u8; PUBLIC_KEY_BYTES],
        }

        impl $name {
            /// Creates a public key from raw bytes.
            pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
                Ok(Self {
                    bytes: to_array(bytes, stringify!($name))?,
                })
            }

            /// Returns the raw key bytes.
            pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_BYTES] {
                &self.bytes
            }

            /// Identifier of this key.
            pub fn key_id(&self) -> KeyId {
                KeyId::of(&self.bytes)
            }

            /// Exports the key as standard base64.
            pub fn export(&self) -> String {
                encoding::encode_b64(&self.bytes)
            }

            /// Imports a key exported with `export`.
            pub fn import(encoded: &str) -> Result<Self, CryptoError> {
                let bytes = encoding::decode_b64_exact::<PUBLIC_KEY_BYTES>(encoded)?;
                Ok(Self { bytes: *bytes })
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.bytes.ct_eq(&other.bytes).into()
            }
        }

        impl Eq for $name {}

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(self.bytes))
            }
        }
    };
}

macro_rules! secret_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Zeroize, ZeroizeOnDrop)]
        pub struct $name {
            bytes: [u8; SECRET_KEY_BYTES],
        }

        impl $name {
            /// Creates a secret key from raw bytes.
            pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
                Ok(Self {
                    bytes: to_array(bytes, stringify!($name))?,
                })
            }

            /// Returns the raw secret bytes.
            pub fn as_bytes(&self) -> &[u8; SECRET_KEY_BYTES] {
                &self.bytes
            }

            /// Exports the secret as standard base64.
            pub fn export(&self) -> Zeroizing<String> {
                encoding::encode_b64_secret(&self.bytes)
            }

            /// Imports a secret exported with `export`.
            pub fn import(encoded: &str) -> Result<Self, CryptoError> {
                let bytes = encoding::decode_b64_exact::<SECRET_KEY_BYTES>(encoded)?;
                Ok(Self { bytes: *bytes })
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.bytes.ct_eq(&other.bytes).into()
            }
        }

        impl Eq for $name {}

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}([REDACTED])", stringify!($name))
            }
        }
    };
}

public_key!(
    /// X25519 public key.
    EncryptionPublicKey
);

secret_key!(
    /// X25519 secret scalar.
    EncryptionSecretKey
);

public_key!(
    /// Ed25519 verifying key.
    SignaturePublicKey
);

secret_key!(
    /// Ed25519 secret seed.
    SignatureSecretKey
);

impl EncryptionSecretKey {
    /// Computes the matching public key.
    pub fn public_key(&self) -> EncryptionPublicKey {
        let secret = StaticSecret::from(self.bytes);
        EncryptionPublicKey {
            bytes: PublicKey::from(&secret).to_bytes(),
        }
    }

    pub(crate) fn static_secret(&self) -> StaticSecret {
        StaticSecret::from(self.bytes)
    }
}

impl EncryptionPublicKey {
    pub(crate) fn to_dalek(self) -> PublicKey {
        PublicKey::from(self.bytes)
    }
}

impl SignatureSecretKey {
    /// Computes the matching verifying key.
    pub fn public_key(&self) -> SignaturePublicKey {
        SignaturePublicKey {
            bytes: self.signing_key().verifying_key().to_bytes(),
        }
    }

    pub(crate) fn signing_key(&self) -> SigningKey {
        SigningKey::from_bytes(&self.bytes)
    }
}

impl SignaturePublicKey {
    pub(crate) fn verifying_key(&self) -> Result<VerifyingKey, CryptoError> {
        VerifyingKey::from_bytes(&self.bytes)
            .map_err(|e| CryptoError::InvalidKey(format!("not an Ed25519 point: {}", e)))
    }
}

macro_rules! key_pair {
    ($(#[$meta:meta])* $name:ident, $secret:ident, $public:ident) => {
        $(#[$meta])*
        pub struct $name {
            secret: $secret,
            public: $public,
        }

        impl $name {
            /// Generates a new random key pair.
            pub fn generate() -> Self {
                Self::from_seed(&secret_array())
            }

            /// Deterministically builds a key pair from a 32-byte seed.
            pub fn from_seed(seed: &[u8; SECRET_KEY_BYTES]) -> Self {
                Self::from_secret($secret { bytes: *seed })
            }

            /// Builds the pair belonging to `secret`.
            pub fn from_secret(secret: $secret) -> Self {
                let public = secret.public_key();
                Self { secret, public }
            }

            /// Builds a pair from both halves.
            ///
            /// # Errors
            ///
            /// `InvalidKeyPair` if `public` is not the public half of `secret`.
            pub fn from_parts(secret: $secret, public: $public) -> Result<Self, CryptoError> {
                let pair = Self::from_secret(secret);
                if pair.public != public {
                    return Err(CryptoError::InvalidKeyPair(
                        "public key does not match secret key".to_string(),
                    ));
                }
                Ok(pair)
            }

            /// Secret half.
            pub fn secret(&self) -> &$secret {
                &self.secret
            }

            /// Public half.
            pub fn public(&self) -> &$public {
                &self.public
            }

            /// Identifier of the public half.
            pub fn key_id(&self) -> KeyId {
                self.public.key_id()
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("public", &self.public)
                    .field("secret", &"[REDACTED]")
                    .finish()
            }
        }
    };
}

key_pair!(
    /// X25519 key pair used for boxes and sealed boxes.
    EncryptionKeyPair,
    EncryptionSecretKey,
    EncryptionPublicKey
);

key_pair!(
    /// Ed25519 key pair used for detached signatures and public tokens.
    SignatureKeyPair,
    SignatureSecretKey,
    SignaturePublicKey
);

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_from_seed_is_deterministic() {
        let seed = [7u8; 32];
        assert_eq!(
            EncryptionKeyPair::from_seed(&seed).public(),
            EncryptionKeyPair::from_seed(&seed).public()
        );
        assert_eq!(
            SignatureKeyPair::from_seed(&seed).public(),
            SignatureKeyPair::from_seed(&seed).public()
        );
    }

    #[test]
    fn test_ed25519_public_from_seed() {
        let seed: [u8; 32] =
            hex::decode("b4cbfb43df4ce210727d953e4a713307fa19bb7d9f85041438d9e11b942a3774")
                .unwrap()
                .try_into()
                .unwrap();
        let pair = SignatureKeyPair::from_seed(&seed);
        assert_eq!(
            hex::encode(pair.public().as_bytes()),
            "1eb9dbbbbc047c03fd70604e0071f0987e16b28b757225c11f00415d0e20b1a2"
        );
    }

    #[test]
    fn test_from_parts_accepts_matching_halves() {
        let pair = SignatureKeyPair::generate();
        let secret = SignatureSecretKey::from_bytes(pair.secret().as_bytes()).unwrap();
        let rebuilt = SignatureKeyPair::from_parts(secret, *pair.public()).unwrap();
        assert_eq!(rebuilt.public(), pair.public());
    }

    #[test]
    fn test_from_parts_rejects_mismatch() {
        let a = EncryptionKeyPair::generate();
        let b = EncryptionKeyPair::generate();
        let secret = EncryptionSecretKey::from_bytes(a.secret().as_bytes()).unwrap();

        let result = EncryptionKeyPair::from_parts(secret, *b.public());
        assert!(matches!(result, Err(CryptoError::InvalidKeyPair(_))));
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(matches!(
            EncryptionPublicKey::from_bytes(&[0u8; 31]),
            Err(CryptoError::InvalidKey(_))
        ));
        assert!(matches!(
            SignatureSecretKey::from_bytes(&[0u8; 33]),
            Err(CryptoError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_export_import() {
        let pair = EncryptionKeyPair::generate();
        let secret = EncryptionSecretKey::import(&pair.secret().export()).unwrap();
        assert_eq!(&secret, pair.secret());

        let public = EncryptionPublicKey::import(&pair.public().export()).unwrap();
        assert_eq!(&public, pair.public());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let pair = SignatureKeyPair::from_seed(&[0xabu8; 32]);
        let debug = format!("{:?}", pair);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(&hex::encode(pair.secret().as_bytes())));
    }

    #[test]
    fn test_key_id_matches_public_key() {
        let pair = SignatureKeyPair::generate();
        assert_eq!(pair.key_id(), KeyId::of(pair.public().as_bytes()));
    }
}
