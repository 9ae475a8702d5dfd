//! Default algorithm selection.

use serde::{Deserialize, Serialize};

use natrium_crypto::{AsymmetricAlgorithm, SymmetricAlgorithm};
use natrium_paseto::Version;

/// Algorithms a [`crate::Natrium`] instance uses when the caller does not
/// name one.
///
/// Decryption always follows the algorithm recorded in the message; these
/// values only steer encryption and token issuance. The PASETO version is
/// also enforced on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Algorithm for `encrypt` and `encrypt_string`.
    pub symmetric: SymmetricAlgorithm,
    /// Algorithm for boxes, sealed boxes and multi-recipient envelopes.
    pub asymmetric: AsymmetricAlgorithm,
    /// Version for issued and accepted tokens.
    pub paseto_version: Version,
}

impl Defaults {
    /// Sets the symmetric algorithm.
    pub fn with_symmetric(mut self, algorithm: SymmetricAlgorithm) -> Self {
        self.symmetric = algorithm;
        self
    }

    /// Sets the asymmetric algorithm.
    pub fn with_asymmetric(mut self, algorithm: AsymmetricAlgorithm) -> Self {
        self.asymmetric = algorithm;
        self
    }

    /// Sets the PASETO version.
    pub fn with_paseto_version(mut self, version: Version) -> Self {
        self.paseto_version = version;
        self
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let defaults = Defaults::default();
        assert_eq!(defaults.symmetric, SymmetricAlgorithm::XChaCha20Poly1305);
        assert_eq!(
            defaults.asymmetric,
            AsymmetricAlgorithm::X25519XChaCha20Poly1305
        );
        assert_eq!(defaults.paseto_version, Version::V4);
    }

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let defaults: Defaults = serde_json::from_str(r#"{"paseto_version":"v2"}"#).unwrap();
        assert_eq!(defaults.paseto_version, Version::V2);
        assert_eq!(defaults.symmetric, SymmetricAlgorithm::default());
    }

    #[test]
    fn test_builder_methods() {
        let defaults = Defaults::default()
            .with_symmetric(SymmetricAlgorithm::Aes256Gcm)
            .with_asymmetric(AsymmetricAlgorithm::X25519XSalsa20Poly1305)
            .with_paseto_version(Version::V2);

        assert_eq!(defaults.symmetric, SymmetricAlgorithm::Aes256Gcm);
        assert_eq!(
            defaults.asymmetric,
            AsymmetricAlgorithm::X25519XSalsa20Poly1305
        );
        assert_eq!(defaults.paseto_version, Version::V2);
    }
}
