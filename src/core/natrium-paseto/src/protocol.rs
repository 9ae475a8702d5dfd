//! Version dispatch for the four token operations.

use tracing::debug;

use natrium_crypto::{SharedKey, SignatureKeyPair, SignaturePublicKey};

use crate::error::PasetoError;
use crate::token::{Paseto, PasetoMessage, Purpose, Version};
use crate::{v2, v4};

impl Version {
    fn ensure_supported(self, implicit: &[u8]) -> Result<(), PasetoError> {
        if !self.is_supported() {
            return Err(PasetoError::UnsupportedVersion(self.to_string()));
        }
        if !implicit.is_empty() && !self.supports_implicit_assertions() {
            return Err(PasetoError::ImplicitAssertion(self));
        }
        Ok(())
    }

    fn ensure_matches(self, token: &Paseto, purpose: Purpose) -> Result<(), PasetoError> {
        if token.version() != self {
            debug!(expected = %self, found = %token.version(), "Token version mismatch");
            return Err(PasetoError::VersionMismatch {
                expected: self,
                found: token.version(),
            });
        }
        if token.purpose() != purpose {
            debug!(expected = %purpose, found = %token.purpose(), "Token purpose mismatch");
            return Err(PasetoError::PurposeMismatch {
                expected: purpose.to_string(),
                found: token.purpose().to_string(),
            });
        }
        Ok(())
    }

    /// Builds a `local` token.
    pub fn encrypt(
        self,
        key: &SharedKey,
        message: &[u8],
        footer: &[u8],
        implicit: &[u8],
    ) -> Result<Paseto, PasetoError> {
        self.ensure_supported(implicit)?;

        let body = match self {
            Self::V2 => v2::encrypt(key, message, footer)?,
            Self::V4 => v4::encrypt(key, message, footer, implicit)?,
            Self::V3 => return Err(PasetoError::UnsupportedVersion(self.to_string())),
        };

        debug!(version = %self, footer_len = footer.len(), "Local token built");
        Ok(Paseto::new(self, Purpose::Local, body, footer.to_vec()))
    }

    /// Opens a `local` token produced by this version.
    pub fn decrypt(
        self,
        key: &SharedKey,
        token: &Paseto,
        implicit: &[u8],
    ) -> Result<PasetoMessage, PasetoError> {
        self.ensure_supported(implicit)?;
        self.ensure_matches(token, Purpose::Local)?;

        let payload = match self {
            Self::V2 => v2::decrypt(key, token.body(), token.footer()),
            Self::V4 => v4::decrypt(key, token.body(), token.footer(), implicit),
            Self::V3 => return Err(PasetoError::UnsupportedVersion(self.to_string())),
        }
        .inspect_err(|e| debug!(version = %self, error = %e, "Local token rejected"))?;

        Ok(PasetoMessage::new(payload, token.footer().to_vec()))
    }

    /// Builds a `public` token.
    pub fn sign(
        self,
        key_pair: &SignatureKeyPair,
        message: &[u8],
        footer: &[u8],
        implicit: &[u8],
    ) -> Result<Paseto, PasetoError> {
        self.ensure_supported(implicit)?;

        let body = match self {
            Self::V2 => v2::sign(key_pair, message, footer),
            Self::V4 => v4::sign(key_pair, message, footer, implicit),
            Self::V3 => return Err(PasetoError::UnsupportedVersion(self.to_string())),
        };

        debug!(version = %self, key_id = %key_pair.key_id().to_hex(), "Public token signed");
        Ok(Paseto::new(self, Purpose::Public, body, footer.to_vec()))
    }

    /// Verifies a `public` token produced by this version.
    pub fn verify(
        self,
        public_key: &SignaturePublicKey,
        token: &Paseto,
        implicit: &[u8],
    ) -> Result<PasetoMessage, PasetoError> {
        self.ensure_supported(implicit)?;
        self.ensure_matches(token, Purpose::Public)?;

        let payload = match self {
            Self::V2 => v2::verify(public_key, token.body(), token.footer()),
            Self::V4 => v4::verify(public_key, token.body(), token.footer(), implicit),
            Self::V3 => return Err(PasetoError::UnsupportedVersion(self.to_string())),
        }
        .inspect_err(|e| debug!(version = %self, error = %e, "Public token rejected"))?;

        Ok(PasetoMessage::new(payload.into(), token.footer().to_vec()))
    }
}
