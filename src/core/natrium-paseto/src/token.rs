//! Token wire format.
//!
//! ```text
//! <version>.<purpose>.<base64url(payload)>[.<base64url(footer)>]
//! ```
//!
//! Segments are base64url without padding and must decode canonically. An
//! empty footer is omitted, never encoded as a trailing empty segment.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use natrium_crypto::encoding::{decode_b64url, encode_b64url};

use crate::claims::{PasetoFooterClaims, PasetoPayloadClaims};
use crate::error::PasetoError;

/// Protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Version {
    /// XChaCha20-Poly1305 / Ed25519.
    #[serde(rename = "v2")]
    V2,
    /// NIST suite. Recognised on the wire but not implemented.
    #[serde(rename = "v3")]
    V3,
    /// XChaCha20 + BLAKE2b / Ed25519.
    #[default]
    #[serde(rename = "v4")]
    V4,
}

impl Version {
    /// Every variant, in declaration order.
    pub const ALL: [Self; 3] = [Self::V2, Self::V3, Self::V4];

    /// Header segment, e.g. `v4`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V2 => "v2",
            Self::V3 => "v3",
            Self::V4 => "v4",
        }
    }

    /// Whether the version is implemented.
    pub const fn is_supported(self) -> bool {
        !matches!(self, Self::V3)
    }

    /// Whether the version binds implicit assertions.
    pub const fn supports_implicit_assertions(self) -> bool {
        matches!(self, Self::V3 | Self::V4)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Version {
    type Err = PasetoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v2" => Ok(Self::V2),
            "v3" => Ok(Self::V3),
            "v4" => Ok(Self::V4),
            "v1" => Err(PasetoError::UnsupportedVersion(s.to_string())),
            _ => Err(PasetoError::MalformedToken(format!("unknown version: {}", s))),
        }
    }
}

/// Token purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    /// Symmetric authenticated encryption.
    Local,
    /// Public-key signature, payload in clear.
    Public,
}

impl Purpose {
    /// Header segment.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Public => "public",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Purpose {
    type Err = PasetoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "public" => Ok(Self::Public),
            _ => Err(PasetoError::MalformedToken(format!("unknown purpose: {}", s))),
        }
    }
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, PasetoError> {
    decode_b64url(segment).map_err(|e| PasetoError::InvalidEncoding(e.to_string()))
}

/// A token on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paseto {
    version: Version,
    purpose: Purpose,
    body: Vec<u8>,
    footer: Vec<u8>,
}

impl Paseto {
    /// Assembles a token from its decoded parts.
    pub fn new(version: Version, purpose: Purpose, body: Vec<u8>, footer: Vec<u8>) -> Self {
        Self {
            version,
            purpose,
            body,
            footer,
        }
    }

    /// Protocol version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Token purpose.
    pub fn purpose(&self) -> Purpose {
        self.purpose
    }

    /// Decoded body: ciphertext for local tokens, message and signature for
    /// public ones.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Decoded footer. Unauthenticated until the token is opened.
    pub fn footer(&self) -> &[u8] {
        &self.footer
    }

    /// Footer decoded as claims, without verifying the token.
    ///
    /// Returns `Ok(None)` when the footer is empty.
    pub fn untrusted_footer_claims(&self) -> Result<Option<PasetoFooterClaims>, PasetoError> {
        PasetoFooterClaims::from_footer(&self.footer)
    }
}

impl fmt::Display for Paseto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.version,
            self.purpose,
            encode_b64url(&self.body)
        )?;
        if !self.footer.is_empty() {
            write!(f, ".{}", encode_b64url(&self.footer))?;
        }
        Ok(())
    }
}

impl FromStr for Paseto {
    type Err = PasetoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();

        let (version, purpose, body, footer) = match parts.as_slice() {
            [version, purpose, body] => (*version, *purpose, *body, None),
            [version, purpose, body, footer] => (*version, *purpose, *body, Some(*footer)),
            _ => {
                return Err(PasetoError::MalformedToken(format!(
                    "expected 3 or 4 segments, found {}",
                    parts.len()
                )))
            }
        };

        let version: Version = version.parse()?;
        let purpose: Purpose = purpose.parse()?;

        if body.is_empty() {
            return Err(PasetoError::MalformedToken("empty payload".to_string()));
        }

        let footer = match footer {
            Some("") => {
                return Err(PasetoError::MalformedToken(
                    "empty footer segment".to_string(),
                ))
            }
            Some(footer) => decode_segment(footer)?,
            None => Vec::new(),
        };

        Ok(Self {
            version,
            purpose,
            body: decode_segment(body)?,
            footer,
        })
    }
}

/// An opened token: authenticated payload plus footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasetoMessage {
    payload: Zeroizing<Vec<u8>>,
    footer: Vec<u8>,
}

impl PasetoMessage {
    pub(crate) fn new(payload: Zeroizing<Vec<u8>>, footer: Vec<u8>) -> Self {
        Self { payload, footer }
    }

    /// Authenticated payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Authenticated footer bytes.
    pub fn footer(&self) -> &[u8] {
        &self.footer
    }

    /// Decodes the payload as claims.
    pub fn claims(&self) -> Result<PasetoPayloadClaims, PasetoError> {
        PasetoPayloadClaims::from_json(&self.payload)
    }

    /// Decodes the footer as claims; `None` when the footer is empty.
    pub fn footer_claims(&self) -> Result<Option<PasetoFooterClaims>, PasetoError> {
        PasetoFooterClaims::from_footer(&self.footer)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_display_parse_roundtrip() {
        let token = Paseto::new(Version::V4, Purpose::Local, b"body".to_vec(), b"foot".to_vec());
        let text = token.to_string();

        assert_eq!(text, "v4.local.Ym9keQ.Zm9vdA");
        assert_eq!(text.parse::<Paseto>().unwrap(), token);
    }

    #[test]
    fn test_empty_footer_is_omitted() {
        let token = Paseto::new(Version::V2, Purpose::Public, b"body".to_vec(), Vec::new());
        assert_eq!(token.to_string(), "v2.public.Ym9keQ");
    }

    #[test]
    fn test_rejects_wrong_segment_count() {
        for input in ["", "v4", "v4.local", "v4.local.a.b.c"] {
            assert!(matches!(
                input.parse::<Paseto>(),
                Err(PasetoError::MalformedToken(_))
            ));
        }
    }

    #[test]
    fn test_rejects_unknown_header() {
        assert!(matches!(
            "v9.local.Ym9keQ".parse::<Paseto>(),
            Err(PasetoError::MalformedToken(_))
        ));
        assert!(matches!(
            "v4.secret.Ym9keQ".parse::<Paseto>(),
            Err(PasetoError::MalformedToken(_))
        ));
        assert!(matches!(
            "v1.local.Ym9keQ".parse::<Paseto>(),
            Err(PasetoError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_rejects_empty_segments() {
        assert!("v4.local.".parse::<Paseto>().is_err());
        assert!("v4.local.Ym9keQ.".parse::<Paseto>().is_err());
    }

    #[test]
    fn test_rejects_non_canonical_base64() {
        assert!(matches!(
            "v4.local.Ym9keQ==".parse::<Paseto>(),
            Err(PasetoError::InvalidEncoding(_))
        ));
        assert!(matches!(
            "v4.local.Ym9ke+".parse::<Paseto>(),
            Err(PasetoError::InvalidEncoding(_))
        ));
        assert!(matches!(
            "v4.local.Ym9keR".parse::<Paseto>(),
            Err(PasetoError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_v3_parses_but_is_unsupported() {
        let token: Paseto = "v3.local.Ym9keQ".parse().unwrap();
        assert_eq!(token.version(), Version::V3);
        assert!(!token.version().is_supported());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn version() -> impl Strategy<Value = Version> {
            prop_oneof![Just(Version::V2), Just(Version::V3), Just(Version::V4)]
        }

        fn purpose() -> impl Strategy<Value = Purpose> {
            prop_oneof![Just(Purpose::Local), Just(Purpose::Public)]
        }

        proptest! {
            #[test]
            fn wire_form_roundtrips(
                version in version(),
                purpose in purpose(),
                body in proptest::collection::vec(any::<u8>(), 1..256),
                footer in proptest::collection::vec(any::<u8>(), 0..64),
            ) {
                let token = Paseto::new(version, purpose, body, footer);
                let text = token.to_string();

                let segments = if token.footer().is_empty() { 3 } else { 4 };
                prop_assert_eq!(text.split('.').count(), segments);
                prop_assert_eq!(text.parse::<Paseto>().unwrap(), token);
            }
        }
    }
}
