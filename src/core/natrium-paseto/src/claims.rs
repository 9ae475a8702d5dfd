//! Payload and footer claims.
//!
//! Registered claims are typed fields; everything else lives in an open map
//! of custom claims whose keys can never shadow a registered name.
//! Timestamps are RFC 3339 strings on the wire.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PasetoError;

/// Registered payload claim names.
pub const REGISTERED_CLAIMS: [&str; 7] = ["iss", "sub", "aud", "exp", "nbf", "iat", "jti"];

/// Registered footer claim names.
pub const REGISTERED_FOOTER_CLAIMS: [&str; 2] = ["kid", "wpk"];

fn insert_custom(
    map: &mut Map<String, Value>,
    reserved: &[&str],
    key: String,
    value: Value,
) -> Result<(), PasetoError> {
    if reserved.contains(&key.as_str()) {
        return Err(PasetoError::ReservedClaim(key));
    }
    map.insert(key, value);
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>, PasetoError> {
    serde_json::to_vec(value).map_err(|e| PasetoError::InvalidClaims(e.to_string()))
}

/// Claims carried in the token payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasetoPayloadClaims {
    #[serde(skip_serializing_if = "Option::is_none")]
    iss: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aud: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    jti: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    iat: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nbf: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exp: Option<DateTime<Utc>>,
    #[serde(flatten)]
    custom: Map<String, Value>,
}

impl PasetoPayloadClaims {
    /// Starts a builder.
    pub fn builder() -> PasetoClaimsBuilder {
        PasetoClaimsBuilder::default()
    }

    /// Issuer (`iss`).
    pub fn issuer(&self) -> Option<&str> {
        self.iss.as_deref()
    }

    /// Subject (`sub`).
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref()
    }

    /// Audience (`aud`).
    pub fn audience(&self) -> Option<&str> {
        self.aud.as_deref()
    }

    /// Token identifier (`jti`).
    pub fn token_id(&self) -> Option<&str> {
        self.jti.as_deref()
    }

    /// Issued-at time (`iat`).
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat
    }

    /// Not-before time (`nbf`).
    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.nbf
    }

    /// Expiration time (`exp`).
    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.exp
    }

    /// Custom claim by name.
    pub fn custom(&self, key: &str) -> Option<&Value> {
        self.custom.get(key)
    }

    /// All custom claims.
    pub fn custom_claims(&self) -> &Map<String, Value> {
        &self.custom
    }

    /// Adds a custom claim.
    ///
    /// # Errors
    ///
    /// `ReservedClaim` if `key` is a registered claim name.
    pub fn insert_custom(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), PasetoError> {
        insert_custom(&mut self.custom, &REGISTERED_CLAIMS, key.into(), value.into())
    }

    /// Serializes to JSON.
    pub fn to_json(&self) -> Result<Vec<u8>, PasetoError> {
        to_json(self)
    }

    /// Parses JSON claims.
    pub fn from_json(bytes: &[u8]) -> Result<Self, PasetoError> {
        serde_json::from_slice(bytes).map_err(|e| PasetoError::InvalidClaims(e.to_string()))
    }
}

/// Builder for [`PasetoPayloadClaims`].
///
/// [`PasetoClaimsBuilder::build`] enforces `iat <= nbf < exp` over whichever
/// of the three are set.
#[derive(Debug, Default)]
pub struct PasetoClaimsBuilder {
    claims: PasetoPayloadClaims,
    error: Option<PasetoError>,
}

impl PasetoClaimsBuilder {
    /// Sets `iss`.
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.claims.iss = Some(issuer.into());
        self
    }

    /// Sets `sub`.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.claims.sub = Some(subject.into());
        self
    }

    /// Sets `aud`.
    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.claims.aud = Some(audience.into());
        self
    }

    /// Sets `jti`.
    pub fn token_id(mut self, token_id: impl Into<String>) -> Self {
        self.claims.jti = Some(token_id.into());
        self
    }

    /// Sets `iat`.
    pub fn issued_at(mut self, at: DateTime<Utc>) -> Self {
        self.claims.iat = Some(at);
        self
    }

    /// Sets `nbf`.
    pub fn not_before(mut self, at: DateTime<Utc>) -> Self {
        self.claims.nbf = Some(at);
        self
    }

    /// Sets `exp`.
    pub fn expiration(mut self, at: DateTime<Utc>) -> Self {
        self.claims.exp = Some(at);
        self
    }

    /// Sets `iat` and `nbf` to `now` and `exp` to `now + ttl`.
    ///
    /// An `exp` outside the representable range is reported by
    /// [`build`](Self::build).
    pub fn valid_for(mut self, now: DateTime<Utc>, ttl: Duration) -> Self {
        match now.checked_add_signed(ttl) {
            Some(exp) => self.issued_at(now).not_before(now).expiration(exp),
            None => {
                self.error = Some(PasetoError::InvalidClaims(
                    "exp is out of range".to_string(),
                ));
                self
            },
        }
    }

    /// Adds a custom claim.
    pub fn claim(
        mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Self, PasetoError> {
        self.claims.insert_custom(key, value)?;
        Ok(self)
    }

    /// Finishes the claims.
    ///
    /// # Errors
    ///
    /// `InvalidClaims` if a timestamp is out of range or the timestamps are
    /// out of order.
    pub fn build(self) -> Result<PasetoPayloadClaims, PasetoError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let PasetoPayloadClaims { iat, nbf, exp, .. } = self.claims;

        if let (Some(iat), Some(nbf)) = (iat, nbf) {
            if iat > nbf {
                return Err(PasetoError::InvalidClaims(
                    "iat must not be after nbf".to_string(),
                ));
            }
        }
        if let (Some(nbf), Some(exp)) = (nbf, exp) {
            if nbf >= exp {
                return Err(PasetoError::InvalidClaims(
                    "nbf must be before exp".to_string(),
                ));
            }
        }
        if let (Some(iat), Some(exp)) = (iat, exp) {
            if iat >= exp {
                return Err(PasetoError::InvalidClaims(
                    "iat must be before exp".to_string(),
                ));
            }
        }

        Ok(self.claims)
    }
}

/// Claims carried in the token footer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasetoFooterClaims {
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wpk: Option<String>,
    #[serde(flatten)]
    custom: Map<String, Value>,
}

impl PasetoFooterClaims {
    /// Empty footer claims.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `kid`.
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.kid = Some(key_id.into());
        self
    }

    /// Sets `wpk`.
    pub fn with_wrapped_key(mut self, wrapped: impl Into<String>) -> Self {
        self.wpk = Some(wrapped.into());
        self
    }

    /// Key identifier (`kid`).
    pub fn key_id(&self) -> Option<&str> {
        self.kid.as_deref()
    }

    /// Wrapped key (`wpk`).
    pub fn wrapped_key(&self) -> Option<&str> {
        self.wpk.as_deref()
    }

    /// Custom claim by name.
    pub fn custom(&self, key: &str) -> Option<&Value> {
        self.custom.get(key)
    }

    /// Adds a custom claim.
    ///
    /// # Errors
    ///
    /// `ReservedClaim` if `key` is `kid` or `wpk`.
    pub fn insert_custom(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), PasetoError> {
        insert_custom(
            &mut self.custom,
            &REGISTERED_FOOTER_CLAIMS,
            key.into(),
            value.into(),
        )
    }

    /// Whether no claim is set.
    pub fn is_empty(&self) -> bool {
        self.kid.is_none() && self.wpk.is_none() && self.custom.is_empty()
    }

    /// Serializes to JSON; empty claims serialize to an empty footer.
    pub fn to_footer(&self) -> Result<Vec<u8>, PasetoError> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        to_json(self)
    }

    /// Parses a footer; `None` when the footer is empty.
    pub fn from_footer(bytes: &[u8]) -> Result<Option<Self>, PasetoError> {
        if bytes.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(bytes)
            .map(Some)
            .map_err(|e| PasetoError::InvalidClaims(e.to_string()))
    }
}
