//! Claim validation against a clock and allow-lists.

use tracing::debug;

use crate::claims::PasetoPayloadClaims;
use crate::clock::Clock;
use crate::error::PasetoError;

/// Rules a token's claims must satisfy.
///
/// Time checks always apply: a token is rejected if `iat` or `nbf` is in the
/// future or `exp` is in the past. Each non-empty allow-list requires the
/// claim to be present and to match one entry exactly.
#[derive(Debug, Clone, Default)]
pub struct ValidationRules {
    issuers: Vec<String>,
    subjects: Vec<String>,
    audiences: Vec<String>,
    require_expiration: bool,
}

impl ValidationRules {
    /// Rules with only the time checks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts tokens from `issuer`.
    pub fn allow_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuers.push(issuer.into());
        self
    }

    /// Accepts tokens about `subject`.
    pub fn allow_subject(mut self, subject: impl Into<String>) -> Self {
        self.subjects.push(subject.into());
        self
    }

    /// Accepts tokens intended for `audience`.
    pub fn allow_audience(mut self, audience: impl Into<String>) -> Self {
        self.audiences.push(audience.into());
        self
    }

    /// Rejects tokens without `exp`.
    pub fn require_expiration(mut self) -> Self {
        self.require_expiration = true;
        self
    }

    /// Validates `claims` at `clock.now()`.
    ///
    /// # Errors
    ///
    /// `InvalidClaims` naming the first failed rule.
    pub fn validate(
        &self,
        claims: &PasetoPayloadClaims,
        clock: &dyn Clock,
    ) -> Result<(), PasetoError> {
        let now = clock.now();

        if claims.issued_at().is_some_and(|iat| iat > now) {
            return Err(reject("token issued in the future"));
        }
        if claims.not_before().is_some_and(|nbf| nbf > now) {
            return Err(reject("token not yet valid"));
        }
        match claims.expiration() {
            Some(exp) if exp < now => return Err(reject("token expired")),
            None if self.require_expiration => return Err(reject("token has no expiration")),
            _ => {}
        }

        check_allowed("issuer", &self.issuers, claims.issuer())?;
        check_allowed("subject", &self.subjects, claims.subject())?;
        check_allowed("audience", &self.audiences, claims.audience())?;

        Ok(())
    }
}

fn reject(reason: &str) -> PasetoError {
    debug!(reason, "Claims rejected");
    PasetoError::InvalidClaims(reason.to_string())
}

fn check_allowed(name: &str, allowed: &[String], value: Option<&str>) -> Result<(), PasetoError> {
    if allowed.is_empty() {
        return Ok(());
    }

    match value {
        Some(value) if allowed.iter().any(|a| a == value) => Ok(()),
        Some(_) => Err(reject(&format!("{} not allowed", name))),
        None => Err(reject(&format!("{} missing", name))),
    }
}
