//! # Natrium PASETO
//!
//! Platform-Agnostic Security Tokens for Natrium.
//!
//! ## Features
//!
//! - `v2` and `v4` local (encrypted) and public (signed) tokens
//! - Implicit assertions for `v4`
//! - Registered and custom payload claims, footer claims
//! - Claim validation against an injected [`Clock`]
//!
//! `v3` is recognised on the wire and rejected by every operation.
//!
//! ## Example
//!
//! ```rust,ignore
//! use natrium_paseto::{Version, PasetoPayloadClaims};
//!
//! let claims = PasetoPayloadClaims::builder().subject("alice").build()?;
//! let token = Version::V4.encrypt(&key, &claims.to_json()?, b"", b"")?;
//! let opened = Version::V4.decrypt(&key, &token, b"")?;
//! assert_eq!(opened.claims()?.subject(), Some("alice"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod claims;
pub mod clock;
pub mod error;
pub mod token;
pub mod validation;

mod protocol;
mod v2;
mod v4;

pub use claims::{PasetoClaimsBuilder, PasetoFooterClaims, PasetoPayloadClaims};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::PasetoError;
pub use token::{Paseto, PasetoMessage, Purpose, Version};
pub use validation::ValidationRules;
