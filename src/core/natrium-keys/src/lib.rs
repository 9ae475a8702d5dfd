//! # Natrium Keys
//!
//! Derivation of every key Natrium uses from a single root key.
//!
//! ## Features
//!
//! - HKDF-SHA256 derivation of shared keys and key-pair seeds per context
//! - A thread-safe key chain that memoizes derived material
//! - Constant-time lookup of the root signature key by key id

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod derivation;
pub mod keychain;

pub use derivation::KeyDerivation;
pub use keychain::KeyChain;
