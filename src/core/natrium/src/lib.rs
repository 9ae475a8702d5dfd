//! # Natrium
//!
//! Encryption, signatures and PASETO tokens from a single root key.
//!
//! ## Features
//!
//! - Symmetric encryption under context-derived shared keys
//! - Public-key boxes, sealed boxes and multi-recipient envelopes
//! - Ed25519 signatures
//! - `local` and `public` PASETO tokens with claim validation
//!
//! Every key is derived from the root key and an optional context string, so
//! one root key can serve unrelated purposes (`"sessions"`, `"webhooks"`)
//! without reusing key material across them.
//!
//! ## Example
//!
//! ```rust,ignore
//! use natrium::{Defaults, Natrium};
//! use natrium::crypto::SharedKey;
//!
//! let natrium = Natrium::new(SharedKey::generate(), Defaults::default());
//! let sealed = natrium.encrypt_string(b"hello", b"", Some("sessions"))?;
//! let opened = natrium.decrypt_string(&sealed, b"", Some("sessions"))?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;

pub use config::Defaults;
pub use error::NatriumError;

pub use natrium_crypto as crypto;
pub use natrium_keys as keys;
pub use natrium_paseto as paseto;

use tracing::{debug, info};
use zeroize::Zeroizing;

use natrium_crypto::asymmetric;
use natrium_crypto::{
    EncryptedMessage, EncryptedMessageBox, EncryptionPublicKey, KeyId, MultiRecipientMessage,
    SealedMessageBox, SharedKey, Signature, SignaturePublicKey,
};
use natrium_keys::KeyChain;
use natrium_paseto::{
    Clock, Paseto, PasetoFooterClaims, PasetoMessage, PasetoPayloadClaims, SystemClock,
    ValidationRules,
};

/// Shorthand for facade results.
pub type Result<T> = std::result::Result<T, NatriumError>;

/// Decrypted bytes, or `None` when the input did not authenticate.
pub type Opened = Option<Zeroizing<Vec<u8>>>;

// ============================================================================
// Natrium
// ============================================================================

/// Single entry point binding a [`KeyChain`], the configured [`Defaults`] and
/// a [`Clock`].
///
/// Every `context` argument selects an independent derived key; `None` is the
/// root context.
pub struct Natrium {
    keychain: KeyChain,
    defaults: Defaults,
    clock: Box<dyn Clock>,
}

impl Natrium {
    /// Creates an instance on the wall clock.
    pub fn new(app_key: SharedKey, defaults: Defaults) -> Self {
        Self::with_clock(app_key, defaults, SystemClock)
    }

    /// Creates an instance on an explicit clock.
    pub fn with_clock(app_key: SharedKey, defaults: Defaults, clock: impl Clock + 'static) -> Self {
        info!(
            symmetric = %defaults.symmetric,
            asymmetric = %defaults.asymmetric,
            paseto_version = %defaults.paseto_version,
            "Natrium initialized"
        );

        Self {
            keychain: KeyChain::new(app_key),
            defaults,
            clock: Box::new(clock),
        }
    }

    /// Underlying key chain.
    pub fn keychain(&self) -> &KeyChain {
        &self.keychain
    }

    /// Configured defaults.
    pub fn defaults(&self) -> Defaults {
        self.defaults
    }

    // ========================================================================
    // Symmetric Encryption
    // ========================================================================

    /// Encrypts under the context's shared key with the default algorithm.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        associated_data: &[u8],
        context: Option<&str>,
    ) -> Result<EncryptedMessage> {
        let key = self.keychain.shared_key(context)?;
        let message = self
            .defaults
            .symmetric
            .encrypt(&key, plaintext, associated_data)?;

        debug!(algorithm = %self.defaults.symmetric, context = ?context, "Message encrypted");
        Ok(message)
    }

    /// Decrypts with the algorithm recorded in `message`.
    ///
    /// Returns `Ok(None)` when the message does not authenticate.
    pub fn decrypt(
        &self,
        message: &EncryptedMessage,
        associated_data: &[u8],
        context: Option<&str>,
    ) -> Result<Opened> {
        let key = self.keychain.shared_key(context)?;
        Ok(message.decrypt(&key, associated_data)?)
    }

    /// Encrypts into the text envelope `natrium:<algorithm>:<base64url>`.
    pub fn encrypt_string(
        &self,
        plaintext: &[u8],
        associated_data: &[u8],
        context: Option<&str>,
    ) -> Result<String> {
        Ok(self
            .encrypt(plaintext, associated_data, context)?
            .to_string())
    }

    /// Decrypts a text envelope.
    ///
    /// A malformed envelope is an error; an envelope that does not
    /// authenticate is `Ok(None)`.
    pub fn decrypt_string(
        &self,
        encoded: &str,
        associated_data: &[u8],
        context: Option<&str>,
    ) -> Result<Opened> {
        let message: EncryptedMessage = encoded.parse()?;
        self.decrypt(&message, associated_data, context)
    }

    // ========================================================================
    // Public-Key Encryption
    // ========================================================================

    /// Encrypts to `recipient` from the context's encryption key pair.
    pub fn box_encrypt(
        &self,
        recipient: &EncryptionPublicKey,
        plaintext: &[u8],
        associated_data: &[u8],
        context: Option<&str>,
    ) -> Result<EncryptedMessageBox> {
        let sender = self.keychain.encryption_key_pair(context)?;
        Ok(asymmetric::encrypt(
            self.defaults.asymmetric,
            &sender,
            recipient,
            plaintext,
            associated_data,
        )?)
    }

    /// Opens a box `sender` addressed to the context's encryption key pair.
    pub fn box_decrypt(
        &self,
        sender: &EncryptionPublicKey,
        message_box: &EncryptedMessageBox,
        associated_data: &[u8],
        context: Option<&str>,
    ) -> Result<Opened> {
        let recipient = self.keychain.encryption_key_pair(context)?;
        Ok(asymmetric::decrypt(
            &recipient,
            sender,
            message_box,
            associated_data,
        )?)
    }

    /// Encrypts anonymously to `recipient`.
    pub fn seal(
        &self,
        recipient: &EncryptionPublicKey,
        plaintext: &[u8],
    ) -> Result<SealedMessageBox> {
        Ok(asymmetric::seal(
            self.defaults.asymmetric,
            recipient,
            plaintext,
        )?)
    }

    /// Opens a sealed box addressed to the context's encryption key pair.
    pub fn unseal(&self, sealed: &SealedMessageBox, context: Option<&str>) -> Result<Opened> {
        let recipient = self.keychain.encryption_key_pair(context)?;
        Ok(asymmetric::unseal(&recipient, sealed)?)
    }

    /// Encrypts once for several recipients. The sender can always open the
    /// result.
    pub fn encrypt_for_recipients(
        &self,
        recipients: &[EncryptionPublicKey],
        plaintext: &[u8],
        associated_data: &[u8],
        context: Option<&str>,
    ) -> Result<MultiRecipientMessage> {
        let sender = self.keychain.encryption_key_pair(context)?;
        Ok(MultiRecipientMessage::encrypt(
            self.defaults.asymmetric,
            &sender,
            recipients,
            plaintext,
            associated_data,
        )?)
    }

    /// Opens a multi-recipient message from `sender` as the context's
    /// encryption key pair.
    pub fn decrypt_from(
        &self,
        sender: &EncryptionPublicKey,
        message: &MultiRecipientMessage,
        associated_data: &[u8],
        context: Option<&str>,
    ) -> Result<Opened> {
        let recipient = self.keychain.encryption_key_pair(context)?;
        Ok(message.decrypt(&recipient, sender, associated_data)?)
    }

    // ========================================================================
    // Signatures & Public Keys
    // ========================================================================

    /// Signs with the context's signature key pair.
    pub fn sign(&self, message: &[u8], context: Option<&str>) -> Result<Signature> {
        let key_pair = self.keychain.signature_key_pair(context)?;
        Ok(asymmetric::sign(&key_pair, message))
    }

    /// Verifies a detached signature.
    ///
    /// A well-formed signature that does not match is `Ok(false)`.
    pub fn verify(
        &self,
        public_key: &SignaturePublicKey,
        signature: &[u8],
        message: &[u8],
    ) -> Result<bool> {
        Ok(asymmetric::verify(public_key, signature, message)?)
    }

    /// Public half of the context's encryption key pair.
    pub fn public_encryption_key(&self, context: Option<&str>) -> Result<EncryptionPublicKey> {
        Ok(*self.keychain.encryption_key_pair(context)?.public())
    }

    /// Public half of the context's signature key pair.
    pub fn public_signature_key(&self, context: Option<&str>) -> Result<SignaturePublicKey> {
        Ok(*self.keychain.signature_key_pair(context)?.public())
    }

    /// Identifier of the context's signature key.
    pub fn key_id(&self, context: Option<&str>) -> Result<KeyId> {
        Ok(self.keychain.key_id(context)?)
    }

    // ========================================================================
    // PASETO
    // ========================================================================

    /// Issues a `local` token under the context's shared key.
    pub fn encrypt_paseto(
        &self,
        claims: &PasetoPayloadClaims,
        footer: Option<&PasetoFooterClaims>,
        context: Option<&str>,
    ) -> Result<String> {
        let key = self.keychain.shared_key(context)?;
        let footer = match footer {
            Some(footer) => footer.to_footer()?,
            None => Vec::new(),
        };

        let token = self
            .defaults
            .paseto_version
            .encrypt(&key, &claims.to_json()?, &footer, &[])?;
        Ok(token.to_string())
    }

    /// Opens a `local` token under the context's shared key.
    ///
    /// Tokens of any version other than the configured one are rejected.
    pub fn decrypt_paseto(&self, token: &str, context: Option<&str>) -> Result<PasetoMessage> {
        let token: Paseto = token.parse()?;
        let key = self.keychain.shared_key(context)?;
        Ok(self.defaults.paseto_version.decrypt(&key, &token, &[])?)
    }

    /// Issues a `public` token signed by the context's signature key pair.
    ///
    /// When the footer carries no `kid`, the signing key's id is added.
    pub fn sign_paseto(
        &self,
        claims: &PasetoPayloadClaims,
        footer: Option<&PasetoFooterClaims>,
        context: Option<&str>,
    ) -> Result<String> {
        let key_pair = self.keychain.signature_key_pair(context)?;

        let mut footer = footer.cloned().unwrap_or_default();
        if footer.key_id().is_none() {
            footer = footer.with_key_id(key_pair.key_id().to_hex());
        }

        let token = self.defaults.paseto_version.sign(
            &key_pair,
            &claims.to_json()?,
            &footer.to_footer()?,
            &[],
        )?;
        Ok(token.to_string())
    }

    /// Verifies a `public` token issued by this key chain.
    ///
    /// The footer `kid` is resolved through [`KeyChain::lookup`]; a token
    /// without one is checked against the root signature key. A `kid` that
    /// does not resolve fails with [`NatriumError::UnknownKeyId`]; use
    /// [`Natrium::verify_paseto_with`] for context keys and foreign issuers.
    pub fn verify_paseto(&self, token: &str) -> Result<PasetoMessage> {
        let token: Paseto = token.parse()?;
        let footer = token.untrusted_footer_claims()?;

        let public_key = match footer.as_ref().and_then(PasetoFooterClaims::key_id) {
            Some(kid) => self.keychain.lookup(kid).ok_or_else(|| {
                debug!(kid, "Token names an unknown key");
                NatriumError::UnknownKeyId(kid.to_string())
            })?,
            None => *self.keychain.signature_key_pair(None)?.public(),
        };

        Ok(self
            .defaults
            .paseto_version
            .verify(&public_key, &token, &[])?)
    }

    /// Verifies a `public` token against an explicit public key.
    pub fn verify_paseto_with(
        &self,
        token: &str,
        public_key: &SignaturePublicKey,
    ) -> Result<PasetoMessage> {
        let token: Paseto = token.parse()?;
        Ok(self
            .defaults
            .paseto_version
            .verify(public_key, &token, &[])?)
    }

    /// Checks claims against `rules` at the injected clock's current time.
    pub fn validate_paseto(&self, claims: &PasetoPayloadClaims, rules: &ValidationRules) -> bool {
        rules.validate(claims, self.clock.as_ref()).is_ok()
    }
}

impl std::fmt::Debug for Natrium {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Natrium")
            .field("keychain", &self.keychain)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}
