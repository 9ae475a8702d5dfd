//! Multi-recipient envelope.
//!
//! The payload is encrypted once under a fresh content key. The content key
//! is then boxed to every recipient and to the sender, each entry tagged with
//! the recipient's [`KeyId`].

use tracing::debug;
use zeroize::Zeroizing;

use super::keys::{EncryptionKeyPair, EncryptionPublicKey};
use super::{AsymmetricAlgorithm, EncryptedMessageBox};
use crate::error::CryptoError;
use crate::keys::{KeyId, SharedKey};
use crate::symmetric::EncryptedMessage;

/// Content key boxed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncapsulatedKey {
    /// Identifier of the recipient's encryption public key.
    pub recipient: KeyId,
    /// Content key, boxed from sender to recipient.
    pub key: EncryptedMessageBox,
}

/// Payload encrypted once for many recipients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiRecipientMessage {
    payload: EncryptedMessage,
    keys: Vec<EncapsulatedKey>,
}

impl MultiRecipientMessage {
    /// Reassembles an envelope from its parts.
    pub fn new(payload: EncryptedMessage, keys: Vec<EncapsulatedKey>) -> Self {
        Self { payload, keys }
    }

    /// Encrypted payload.
    pub fn payload(&self) -> &EncryptedMessage {
        &self.payload
    }

    /// One entry per recipient, sender included.
    pub fn keys(&self) -> &[EncapsulatedKey] {
        &self.keys
    }

    /// Encrypts `plaintext` so that `sender` and every recipient can open it.
    ///
    /// Duplicate recipients, and the sender listed as a recipient, get a
    /// single entry.
    pub fn encrypt(
        algorithm: AsymmetricAlgorithm,
        sender: &EncryptionKeyPair,
        recipients: &[EncryptionPublicKey],
        plaintext: &[u8],
        associated_data: &[u8],
    ) -> Result<Self, CryptoError> {
        let content_key = SharedKey::generate();
        let payload = algorithm
            .symmetric()
            .encrypt(&content_key, plaintext, associated_data)?;

        let mut keys: Vec<EncapsulatedKey> = Vec::with_capacity(recipients.len() + 1);
        for recipient in std::iter::once(sender.public()).chain(recipients) {
            let id = recipient.key_id();
            if keys.iter().any(|entry| entry.recipient == id) {
                continue;
            }

            let key = super::encrypt(
                algorithm,
                sender,
                recipient,
                content_key.as_bytes(),
                &[],
            )?;
            keys.push(EncapsulatedKey { recipient: id, key });
        }

        debug!(algorithm = %algorithm, recipients = keys.len(), "Encrypted multi-recipient message");

        Ok(Self { payload, keys })
    }

    /// Opens the envelope as `recipient`, which must hold an entry.
    ///
    /// Returns `Ok(None)` if there is no entry for `recipient` or if any layer
    /// fails to authenticate.
    pub fn decrypt(
        &self,
        recipient: &EncryptionKeyPair,
        sender: &EncryptionPublicKey,
        associated_data: &[u8],
    ) -> Result<Option<Zeroizing<Vec<u8>>>, CryptoError> {
        let id = recipient.key_id();

        // Visit every entry so the scan time does not depend on the match.
        let entry = self
            .keys
            .iter()
            .fold(None, |found, entry| match found {
                None if entry.recipient == id => Some(entry),
                _ => found,
            });

        let Some(entry) = entry else {
            debug!(recipient = %id, "No envelope entry for recipient");
            return Ok(None);
        };

        let Some(content_key) = super::decrypt(recipient, sender, &entry.key, &[])? else {
            return Ok(None);
        };

        let Ok(content_key) = SharedKey::from_bytes(&content_key) else {
            return Ok(None);
        };

        self.payload.decrypt(&content_key, associated_data)
    }
}
