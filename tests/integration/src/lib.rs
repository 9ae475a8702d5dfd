//! Integration tests for Natrium.
//!
//! These tests drive several `Natrium` instances against each other the way
//! separate services sharing (or not sharing) a root key would.

// Allow unwrap() in tests - panics are acceptable for test assertions
#![allow(clippy::disallowed_methods)]

use chrono::{DateTime, TimeZone, Utc};

use natrium::crypto::SharedKey;
use natrium::paseto::FixedClock;
use natrium::{Defaults, Natrium};

// ============================================================================
// Fixtures
// ============================================================================

/// Fixed reference time used by every scenario.
pub const NOW: i64 = 1_700_000_000;

/// Timestamp `secs` seconds after the epoch.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}

/// A deterministic root key distinct per `seed`.
pub fn root_key(seed: u8) -> SharedKey {
    SharedKey::from_array(&[seed; 32])
}

/// A service on `root_key(seed)` whose clock is frozen at `now`.
pub fn service_at(seed: u8, defaults: Defaults, now: i64) -> Natrium {
    Natrium::with_clock(root_key(seed), defaults, FixedClock::new(at(now)))
}

/// A service on `root_key(seed)` at [`NOW`].
pub fn service(seed: u8, defaults: Defaults) -> Natrium {
    service_at(seed, defaults, NOW)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use proptest::prelude::*;
    use serde_json::json;

    use natrium::crypto::{
        CryptoError, EncryptedMessage, EncryptionPublicKey, SignaturePublicKey,
        SymmetricAlgorithm,
    };
    use natrium::paseto::{PasetoError, PasetoPayloadClaims, ValidationRules, Version};
    use natrium::NatriumError;

    fn session_claims() -> PasetoPayloadClaims {
        PasetoPayloadClaims::builder()
            .subject("Foo Bar")
            .issuer("auth.example.com")
            .audience("app.example.com")
            .valid_for(at(NOW), Duration::minutes(15))
            .claim("roles", json!(["reader", "writer"]))
            .unwrap()
            .build()
            .unwrap()
    }

    fn session_rules() -> ValidationRules {
        ValidationRules::new()
            .allow_issuer("auth.example.com")
            .allow_audience("app.example.com")
            .require_expiration()
    }

    #[test]
    fn test_services_sharing_a_root_key_interoperate() {
        let issuer = service(1, Defaults::default());
        let consumer = service(1, Defaults::default());

        let envelope = issuer
            .encrypt_string(b"card 4242", b"order-17", Some("payments"))
            .unwrap();
        let opened = consumer
            .decrypt_string(&envelope, b"order-17", Some("payments"))
            .unwrap()
            .unwrap();
        assert_eq!(&*opened, b"card 4242");

        let token = issuer.encrypt_paseto(&session_claims(), None, None).unwrap();
        let claims = consumer.decrypt_paseto(&token, None).unwrap().claims().unwrap();
        assert_eq!(claims, session_claims());
        assert!(consumer.validate_paseto(&claims, &session_rules()));
    }

    #[test]
    fn test_contexts_isolate_purposes() {
        let natrium = service(1, Defaults::default());

        let sessions = natrium.encrypt_string(b"session", b"", Some("sessions")).unwrap();
        assert!(natrium
            .decrypt_string(&sessions, b"", Some("webhooks"))
            .unwrap()
            .is_none());

        let token = natrium
            .encrypt_paseto(&session_claims(), None, Some("sessions"))
            .unwrap();
        assert!(matches!(
            natrium.decrypt_paseto(&token, Some("webhooks")),
            Err(NatriumError::Paseto(PasetoError::DecryptionFailed))
        ));

        assert_ne!(
            natrium.public_signature_key(Some("sessions")).unwrap(),
            natrium.public_signature_key(Some("webhooks")).unwrap()
        );
    }

    #[test]
    fn test_other_root_key_cannot_read_anything() {
        let alice = service(1, Defaults::default());
        let mallory = service(2, Defaults::default());

        let envelope = alice.encrypt_string(b"secret", b"", None).unwrap();
        assert!(mallory.decrypt_string(&envelope, b"", None).unwrap().is_none());

        let token = alice.encrypt_paseto(&session_claims(), None, None).unwrap();
        assert!(mallory.decrypt_paseto(&token, None).is_err());

        let signed = alice.sign_paseto(&session_claims(), None, None).unwrap();
        assert!(matches!(
            mallory.verify_paseto(&signed),
            Err(NatriumError::UnknownKeyId(_))
        ));
    }

    #[test]
    fn test_signed_token_verified_with_exported_key() {
        let issuer = service(1, Defaults::default());
        let verifier = service(2, Defaults::default());

        let exported = issuer.public_signature_key(Some("api")).unwrap().export();
        let token = issuer.sign_paseto(&session_claims(), None, Some("api")).unwrap();

        let public_key = SignaturePublicKey::import(&exported).unwrap();
        let message = verifier.verify_paseto_with(&token, &public_key).unwrap();
        let claims = message.claims().unwrap();

        assert_eq!(claims.custom("roles"), Some(&json!(["reader", "writer"])));
        assert!(verifier.validate_paseto(&claims, &session_rules()));

        let footer = message.footer_claims().unwrap().unwrap();
        assert_eq!(footer.key_id(), Some(public_key.key_id().to_hex().as_str()));
    }

    #[test]
    fn test_tampered_signed_token_rejected() {
        let natrium = service(1, Defaults::default());
        let token = natrium.sign_paseto(&session_claims(), None, None).unwrap();

        let mut segments: Vec<String> = token.split('.').map(str::to_string).collect();
        let mut body: Vec<char> = segments[2].chars().collect();
        body[3] = if body[3] == 'A' { 'B' } else { 'A' };
        segments[2] = body.into_iter().collect();

        assert!(matches!(
            natrium.verify_paseto(&segments.join(".")),
            Err(NatriumError::Paseto(PasetoError::InvalidSignature))
        ));
    }

    #[test]
    fn test_token_expires_with_the_clock() {
        let issuer = service(1, Defaults::default());
        let token = issuer.encrypt_paseto(&session_claims(), None, None).unwrap();

        for (offset, valid) in [(0, true), (15 * 60, true), (15 * 60 + 1, false)] {
            let consumer = service_at(1, Defaults::default(), NOW + offset);
            let claims = consumer.decrypt_paseto(&token, None).unwrap().claims().unwrap();
            assert_eq!(consumer.validate_paseto(&claims, &session_rules()), valid);
        }

        let early = service_at(1, Defaults::default(), NOW - 1);
        let claims = early.decrypt_paseto(&token, None).unwrap().claims().unwrap();
        assert!(!early.validate_paseto(&claims, &session_rules()));
    }

    #[test]
    fn test_configured_paseto_version_only() {
        let v2 = service(1, Defaults::default().with_paseto_version(Version::V2));
        let v4 = service(1, Defaults::default());

        let local = v2.encrypt_paseto(&session_claims(), None, None).unwrap();
        let public = v2.sign_paseto(&session_claims(), None, None).unwrap();
        assert!(v2.decrypt_paseto(&local, None).is_ok());
        assert!(v2.verify_paseto(&public).is_ok());

        assert!(matches!(
            v4.decrypt_paseto(&local, None),
            Err(NatriumError::Paseto(PasetoError::VersionMismatch { .. }))
        ));
        assert!(matches!(
            v4.verify_paseto(&public),
            Err(NatriumError::Paseto(PasetoError::VersionMismatch { .. }))
        ));
    }

    #[test]
    fn test_every_available_algorithm_roundtrips() {
        for algorithm in SymmetricAlgorithm::ALL {
            if !algorithm.available() {
                continue;
            }
            let natrium = service(1, Defaults::default().with_symmetric(algorithm));
            let ad: &[u8] = if algorithm.is_aead() { b"header" } else { b"" };

            let envelope = natrium.encrypt_string(b"payload", ad, None).unwrap();
            let message: EncryptedMessage = envelope.parse().unwrap();
            assert_eq!(message.algorithm(), algorithm);

            let reader = service(1, Defaults::default());
            let opened = reader.decrypt_string(&envelope, ad, None).unwrap().unwrap();
            assert_eq!(&*opened, b"payload");
        }
    }

    #[test]
    fn test_non_aead_default_rejects_associated_data() {
        let natrium = service(
            1,
            Defaults::default().with_symmetric(SymmetricAlgorithm::XSalsa20Poly1305),
        );

        assert!(matches!(
            natrium.encrypt(b"payload", b"header", None),
            Err(NatriumError::Crypto(CryptoError::CryptographicLogic(_)))
        ));
        assert!(natrium.encrypt(b"payload", b"", None).is_ok());
    }

    #[test]
    fn test_truncated_envelope_is_not_authenticated() {
        let natrium = service(1, Defaults::default());
        let message = natrium.encrypt(b"payload", b"", None).unwrap();

        let truncated = EncryptedMessage::new(
            message.algorithm(),
            message.nonce().to_vec(),
        );
        assert!(natrium.decrypt(&truncated, b"", None).unwrap().is_none());
    }

    #[test]
    fn test_public_key_exchange_between_services() {
        let alice = service(1, Defaults::default());
        let bob = service(2, Defaults::default());

        let alice_pk =
            EncryptionPublicKey::import(&alice.public_encryption_key(None).unwrap().export())
                .unwrap();
        let bob_pk =
            EncryptionPublicKey::import(&bob.public_encryption_key(None).unwrap().export())
                .unwrap();

        let message_box = alice.box_encrypt(&bob_pk, b"hello", b"ctx", None).unwrap();
        let opened = bob
            .box_decrypt(&alice_pk, &message_box, b"ctx", None)
            .unwrap()
            .unwrap();
        assert_eq!(&*opened, b"hello");

        let sealed = bob.seal(&alice_pk, b"anonymous reply").unwrap();
        let opened = alice.unseal(&sealed, None).unwrap().unwrap();
        assert_eq!(&*opened, b"anonymous reply");
        assert!(bob.unseal(&sealed, None).unwrap().is_none());
    }

    #[test]
    fn test_multi_recipient_fan_out() {
        let sender = service(1, Defaults::default());
        let readers: Vec<Natrium> = (2..5).map(|seed| service(seed, Defaults::default())).collect();
        let outsider = service(9, Defaults::default());

        let recipients: Vec<EncryptionPublicKey> = readers
            .iter()
            .map(|reader| reader.public_encryption_key(None).unwrap())
            .collect();
        let sender_pk = sender.public_encryption_key(None).unwrap();

        let message = sender
            .encrypt_for_recipients(&recipients, b"quarterly report", b"q3", None)
            .unwrap();
        assert_eq!(message.keys().len(), recipients.len() + 1);

        for reader in readers.iter().chain(std::iter::once(&sender)) {
            let opened = reader
                .decrypt_from(&sender_pk, &message, b"q3", None)
                .unwrap()
                .unwrap();
            assert_eq!(&*opened, b"quarterly report");
        }

        assert!(outsider
            .decrypt_from(&sender_pk, &message, b"q3", None)
            .unwrap()
            .is_none());
        assert!(readers[0]
            .decrypt_from(&sender_pk, &message, b"q4", None)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_cleared_keychain_still_opens_old_messages() {
        let natrium = service(1, Defaults::default());
        let envelope = natrium.encrypt_string(b"before", b"", Some("ctx")).unwrap();
        let key_id = natrium.key_id(None).unwrap();

        natrium.keychain().clear();

        let opened = natrium
            .decrypt_string(&envelope, b"", Some("ctx"))
            .unwrap()
            .unwrap();
        assert_eq!(&*opened, b"before");
        assert_eq!(natrium.key_id(None).unwrap(), key_id);
    }

    proptest! {
        #[test]
        fn facade_roundtrip(
            plaintext in proptest::collection::vec(any::<u8>(), 0..512),
            ad in proptest::collection::vec(any::<u8>(), 0..32),
            context in proptest::option::of("[a-z]{0,12}"),
        ) {
            let natrium = service(3, Defaults::default());
            let envelope = natrium
                .encrypt_string(&plaintext, &ad, context.as_deref())
                .unwrap();
            let opened = natrium
                .decrypt_string(&envelope, &ad, context.as_deref())
                .unwrap()
                .unwrap();
            prop_assert_eq!(&*opened, &plaintext);
        }
    }
}
