//! Root key plus memoized derived keys.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use natrium_crypto::{
    CryptoError, EncryptionKeyPair, KeyId, SharedKey, SignatureKeyPair, SignaturePublicKey,
};

use crate::derivation::KeyDerivation;

type Context = Option<String>;

#[derive(Default)]
struct Cache {
    shared: HashMap<Context, Arc<SharedKey>>,
    encryption: HashMap<Context, Arc<EncryptionKeyPair>>,
    signature: HashMap<Context, Arc<SignatureKeyPair>>,
}

impl Cache {
    fn len(&self) -> usize {
        self.shared.len() + self.encryption.len() + self.signature.len()
    }
}

fn memoize<T>(
    map: &mut HashMap<Context, Arc<T>>,
    context: Option<&str>,
    derive: impl FnOnce() -> Result<T, CryptoError>,
) -> Result<Arc<T>, CryptoError> {
    let key = context.map(str::to_owned);
    if let Some(existing) = map.get(&key) {
        return Ok(Arc::clone(existing));
    }

    let value = Arc::new(derive()?);
    map.insert(key, Arc::clone(&value));
    Ok(value)
}

/// Owns the root key and caches everything derived from it.
///
/// Repeated requests for the same context return the same `Arc`. The cache
/// holds pure functions of the root key, so a poisoned lock is recovered
/// rather than propagated.
pub struct KeyChain {
    app_key: SharedKey,
    cache: Mutex<Cache>,
}

impl KeyChain {
    /// Creates a key chain rooted at `app_key`.
    pub fn new(app_key: SharedKey) -> Self {
        Self {
            app_key,
            cache: Mutex::new(Cache::default()),
        }
    }

    /// Root key.
    pub fn app_key(&self) -> &SharedKey {
        &self.app_key
    }

    fn lock(&self) -> MutexGuard<'_, Cache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Shared key for `context`.
    pub fn shared_key(&self, context: Option<&str>) -> Result<Arc<SharedKey>, CryptoError> {
        let mut cache = self.lock();
        memoize(&mut cache.shared, context, || {
            debug!(context = ?context, "Deriving shared key");
            KeyDerivation::shared(&self.app_key, context)
        })
    }

    /// X25519 key pair for `context`.
    pub fn encryption_key_pair(
        &self,
        context: Option<&str>,
    ) -> Result<Arc<EncryptionKeyPair>, CryptoError> {
        let mut cache = self.lock();
        memoize(&mut cache.encryption, context, || {
            debug!(context = ?context, "Deriving encryption key pair");
            KeyDerivation::encryption(&self.app_key, context)
        })
    }

    /// Ed25519 key pair for `context`.
    pub fn signature_key_pair(
        &self,
        context: Option<&str>,
    ) -> Result<Arc<SignatureKeyPair>, CryptoError> {
        let mut cache = self.lock();
        memoize(&mut cache.signature, context, || {
            debug!(context = ?context, "Deriving signature key pair");
            KeyDerivation::signature(&self.app_key, context)
        })
    }

    /// Identifier of the signature key for `context`.
    pub fn key_id(&self, context: Option<&str>) -> Result<KeyId, CryptoError> {
        Ok(self.signature_key_pair(context)?.key_id())
    }

    /// Resolves a hex key id to the root signature public key.
    ///
    /// Only the root (`None` context) key is resolvable. The comparison is
    /// constant-time; malformed or unknown ids yield `None`.
    pub fn lookup(&self, key_id: &str) -> Option<SignaturePublicKey> {
        let Ok(candidate) = KeyId::from_hex(key_id) else {
            debug!("Rejected malformed key id");
            return None;
        };

        let root = match self.signature_key_pair(None) {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "Failed to derive root signature key");
                return None;
            }
        };

        if root.key_id() == candidate {
            Some(*root.public())
        } else {
            None
        }
    }

    /// Drops every derived key. Later requests re-derive identical values.
    pub fn clear(&self) {
        let mut cache = self.lock();
        let purged = cache.len();
        *cache = Cache::default();
        debug!(purged, "Key chain cache cleared");
    }
}

impl std::fmt::Debug for KeyChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyChain")
            .field("app_key", &"[REDACTED]")
            .field("cached", &self.lock().len())
            .finish()
    }
}
