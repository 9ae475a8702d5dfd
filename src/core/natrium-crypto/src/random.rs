//! Randomness from the operating system CSPRNG.
//!
//! Nothing in Natrium accepts caller-supplied nonces or seeds; every one of
//! them comes from here.

use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

/// Fresh secret bytes, cleared on drop. Used for keys and key-pair seeds.
pub fn secret_array<const N: usize>() -> Zeroizing<[u8; N]> {
    let mut secret = Zeroizing::new([0u8; N]);
    OsRng.fill_bytes(secret.as_mut_slice());
    secret
}

/// Fresh public nonce of `N` bytes.
pub fn generate_nonce<const N: usize>() -> [u8; N] {
    let mut nonce = [0u8; N];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_secret_arrays_differ() {
        let a = secret_array::<32>();
        let b = secret_array::<32>();
        assert_ne!(*a, *b);
        assert_ne!(*a, [0u8; 32]);
    }

    #[test]
    fn test_nonce_sizes_follow_type() {
        let aes: [u8; 12] = generate_nonce();
        let xchacha: [u8; 24] = generate_nonce();
        assert_eq!(aes.len() + xchacha.len(), 36);
    }

    #[test]
    fn test_nonces_do_not_repeat() {
        let seen: HashSet<[u8; 24]> = (0..256).map(|_| generate_nonce()).collect();
        assert_eq!(seen.len(), 256);
    }
}
