//! Pre-Authentication Encoding.
//!
//! `PAE(pieces) = LE64(n) || LE64(len(p0)) || p0 || ... || LE64(len(pn)) || pn`
//!
//! Every piece is length-prefixed, so no two distinct lists of pieces encode
//! to the same bytes. Used as AEAD additional data and as the signed message
//! of public tokens.

/// Encodes a length as little-endian u64 with the most significant bit cleared.
pub fn le64(n: u64) -> [u8; 8] {
    (n & 0x7FFF_FFFF_FFFF_FFFF).to_le_bytes()
}

/// Pre-authentication encoding of `pieces`.
pub fn pae(pieces: &[&[u8]]) -> Vec<u8> {
    let capacity = 8 + pieces.iter().map(|p| 8 + p.len()).sum::<usize>();
    let mut out = Vec::with_capacity(capacity);

    out.extend_from_slice(&le64(pieces.len() as u64));
    for piece in pieces {
        out.extend_from_slice(&le64(piece.len() as u64));
        out.extend_from_slice(piece);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pae_empty_list() {
        assert_eq!(pae(&[]), vec![0u8; 8]);
    }

    #[test]
    fn test_pae_single_empty_piece() {
        let mut expected = vec![1, 0, 0, 0, 0, 0, 0, 0];
        expected.extend_from_slice(&[0u8; 8]);
        assert_eq!(pae(&[b""]), expected);
    }

    #[test]
    fn test_pae_known_encoding() {
        let encoded = pae(&[b"test"]);
        assert_eq!(
            hex::encode(encoded),
            "0100000000000000040000000000000074657374"
        );
    }

    #[test]
    fn test_pae_is_unambiguous() {
        // Naive concatenation would collide here.
        let a = pae(&[b"ab", b"c"]);
        let b = pae(&[b"a", b"bc"]);
        let c = pae(&[b"abc"]);

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn test_le64_clears_msb() {
        assert_eq!(le64(u64::MAX), [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F]);
    }
}
