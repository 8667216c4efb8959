//! Hashing helpers for composite cache keys.
//!
//! String key components compare case-insensitively, so they must also hash
//! case-insensitively. Both [`eq_fold_case`] and [`fold_case_hash`] walk the
//! same lowercase-folded character stream, which keeps them consistent.

use xxhash_rust::xxh3::Xxh3;

/// Multiplicative constant used to combine component hashes (64-bit FNV prime).
pub const MIX_PRIME: u64 = 0x0000_0100_0000_01B3;

/// Folds `acc` with the next component hash.
pub fn mix(acc: u64, component: u64) -> u64 {
    acc.wrapping_mul(MIX_PRIME) ^ component
}

/// Case-insensitive string equality under Unicode simple lowercase folding.
pub fn eq_fold_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Computes an XXH3-64 hash of `s` after lowercase folding.
///
/// Strings that are equal under [`eq_fold_case`] hash identically.
pub fn fold_case_hash(s: &str) -> u64 {
    let mut hasher = Xxh3::new();
    let mut buf = [0u8; 4];
    for c in s.chars().flat_map(char::to_lowercase) {
        hasher.update(c.encode_utf8(&mut buf).as_bytes());
    }
    hasher.digest()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_case_equality() {
        assert!(eq_fold_case("NOTDEFINED", "notdefined"));
        assert!(eq_fold_case("Wall", "wALL"));
        assert!(!eq_fold_case("Wall", "Walls"));
    }

    #[test]
    fn fold_case_hash_consistent_with_equality() {
        assert_eq!(fold_case_hash("UserDefined"), fold_case_hash("USERDEFINED"));
        assert_eq!(fold_case_hash("Straße"), fold_case_hash("STRAßE"));
        assert_ne!(fold_case_hash("beam"), fold_case_hash("column"));
    }

    #[test]
    fn deterministic() {
        assert_eq!(fold_case_hash("slab"), fold_case_hash("slab"));
    }

    #[test]
    fn mix_is_order_sensitive() {
        let a = mix(mix(0, 1), 2);
        let b = mix(mix(0, 2), 1);
        assert_ne!(a, b);
    }
}
