//! Salted password digests.

use sha2::{Digest, Sha256};
use uuid::Uuid;

const DIGEST_ROUNDS: u32 = 10_000;

pub(crate) fn new_salt() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Iterated SHA-256 over `salt || password`, hex encoded.
pub(crate) fn digest(salt: &str, password: &str) -> String {
    let mut state: [u8; 32] = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize()
        .into();
    for _ in 1..DIGEST_ROUNDS {
        state = Sha256::new()
            .chain_update(salt.as_bytes())
            .chain_update(state)
            .finalize()
            .into();
    }
    hex::encode(state)
}

/// Compares two hex digests without early exit.
pub(crate) fn digests_match(left: &str, right: &str) -> bool {
    left.len() == right.len()
        && left
            .bytes()
            .zip(right.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

#[cfg(test)]
mod tests {
    use super::{digest, digests_match, new_salt};

    #[test]
    fn digest_is_deterministic_per_salt() {
        assert_eq!(digest("salt", "secret1"), digest("salt", "secret1"));
        assert_ne!(digest("salt", "secret1"), digest("pepper", "secret1"));
        assert_eq!(digest("salt", "secret1").len(), 64);
    }

    #[test]
    fn salts_are_unique() {
        assert_ne!(new_salt(), new_salt());
    }

    #[test]
    fn digests_match_requires_equal_length_and_bytes() {
        assert!(digests_match("abcd", "abcd"));
        assert!(!digests_match("abcd", "abce"));
        assert!(!digests_match("abcd", "abc"));
    }
}
