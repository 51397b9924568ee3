//! Credential primitives: password digests and bearer-token issuance.
//!
//! Digests are salted SHA-256 encoded as `<salt-hex>$<digest-hex>`. Tokens
//! are 32 random bytes, hex-encoded; only the SHA-256 fingerprint of a
//! token is ever persisted, so a leaked session store does not yield usable
//! credentials.

use rand::RngCore;
use sha2::{Digest, Sha256};

use super::session::{SessionToken, TokenDigest};
use super::user::PasswordHash;

/// Length of the random salt prefixed to each password digest.
const SALT_BYTES: usize = 16;
/// Length of the random material behind each bearer token.
const TOKEN_BYTES: usize = 32;
/// Separator between the salt and digest halves of an encoded hash.
const HASH_SEPARATOR: char = '$';

fn digest_with_salt(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

/// Produce a salted digest for storage.
///
/// # Examples
/// ```
/// use sweetshop_backend::domain::credentials::{hash_password, verify_password};
///
/// let hash = hash_password("Password123");
/// assert!(verify_password(&hash, "Password123"));
/// assert!(!verify_password(&hash, "password123"));
/// ```
pub fn hash_password(password: &str) -> PasswordHash {
    let mut salt = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt);
    let digest = digest_with_salt(&salt, password);
    PasswordHash::new(format!(
        "{}{HASH_SEPARATOR}{}",
        hex::encode(salt),
        hex::encode(digest)
    ))
}

/// Check a candidate password against a stored digest.
///
/// Returns `false` for digests that do not parse; a corrupt stored hash
/// must never authenticate anyone.
pub fn verify_password(hash: &PasswordHash, password: &str) -> bool {
    let encoded = hash.as_ref();
    let Some((salt_hex, digest_hex)) = encoded.split_once(HASH_SEPARATOR) else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(digest_hex) else {
        return false;
    };
    digest_with_salt(&salt, password).as_slice() == expected.as_slice()
}

/// A freshly issued bearer token together with its persistable fingerprint.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Token handed to the client, never stored.
    pub token: SessionToken,
    /// SHA-256 fingerprint persisted in the session store.
    pub digest: TokenDigest,
}

/// Generate a fresh bearer token.
pub fn issue_token() -> IssuedToken {
    let mut material = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut material);
    let token = SessionToken::new(hex::encode(material));
    let digest = TokenDigest::of(token.as_str());
    IssuedToken { token, digest }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn hash_is_salted() {
        let first = hash_password("Password123");
        let second = hash_password("Password123");
        assert_ne!(first, second, "same password must digest differently");
        assert!(verify_password(&first, "Password123"));
        assert!(verify_password(&second, "Password123"));
    }

    #[rstest]
    #[case("Password123", "password123")]
    #[case("Password123", "")]
    #[case("Password123", "Password123 ")]
    fn verify_rejects_wrong_password(#[case] stored: &str, #[case] attempt: &str) {
        let hash = hash_password(stored);
        assert!(!verify_password(&hash, attempt));
    }

    #[rstest]
    #[case("not-an-encoded-hash")]
    #[case("zz$zz")]
    #[case("")]
    fn verify_rejects_corrupt_digests(#[case] encoded: &str) {
        let hash = PasswordHash::new(encoded);
        assert!(!verify_password(&hash, "anything"));
    }

    #[rstest]
    fn issued_tokens_are_unique_hex() {
        let first = issue_token();
        let second = issue_token();
        assert_ne!(first.token.as_str(), second.token.as_str());
        assert_eq!(first.token.as_str().len(), 64);
        assert!(first.token.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[rstest]
    fn digest_matches_token() {
        let issued = issue_token();
        assert_eq!(issued.digest, TokenDigest::of(issued.token.as_str()));
    }
}
