//! Secret hashing helpers
//!
//! Repositories that store digests instead of raw secrets hash the presented
//! secret the same way before handing it to a session. These helpers give a
//! stable digest format: lowercase hex SHA-256 over the secret followed by
//! each salt.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Hash a secret together with any number of salts.
///
/// # Example
///
/// ```
/// use gatehouse_auth::hash::hash_secret;
///
/// let digest = hash_secret("hunter2", &["user-salt"]);
/// assert_eq!(digest.len(), 64);
/// assert_eq!(digest, hash_secret("hunter2", &["user-salt"]));
/// ```
pub fn hash_secret(secret: &str, salts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    for salt in salts {
        hasher.update(salt.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Generate a random alphanumeric salt of `len` characters.
pub fn generate_salt(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_without_salt() {
        assert_eq!(
            hash_secret("abc", &[]),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_salts_are_appended() {
        assert_eq!(hash_secret("ab", &["c"]), hash_secret("abc", &[]));
        assert_ne!(hash_secret("abc", &["x"]), hash_secret("abc", &[]));
    }

    #[test]
    fn test_generate_salt() {
        let salt = generate_salt(16);
        assert_eq!(salt.len(), 16);
        assert!(salt.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(generate_salt(32), generate_salt(32));
    }
}
