// auth/password.rs - password hashing and verification
//
// New hashes are always Argon2id PHC strings with a per-user random salt.
// Unsalted SHA-256 hex digests written by the previous system are accepted on
// login only, and the caller is told to upgrade them.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Valid,
    /// Matched a legacy digest; the stored hash should be replaced
    ValidLegacy,
    Invalid,
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        !matches!(self, Verification::Invalid)
    }
}

pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, stored: &str) -> Result<Verification, PasswordError> {
    if is_legacy_digest(stored) {
        let digest = format!("{:x}", Sha256::digest(password.as_bytes()));
        return Ok(if digest.eq_ignore_ascii_case(stored) {
            Verification::ValidLegacy
        } else {
            Verification::Invalid
        });
    }

    let parsed = match PasswordHash::new(stored) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Unreadable password hash in store: {}", e);
            return Ok(Verification::Invalid);
        }
    };

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(Verification::Valid),
        Err(argon2::password_hash::Error::Password) => Ok(Verification::Invalid),
        Err(e) => Err(PasswordError::Hash(e.to_string())),
    }
}

/// 64 hex characters: an unsalted SHA-256 digest
fn is_legacy_digest(stored: &str) -> bool {
    stored.len() == 64 && stored.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_salted_and_verify() {
        let first = hash_password("s3cret!").unwrap();
        let second = hash_password("s3cret!").unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2"));

        assert_eq!(verify_password("s3cret!", &first).unwrap(), Verification::Valid);
        assert_eq!(verify_password("wrong", &first).unwrap(), Verification::Invalid);
    }

    #[test]
    fn legacy_digest_is_accepted_once() {
        // sha256("password")
        let legacy = "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";
        assert_eq!(verify_password("password", legacy).unwrap(), Verification::ValidLegacy);
        assert_eq!(verify_password("Password", legacy).unwrap(), Verification::Invalid);
    }

    #[test]
    fn garbage_hash_never_matches() {
        assert_eq!(verify_password("anything", "not-a-hash").unwrap(), Verification::Invalid);
        assert!(!Verification::Invalid.is_valid());
    }
}
