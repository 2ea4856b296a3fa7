//! Argon2id hashing for paste password gates.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::ApiError;

/// Hash a password gate into a PHC string with a random salt.
pub fn hash(password: &str) -> crate::ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check a supplied password against a stored PHC string.
pub fn verify(password: &str, stored: &str) -> crate::ApiResult<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| ApiError::CorruptRecord(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let stored = hash("hunter2").unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert!(!stored.contains("hunter2"));
        assert!(verify("hunter2", &stored).unwrap());
        assert!(!verify("hunter3", &stored).unwrap());
        assert!(!verify("", &stored).unwrap());
    }

    #[test]
    fn salts_differ_between_hashes() {
        assert_ne!(hash("same").unwrap(), hash("same").unwrap());
    }

    #[test]
    fn unparseable_hash_is_a_corrupt_record() {
        assert!(matches!(
            verify("x", "plaintext-password"),
            Err(ApiError::CorruptRecord(_))
        ));
    }
}
