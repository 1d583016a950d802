//! Password hashing (Argon2id, PHC string format).

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier as _, Version};
use thiserror::Error;

use tillpoint_core::FieldErrors;

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("invalid hashing parameters: {0}")]
    Params(String),

    #[error("failed to hash password: {0}")]
    Hash(String),
}

/// Hashes and verifies passwords.
///
/// Verification reads the cost parameters from the stored hash, so hashes
/// produced under a different cost still verify.
#[derive(Clone, Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Argon2id with explicit memory (KiB) and iteration cost.
    pub fn with_cost(memory_kib: u32, iterations: u32) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| PasswordError::Params(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hash(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// `false` for a wrong password and for an unparsable stored hash.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            return false;
        };
        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Length rule for new passwords.
pub fn check_password(errors: &mut FieldErrors, field: &str, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(
            field,
            format!("Ensure this field has at least {MIN_PASSWORD_LENGTH} characters."),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::with_cost(64, 1).unwrap()
    }

    #[test]
    fn verifies_only_the_original_password() {
        let hasher = fast_hasher();
        let hash = hasher.hash("testpass123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("testpass123", &hash));
        assert!(!hasher.verify("wrongpass", &hash));
    }

    #[test]
    fn salts_differ_per_hash() {
        let hasher = fast_hasher();
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn verify_uses_parameters_embedded_in_hash() {
        let hash = fast_hasher().hash("secret1").unwrap();
        assert!(PasswordHasher::default().verify("secret1", &hash));
    }

    #[test]
    fn corrupt_hash_never_verifies() {
        assert!(!fast_hasher().verify("anything", "not-a-phc-string"));
    }

    #[test]
    fn short_passwords_flagged() {
        let mut errors = FieldErrors::new();
        check_password(&mut errors, "password", "12345");
        check_password(&mut errors, "other", "123456");
        assert!(errors.contains("password"));
        assert!(!errors.contains("other"));
    }
}
