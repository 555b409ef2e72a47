//! Salted password hashing.
//!
//! Every password is concatenated with a service-wide secret (the "salt")
//! before it is hashed with Argon2. The same salted form is used when the
//! password is stored and when it is checked at authentication time.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{DomainError, DomainResult};

/// Service-wide secret appended to every password before hashing.
#[derive(Clone)]
pub struct PasswordSalt {
    secret: String,
}

// Don't expose the secret in debug output
impl std::fmt::Debug for PasswordSalt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordSalt")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl PasswordSalt {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Password concatenated with the secret
    pub fn salted(&self, plain_text: &str) -> String {
        format!("{}{}", plain_text, self.secret)
    }

    /// Salt and hash a plain text password for storage.
    pub fn hash(&self, plain_text: &str) -> DomainResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(self.salted(plain_text).as_bytes(), &salt)
            .map_err(|e| DomainError::password(format!("hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Check a plain text password against a stored hash.
    ///
    /// A stored value that is not a valid hash never verifies.
    pub fn verify(&self, plain_text: &str, stored: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };
        Argon2::default()
            .verify_password(self.salted(plain_text).as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salted_appends_secret() {
        let salt = PasswordSalt::new("FOO");
        assert_eq!(salt.salted("pw"), "pwFOO");
    }

    #[test]
    fn test_hash_and_verify() {
        let salt = PasswordSalt::new("pepper");
        let stored = salt.hash("pw").unwrap();

        assert_ne!(stored, "pw");
        assert!(salt.verify("pw", &stored));
        assert!(!salt.verify("other", &stored));
    }

    #[test]
    fn test_verify_depends_on_secret() {
        let stored = PasswordSalt::new("one").hash("pw").unwrap();

        assert!(!PasswordSalt::new("two").verify("pw", &stored));
    }

    #[test]
    fn test_same_password_different_hashes() {
        let salt = PasswordSalt::new("pepper");
        let first = salt.hash("pw").unwrap();
        let second = salt.hash("pw").unwrap();

        assert_ne!(first, second);
        assert!(salt.verify("pw", &first));
        assert!(salt.verify("pw", &second));
    }

    #[test]
    fn test_unhashed_value_never_verifies() {
        let salt = PasswordSalt::new("pepper");
        assert!(!salt.verify("pw", "pwpepper"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", PasswordSalt::new("hunter2"));
        assert!(!rendered.contains("hunter2"));
    }
}
