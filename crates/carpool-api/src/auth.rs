//! Password hashing.
//!
//! Argon2id with per-password random salts, stored as PHC strings.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::Argon2;

use carpool_core::{Error, Result};

/// Hashes and verifies account passwords.
#[derive(Debug, Default, Clone)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Creates a hasher with default Argon2id parameters.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Hashes a password into a PHC string.
    ///
    /// # Errors
    ///
    /// Returns an internal error if hashing fails.
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::internal(format!("password hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    /// Verifies a password against a stored PHC string.
    ///
    /// Returns `Ok(false)` for a wrong password; errors are reserved for
    /// malformed stored hashes.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the stored hash cannot be parsed.
    pub fn verify(&self, password: &str, stored_hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| Error::internal(format!("stored password hash is malformed: {e}")))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
