//! Password value object - Domain layer password handling.
//!
//! Stored credentials are Argon2id PHC strings; the time cost is
//! configurable, memory and parallelism use the Argon2 defaults.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use uuid::Uuid;

use crate::config::DEFAULT_PASSWORD_HASH_STRENGTH;
use crate::errors::{AppError, AppResult};

/// Password value object that handles hashing and verification.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Hash the plain text with the default cost.
    ///
    /// Shape rules (length, letters and digits) are request validation
    /// concerns and are not re-checked here.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        Self::with_cost(plain_text, DEFAULT_PASSWORD_HASH_STRENGTH)
    }

    /// Hash the plain text with the given Argon2 time cost.
    pub fn with_cost(plain_text: &str, t_cost: u32) -> AppResult<Self> {
        let hash = Self::hash(plain_text, t_cost)?;
        Ok(Self { hash })
    }

    /// Digest of a random secret, for accounts that never log in locally.
    pub fn random(t_cost: u32) -> AppResult<Self> {
        let secret = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        Self::with_cost(&secret, t_cost)
    }

    /// Create a Password from an existing hash (from database).
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    pub fn verify(&self, plain_text: &str) -> bool {
        Self::verify_hash(plain_text, &self.hash).unwrap_or(false)
    }

    fn hash(plain_text: &str, t_cost: u32) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2(t_cost)?
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    // Cost parameters are read back from the PHC string.
    fn verify_hash(plain_text: &str, hash: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid hash format: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok())
    }

    fn argon2(t_cost: u32) -> AppResult<Argon2<'static>> {
        let params = Params::new(
            Params::DEFAULT_M_COST,
            t_cost,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| AppError::internal(format!("Invalid Argon2 parameters: {}", e)))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Password {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let plain = "Password123";
        let password = Password::new(plain).unwrap();

        assert_ne!(password.as_str(), plain);
        assert!(password.verify(plain));
        assert!(!password.verify("Password124"));
    }

    #[test]
    fn test_password_from_hash() {
        let plain = "TestPassword123";
        let hash = Password::new(plain).unwrap().into_string();

        let restored = Password::from_hash(hash);
        assert!(restored.verify(plain));
    }

    #[test]
    fn test_same_password_different_salts() {
        let plain = "SamePassword123";
        let pass1 = Password::new(plain).unwrap();
        let pass2 = Password::new(plain).unwrap();

        assert_ne!(pass1, pass2);
        assert!(pass1.verify(plain));
        assert!(pass2.verify(plain));
    }

    #[test]
    fn test_custom_cost_is_verifiable() {
        let password = Password::with_cost("Password123", 3).unwrap();
        assert!(password.as_str().contains("t=3"));
        assert!(password.verify("Password123"));
    }

    #[test]
    fn test_zero_cost_is_rejected() {
        assert!(Password::with_cost("Password123", 0).is_err());
    }

    #[test]
    fn test_random_password_is_a_digest() {
        let password = Password::random(DEFAULT_PASSWORD_HASH_STRENGTH).unwrap();
        assert!(password.as_str().starts_with("$argon2id$"));
        assert!(!password.verify(""));
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        assert!(!Password::from_hash("not-a-hash".into()).verify("anything"));
    }
}
