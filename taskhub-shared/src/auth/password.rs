//! Password hashing module using Argon2id
//!
//! # Security
//!
//! - **Algorithm**: Argon2id (hybrid of Argon2i and Argon2d)
//! - **Memory**: 64 MB (65536 KB)
//! - **Iterations**: 3 passes
//! - **Parallelism**: 4 lanes
//! - **Output**: 32-byte hash
//!
//! Stored hashes are wrapped in [`PasswordHash`], which can be written to the
//! database and checked against a candidate password but never read back or
//! serialized.
//!
//! # Example
//!
//! ```
//! use taskhub_shared::auth::password::PasswordHash;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = PasswordHash::generate("super_secret_password_123")?;
//!
//! assert!(hash.verify("super_secret_password_123")?);
//! assert!(!hash.verify("wrong_password")?);
//! # Ok(())
//! # }
//! ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};
use std::fmt;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// A stored password hash in PHC string format
///
/// The wrapped string is private to this module: there is no accessor, no
/// `Serialize` impl and `Debug` is redacted, so a hash can only flow into
/// the database or into [`PasswordHash::verify`].
#[derive(Clone, sqlx::Type)]
#[sqlx(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hashes a plaintext password with Argon2id
    pub fn generate(password: &str) -> Result<Self, PasswordError> {
        hash_password(password).map(Self)
    }

    /// Checks a candidate password against this hash
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::InvalidHash` if the stored value is not a PHC
    /// string (e.g. the migration backfill placeholder).
    pub fn verify(&self, password: &str) -> Result<bool, PasswordError> {
        verify_password(password, &self.0)
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash([redacted])")
    }
}

/// Hashes a password using Argon2id with secure parameters
///
/// # Security Parameters
///
/// - Memory: 64 MB (65536 KB)
/// - Iterations: 3 passes
/// - Parallelism: 4 lanes
/// - Salt: 16 bytes random, from the OS RNG
///
/// # Returns
///
/// PHC string format hash (includes algorithm, parameters, salt, and hash)
///
/// ```text
/// $argon2id$v=19$m=65536,t=3,p=4$c2FsdHNhbHRzYWx0$hash...
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(65536) // 64 MB
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a PHC hash string
///
/// Comparison is constant-time. The Argon2 parameters are read from the
/// hash itself.
///
/// # Returns
///
/// `Ok(true)` if password matches, `Ok(false)` if it doesn't match
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = argon2::password_hash::PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password_123").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let hash1 = hash_password("same_password").expect("Hash 1 should succeed");
        let hash2 = hash_password("same_password").expect("Hash 2 should succeed");

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("correct_password").expect("Hash should succeed");

        assert!(verify_password("correct_password", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(matches!(
            verify_password("password", "invalid_hash"),
            Err(PasswordError::InvalidHash(_))
        ));
        assert!(verify_password("password", "$argon2id$invalid").is_err());
    }

    #[test]
    fn test_backfilled_placeholder_never_verifies() {
        // Value written by the password_hash migration for pre-existing rows
        let result = verify_password("default_hash_value", "default_hash_value");
        assert!(result.is_err());
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = PasswordHash::generate("unicode-密码-パスワード").unwrap();
        assert!(hash.verify("unicode-密码-パスワード").unwrap());
        assert!(!hash.verify("unicode").unwrap());
    }

    #[test]
    fn test_password_hash_debug_is_redacted() {
        let hash = PasswordHash::generate("secret").unwrap();
        let debug = format!("{:?}", hash);

        assert_eq!(debug, "PasswordHash([redacted])");
        assert!(!debug.contains("argon2"));
    }
}
