//! Password hashing and verification for Agora.
//!
//! Uses Argon2id. Only the PHC-formatted verifier is ever stored.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use rand_core::OsRng;
use thiserror::Error;

use crate::auth::validation::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use crate::db::User;
use crate::ForumError;

/// Password-related errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Password is too short.
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,

    /// Password is too long.
    #[error("password must be at most {MAX_PASSWORD_LENGTH} characters")]
    TooLong,

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    HashError(String),

    /// Password hash is invalid.
    #[error("invalid password hash format")]
    InvalidHash,

    /// Password verification failed (wrong password).
    #[error("password verification failed")]
    VerificationFailed,
}

impl From<PasswordError> for ForumError {
    fn from(e: PasswordError) -> Self {
        match e {
            PasswordError::TooShort | PasswordError::TooLong => {
                ForumError::Validation(e.to_string())
            }
            PasswordError::VerificationFailed => ForumError::InvalidCredentials,
            PasswordError::HashError(_) | PasswordError::InvalidHash => {
                ForumError::Auth(e.to_string())
            }
        }
    }
}

/// Build the Argon2id hasher.
///
/// Parameters:
/// - Memory cost: 19 MiB (19456 KiB)
/// - Time cost: 2 iterations
/// - Parallelism: 1 lane
fn create_argon2() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(19_456, 2, 1, None)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;
    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}

/// Hash a password using Argon2id.
///
/// Returns a PHC-formatted hash string that includes the salt and parameters.
///
/// # Examples
///
/// ```
/// use agora::hash_password;
///
/// let hash = hash_password("my_secure_password").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    check_length(password)?;

    let salt = SaltString::generate(&mut OsRng);
    let hash = create_argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
///
/// Parameters are read from the PHC string, so hashes made with other
/// settings still verify.
pub fn verify_password_hash(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::VerificationFailed)
}

/// Check a raw password against a user's stored verifier.
///
/// Returns a plain yes/no; a malformed stored hash counts as a mismatch.
pub fn verify_password(user: &User, password: &str) -> bool {
    verify_password_hash(password, &user.password_hash).is_ok()
}

fn check_length(password: &str) -> Result<(), PasswordError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::TooLong);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_hash(hash: &str) -> User {
        User {
            id: 1,
            display_name: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: hash.to_string(),
            is_admin: false,
            created_at: "2024-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn test_hash_password_success() {
        let hash = hash_password("test_password_123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("$v=19$"));
        assert!(hash.contains("m=19456"));
    }

    #[test]
    fn test_hash_password_different_salts() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_hash() {
        let hash = hash_password("correct_password").unwrap();

        assert!(verify_password_hash("correct_password", &hash).is_ok());
        assert!(matches!(
            verify_password_hash("wrong_password", &hash),
            Err(PasswordError::VerificationFailed)
        ));
        assert!(matches!(
            verify_password_hash("any_password", "not_a_valid_hash"),
            Err(PasswordError::InvalidHash)
        ));
    }

    #[test]
    fn test_verify_password_for_user() {
        let user = user_with_hash(&hash_password("correct horse").unwrap());

        assert!(verify_password(&user, "correct horse"));
        assert!(!verify_password(&user, "correct horse "));
        assert!(!verify_password(&user, ""));
    }

    #[test]
    fn test_verify_password_malformed_hash() {
        let user = user_with_hash("plaintext");
        assert!(!verify_password(&user, "plaintext"));
    }

    #[test]
    fn test_hash_password_length_limits() {
        assert!(matches!(hash_password("short"), Err(PasswordError::TooShort)));
        assert!(matches!(
            hash_password(&"a".repeat(MAX_PASSWORD_LENGTH + 1)),
            Err(PasswordError::TooLong)
        ));
        assert!(hash_password(&"a".repeat(MIN_PASSWORD_LENGTH)).is_ok());
    }

    #[test]
    fn test_password_with_unicode() {
        let password = "pässwörd✓✓";
        let hash = hash_password(password).unwrap();
        assert!(verify_password_hash(password, &hash).is_ok());
    }

    #[test]
    fn test_password_error_into_forum_error() {
        assert!(matches!(
            ForumError::from(PasswordError::TooShort),
            ForumError::Validation(_)
        ));
        assert!(matches!(
            ForumError::from(PasswordError::VerificationFailed),
            ForumError::InvalidCredentials
        ));
        assert!(matches!(
            ForumError::from(PasswordError::InvalidHash),
            ForumError::Auth(_)
        ));
    }
}
