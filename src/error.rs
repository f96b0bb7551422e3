//! Error types for Agora.

use thiserror::Error;

/// Common error type for Agora.
#[derive(Error, Debug)]
pub enum ForumError {
    /// Database error.
    ///
    /// Wraps any store failure that has no more specific meaning.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// A unique identity field (display name or email) is already taken.
    #[error("{0} is already registered")]
    DuplicateIdentity(String),

    /// The user already holds a membership row for the board.
    #[error("user is already a member of this board")]
    AlreadyMember,

    /// The user holds no membership row for the board.
    #[error("user is not a member of this board")]
    NotAMember,

    /// Email matched a user but the password did not verify.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Authentication token problem.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Access policy rejected the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Field-level input was rejected.
    #[error("validation error: {0}")]
    Validation(String),
}

impl ForumError {
    /// Shorthand for a `NotFound` error naming the missing entity.
    pub fn not_found(what: &str) -> Self {
        ForumError::NotFound(what.to_string())
    }

    /// Shorthand for a `Forbidden` error.
    pub fn forbidden(reason: impl Into<String>) -> Self {
        ForumError::Forbidden(reason.into())
    }
}

impl From<sqlx::Error> for ForumError {
    fn from(e: sqlx::Error) -> Self {
        ForumError::Database(e.to_string())
    }
}

/// Returns true when a store error is a unique-constraint violation.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

/// Returns true when a store error is a foreign-key violation.
pub(crate) fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.is_foreign_key_violation(),
        _ => false,
    }
}

/// Map a failed insert of authored content.
///
/// Parents are looked up before the insert, so a foreign-key failure means
/// the author was deleted while still holding a valid token.
pub(crate) fn missing_author(e: sqlx::Error) -> ForumError {
    if is_foreign_key_violation(&e) {
        ForumError::not_found("user")
    } else {
        ForumError::from(e)
    }
}

/// Result type alias for Agora operations.
pub type Result<T> = std::result::Result<T, ForumError>;
