//! Input validation for Agora registration and login.
//!
//! Each check returns a `ValidationError` naming the offending field, which
//! converts into `ForumError::Validation` at the service boundary.

use thiserror::Error;

use crate::ForumError;

/// Maximum display name length, in characters.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 32;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length, in characters.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum email length.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Display name is empty or whitespace.
    #[error("display name is required")]
    DisplayNameEmpty,

    /// Display name is too long.
    #[error("display name must be at most {MAX_DISPLAY_NAME_LENGTH} characters")]
    DisplayNameTooLong,

    /// Display name contains control characters.
    #[error("display name contains invalid characters")]
    DisplayNameInvalidChars,

    /// Email is empty.
    #[error("email is required")]
    EmailEmpty,

    /// Email is too long.
    #[error("email must be at most {MAX_EMAIL_LENGTH} characters")]
    EmailTooLong,

    /// Email format is invalid.
    #[error("invalid email format")]
    EmailInvalidFormat,

    /// Password is too short.
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,

    /// Password is too long.
    #[error("password must be at most {MAX_PASSWORD_LENGTH} characters")]
    PasswordTooLong,

    /// Confirmation does not match the password.
    #[error("passwords must match")]
    PasswordMismatch,
}

impl ValidationError {
    /// Name of the form field this error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::DisplayNameEmpty | Self::DisplayNameTooLong | Self::DisplayNameInvalidChars => {
                "display_name"
            }
            Self::EmailEmpty | Self::EmailTooLong | Self::EmailInvalidFormat => "email",
            Self::PasswordTooShort | Self::PasswordTooLong => "password",
            Self::PasswordMismatch => "confirm_password",
        }
    }
}

impl From<ValidationError> for ForumError {
    fn from(e: ValidationError) -> Self {
        ForumError::Validation(format!("{}: {}", e.field(), e))
    }
}

/// Validate a display name.
///
/// Requirements:
/// - Not blank
/// - At most 32 characters
/// - No control characters
///
/// # Examples
///
/// ```
/// use agora::auth::validation::validate_display_name;
///
/// assert!(validate_display_name("Jane Doe").is_ok());
/// assert!(validate_display_name("   ").is_err());
/// ```
pub fn validate_display_name(display_name: &str) -> Result<(), ValidationError> {
    if display_name.trim().is_empty() {
        return Err(ValidationError::DisplayNameEmpty);
    }
    if display_name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
        return Err(ValidationError::DisplayNameTooLong);
    }
    if display_name.chars().any(|c| c.is_control()) {
        return Err(ValidationError::DisplayNameInvalidChars);
    }
    Ok(())
}

/// Validate an email address.
///
/// This is a structural check only: one `@`, a non-empty local part and a
/// dotted domain without empty labels or whitespace.
///
/// # Examples
///
/// ```
/// use agora::auth::validation::validate_email;
///
/// assert!(validate_email("user@example.com").is_ok());
/// assert!(validate_email("invalid").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmailEmpty);
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::EmailTooLong);
    }
    if email.chars().any(|c| c.is_whitespace()) {
        return Err(ValidationError::EmailInvalidFormat);
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or(ValidationError::EmailInvalidFormat)?;
    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(ValidationError::EmailInvalidFormat);
    }
    if domain.split('.').any(str::is_empty) {
        return Err(ValidationError::EmailInvalidFormat);
    }

    Ok(())
}

/// Validate a password's length.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooLong);
    }
    Ok(())
}

/// Check that the confirmation field repeats the password exactly.
pub fn validate_password_confirmation(
    password: &str,
    confirmation: &str,
) -> Result<(), ValidationError> {
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Validate all registration fields at once.
///
/// Returns the first validation error encountered. The confirmation is only
/// checked when one was supplied.
pub fn validate_registration(
    display_name: &str,
    email: &str,
    password: &str,
    confirmation: Option<&str>,
) -> Result<(), ValidationError> {
    validate_display_name(display_name)?;
    validate_email(email)?;
    validate_password(password)?;
    if let Some(confirmation) = confirmation {
        validate_password_confirmation(password, confirmation)?;
    }
    Ok(())
}
