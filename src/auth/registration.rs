//! User registration and login for Agora.

use tracing::{info, warn};

use crate::auth::validation::{validate_email, validate_registration};
use crate::auth::{hash_password, verify_password};
use crate::db::{NewUser, User, UserRepository};
use crate::{ForumError, Result};

/// Registration request data.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Desired display name (unique, case-insensitive).
    pub display_name: String,
    /// Email address used to log in (unique, case-insensitive).
    pub email: String,
    /// Raw password (8-128 characters).
    pub password: String,
    /// Optional repeat of the password.
    pub confirm_password: Option<String>,
}

impl RegistrationRequest {
    /// Create a new registration request.
    pub fn new(
        display_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            email: email.into(),
            password: password.into(),
            confirm_password: None,
        }
    }

    /// Set the password confirmation.
    pub fn with_confirmation(mut self, confirm_password: impl Into<String>) -> Self {
        self.confirm_password = Some(confirm_password.into());
        self
    }
}

/// The identity attached to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSubject {
    /// User ID.
    pub user_id: i64,
    /// Display name at the time of authentication.
    pub display_name: String,
    /// Site administrator flag.
    pub is_admin: bool,
}

impl From<&User> for AuthSubject {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            display_name: user.display_name.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Register a new user.
///
/// This function:
/// 1. Validates all input fields
/// 2. Rejects a display name or email that is already taken
/// 3. Hashes the password
/// 4. Creates the user in the database
///
/// The unique indexes still guard against a concurrent registration slipping
/// between steps 2 and 4; that case surfaces as the same `DuplicateIdentity`.
pub async fn register(repo: &UserRepository<'_>, request: RegistrationRequest) -> Result<User> {
    let display_name = request.display_name.trim();
    let email = request.email.trim();

    validate_registration(
        display_name,
        email,
        &request.password,
        request.confirm_password.as_deref(),
    )?;

    if repo.display_name_exists(display_name).await? {
        return Err(ForumError::DuplicateIdentity("display name".to_string()));
    }
    if repo.email_exists(email).await? {
        return Err(ForumError::DuplicateIdentity("email".to_string()));
    }

    let password_hash = hash_password(&request.password)?;
    let user = repo
        .create(&NewUser::new(display_name, email, password_hash))
        .await?;

    info!(user_id = user.id, display_name = %user.display_name, "user registered");
    Ok(user)
}

/// Authenticate a user by email and password.
///
/// Returns `NotFound` when no account uses the email and
/// `InvalidCredentials` when the password does not verify.
pub async fn authenticate(
    repo: &UserRepository<'_>,
    email: &str,
    password: &str,
) -> Result<(User, AuthSubject)> {
    let email = email.trim();
    validate_email(email)?;

    let user = repo
        .get_by_email(email)
        .await?
        .ok_or_else(|| ForumError::not_found("user"))?;

    if !verify_password(&user, password) {
        warn!(user_id = user.id, "login failed: invalid password");
        return Err(ForumError::InvalidCredentials);
    }

    info!(user_id = user.id, "user logged in");
    let subject = AuthSubject::from(&user);
    Ok((user, subject))
}
