//! User model for Agora.

/// User entity representing a registered account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Display name (unique, case-insensitive).
    pub display_name: String,
    /// Email address (unique, case-insensitive). Used to log in.
    pub email: String,
    /// Password verifier (Argon2 PHC string). Never the plaintext.
    pub password_hash: String,
    /// Site administrator flag.
    pub is_admin: bool,
    /// Account creation timestamp.
    pub created_at: String,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub display_name: String,
    /// Email address.
    pub email: String,
    /// Password hash (must already be hashed).
    pub password_hash: String,
    /// Site administrator flag (defaults to false).
    pub is_admin: bool,
}

impl NewUser {
    /// Create a new user with the required fields.
    pub fn new(
        display_name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            is_admin: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_builder() {
        let user = NewUser::new("alice", "alice@example.com", "hash");

        assert_eq!(user.display_name, "alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.password_hash, "hash");
    }

    #[test]
    fn test_new_user_defaults() {
        let user = NewUser::new("bob", "bob@example.com", "hash");
        assert!(!user.is_admin);
    }
}
