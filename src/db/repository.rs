//! User repository for Agora.
//!
//! This module provides CRUD operations for users in the database.

use super::user::{NewUser, User};
use super::DbPool;
use crate::error::is_unique_violation;
use crate::{ForumError, Result};

const USER_COLUMNS: &str = "id, display_name, email, password_hash, is_admin, created_at";

/// Repository for user CRUD operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    ///
    /// A collision on display name or email is reported as
    /// `DuplicateIdentity` naming the colliding field.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let sql = format!(
            "INSERT INTO users (display_name, email, password_hash, is_admin)
             VALUES (?, ?, ?, ?) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&new_user.display_name)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(new_user.is_admin)
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ForumError::DuplicateIdentity(colliding_field(&e).to_string())
                } else {
                    ForumError::from(e)
                }
            })
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Get a user by email (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Check if a display name is already taken (case-insensitive).
    pub async fn display_name_exists(&self, display_name: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE display_name = ?)")
                .bind(display_name)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Check if an email is already registered (case-insensitive).
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
            .bind(email)
            .fetch_one(self.pool)
            .await?;
        Ok(exists)
    }

    /// Delete a user by ID.
    ///
    /// Memberships and comments go with the user; threads and posts stay
    /// with their owner reference cleared. Returns false if not found.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count all users.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

/// Name the unique column a constraint violation refers to.
fn colliding_field(e: &sqlx::Error) -> &'static str {
    let message = match e {
        sqlx::Error::Database(db_err) => db_err.message().to_string(),
        _ => String::new(),
    };
    if message.contains("users.email") {
        "email"
    } else {
        "display name"
    }
}
