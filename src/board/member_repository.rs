//! Board membership repository for Agora.

use sqlx::SqliteConnection;

use super::member::{BoardMember, MemberInfo};
use super::types::MemberRole;
use crate::db::DbPool;
use crate::error::{is_foreign_key_violation, is_unique_violation};
use crate::{ForumError, Result};

/// Repository for per-board role assignments.
pub struct MemberRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> MemberRepository<'a> {
    /// Create a new MemberRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a membership on an existing connection or transaction.
    ///
    /// Fails with `AlreadyMember` if the pair is already present, and with
    /// `NotFound` if the user does not exist.
    pub async fn insert(
        conn: &mut SqliteConnection,
        board_id: i64,
        user_id: i64,
        role: MemberRole,
    ) -> Result<BoardMember> {
        sqlx::query("INSERT INTO board_members (board_id, user_id, role) VALUES (?, ?, ?)")
            .bind(board_id)
            .bind(user_id)
            .bind(role.as_str())
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ForumError::AlreadyMember
                } else if is_foreign_key_violation(&e) {
                    ForumError::not_found("user")
                } else {
                    ForumError::from(e)
                }
            })?;

        Ok(BoardMember {
            board_id,
            user_id,
            role,
        })
    }

    /// Add a user to a board with the given role.
    pub async fn add(&self, board_id: i64, user_id: i64, role: MemberRole) -> Result<BoardMember> {
        let mut conn = self.pool.acquire().await?;
        Self::insert(&mut conn, board_id, user_id, role).await
    }

    /// Remove a user from a board.
    ///
    /// Fails with `NotAMember` if the user holds no membership, and with
    /// `Forbidden` if the user is the board's only Owner. The owner count is
    /// checked inside the DELETE so concurrent removals cannot both pass it.
    pub async fn remove(&self, board_id: i64, user_id: i64) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM board_members
             WHERE board_id = ? AND user_id = ?
               AND (role <> 'owner' OR (
                   SELECT COUNT(*) FROM board_members
                   WHERE board_id = ? AND role = 'owner') > 1)",
        )
        .bind(board_id)
        .bind(user_id)
        .bind(board_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.unchanged_reason(board_id, user_id).await?);
        }
        Ok(())
    }

    /// Get the role a user holds in a board, if any.
    pub async fn role_of(&self, board_id: i64, user_id: i64) -> Result<Option<MemberRole>> {
        let role: Option<String> =
            sqlx::query_scalar("SELECT role FROM board_members WHERE board_id = ? AND user_id = ?")
                .bind(board_id)
                .bind(user_id)
                .fetch_optional(self.pool)
                .await?;

        role.map(|r| r.parse().map_err(ForumError::Database))
            .transpose()
    }

    /// Change an existing member's role.
    ///
    /// Fails with `NotAMember` if the user holds no membership, and with
    /// `Forbidden` if this would demote the board's only Owner.
    pub async fn set_role(
        &self,
        board_id: i64,
        user_id: i64,
        role: MemberRole,
    ) -> Result<BoardMember> {
        let result = sqlx::query(
            "UPDATE board_members SET role = ?
             WHERE board_id = ? AND user_id = ?
               AND (role <> 'owner' OR ? = 'owner' OR (
                   SELECT COUNT(*) FROM board_members
                   WHERE board_id = ? AND role = 'owner') > 1)",
        )
        .bind(role.as_str())
        .bind(board_id)
        .bind(user_id)
        .bind(role.as_str())
        .bind(board_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.unchanged_reason(board_id, user_id).await?);
        }
        Ok(BoardMember {
            board_id,
            user_id,
            role,
        })
    }

    /// Why a guarded write touched no row.
    async fn unchanged_reason(&self, board_id: i64, user_id: i64) -> Result<ForumError> {
        Ok(match self.role_of(board_id, user_id).await? {
            None => ForumError::NotAMember,
            Some(_) => ForumError::forbidden("a board must keep at least one owner"),
        })
    }

    /// List a board's members, owners first, then by display name.
    pub async fn list_members(&self, board_id: i64) -> Result<Vec<MemberInfo>> {
        let rows: Vec<(i64, String, String)> = sqlx::query_as(
            "SELECT users.id, users.display_name, board_members.role
             FROM board_members
             JOIN users ON users.id = board_members.user_id
             WHERE board_members.board_id = ?
             ORDER BY CASE board_members.role
                          WHEN 'owner' THEN 0
                          WHEN 'admin' THEN 1
                          ELSE 2
                      END,
                      users.display_name",
        )
        .bind(board_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|(user_id, display_name, role)| {
                Ok(MemberInfo {
                    user_id,
                    display_name,
                    role: role.parse().map_err(ForumError::Database)?,
                })
            })
            .collect()
    }
}
