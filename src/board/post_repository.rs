//! Post repository for Agora.

use super::post::{NewPost, Post};
use crate::db::DbPool;
use crate::error::missing_author;
use crate::Result;

const POST_COLUMNS: &str = "id, thread_id, owner_id, content, created_at, updated_at";

/// Repository for post CRUD operations.
pub struct PostRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> PostRepository<'a> {
    /// Create a new PostRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new post.
    ///
    /// Fails with `NotFound` if the author no longer exists.
    pub async fn create(&self, new_post: &NewPost) -> Result<Post> {
        let sql = format!(
            "INSERT INTO posts (thread_id, owner_id, content) VALUES (?, ?, ?)
             RETURNING {POST_COLUMNS}"
        );
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(new_post.thread_id)
            .bind(new_post.owner_id)
            .bind(&new_post.content)
            .fetch_one(self.pool)
            .await
            .map_err(missing_author)?;
        Ok(post)
    }

    /// Get a post by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?");
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(post)
    }

    /// Replace a post's body, stamping `updated_at`.
    ///
    /// Returns the updated post, or None if not found.
    pub async fn update_content(&self, id: i64, content: &str) -> Result<Option<Post>> {
        let sql = format!(
            "UPDATE posts SET content = ?, updated_at = datetime('now') WHERE id = ?
             RETURNING {POST_COLUMNS}"
        );
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(content)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(post)
    }

    /// Delete a post by ID, cascading to its comments and rolls.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List all posts in a thread, oldest first.
    pub async fn list_by_thread(&self, thread_id: i64) -> Result<Vec<Post>> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE thread_id = ?
             ORDER BY created_at ASC, id ASC"
        );
        let posts = sqlx::query_as::<_, Post>(&sql)
            .bind(thread_id)
            .fetch_all(self.pool)
            .await?;
        Ok(posts)
    }

}
