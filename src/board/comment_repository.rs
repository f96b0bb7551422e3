//! Comment and roll result repositories for Agora.

use super::post::{Comment, NewComment, NewRollResult, RollResult};
use crate::db::DbPool;
use crate::error::missing_author;
use crate::Result;

const COMMENT_COLUMNS: &str = "id, post_id, owner_id, content, created_at, updated_at";

const ROLL_COLUMNS: &str = "id, post_id, roll, label, result, created_at";

/// Repository for comment CRUD operations.
pub struct CommentRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> CommentRepository<'a> {
    /// Create a new CommentRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new comment.
    ///
    /// Fails with `NotFound` if the author no longer exists.
    pub async fn create(&self, new_comment: &NewComment) -> Result<Comment> {
        let sql = format!(
            "INSERT INTO comments (post_id, owner_id, content) VALUES (?, ?, ?)
             RETURNING {COMMENT_COLUMNS}"
        );
        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(new_comment.post_id)
            .bind(new_comment.owner_id)
            .bind(&new_comment.content)
            .fetch_one(self.pool)
            .await
            .map_err(missing_author)?;
        Ok(comment)
    }

    /// Get a comment by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?");
        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(comment)
    }

    /// Replace a comment's body, stamping `updated_at`.
    pub async fn update_content(&self, id: i64, content: &str) -> Result<Option<Comment>> {
        let sql = format!(
            "UPDATE comments SET content = ?, updated_at = datetime('now') WHERE id = ?
             RETURNING {COMMENT_COLUMNS}"
        );
        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(content)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(comment)
    }

    /// Delete a comment by ID.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List comments on a post, oldest first.
    pub async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = ?
             ORDER BY created_at ASC, id ASC"
        );
        let comments = sqlx::query_as::<_, Comment>(&sql)
            .bind(post_id)
            .fetch_all(self.pool)
            .await?;
        Ok(comments)
    }

    /// List every comment on every post of a thread, oldest first.
    pub async fn list_by_thread(&self, thread_id: i64) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT comments.id, comments.post_id, comments.owner_id, comments.content,
                    comments.created_at, comments.updated_at
             FROM comments
             JOIN posts ON posts.id = comments.post_id
             WHERE posts.thread_id = ?
             ORDER BY comments.created_at ASC, comments.id ASC",
        )
        .bind(thread_id)
        .fetch_all(self.pool)
        .await?;
        Ok(comments)
    }
}

/// Repository for dice roll results.
///
/// Rolls are append-only: there is no update.
pub struct RollRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> RollRepository<'a> {
    /// Create a new RollRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Record a roll.
    pub async fn create(&self, new_roll: &NewRollResult) -> Result<RollResult> {
        let sql = format!(
            "INSERT INTO roll_results (post_id, roll, label, result) VALUES (?, ?, ?, ?)
             RETURNING {ROLL_COLUMNS}"
        );
        let roll = sqlx::query_as::<_, RollResult>(&sql)
            .bind(new_roll.post_id)
            .bind(&new_roll.roll)
            .bind(&new_roll.label)
            .bind(new_roll.result)
            .fetch_one(self.pool)
            .await?;
        Ok(roll)
    }

    /// List rolls on a post, oldest first.
    pub async fn list_by_post(&self, post_id: i64) -> Result<Vec<RollResult>> {
        let sql = format!(
            "SELECT {ROLL_COLUMNS} FROM roll_results WHERE post_id = ?
             ORDER BY created_at ASC, id ASC"
        );
        let rolls = sqlx::query_as::<_, RollResult>(&sql)
            .bind(post_id)
            .fetch_all(self.pool)
            .await?;
        Ok(rolls)
    }

    /// List every roll on every post of a thread, oldest first.
    pub async fn list_by_thread(&self, thread_id: i64) -> Result<Vec<RollResult>> {
        let rolls = sqlx::query_as::<_, RollResult>(
            "SELECT roll_results.id, roll_results.post_id, roll_results.roll,
                    roll_results.label, roll_results.result, roll_results.created_at
             FROM roll_results
             JOIN posts ON posts.id = roll_results.post_id
             WHERE posts.thread_id = ?
             ORDER BY roll_results.created_at ASC, roll_results.id ASC",
        )
        .bind(thread_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rolls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{
        BoardRepository, NewBoard, NewPost, NewThread, PostRepository, ThreadRepository,
    };
    use crate::db::{NewUser, UserRepository};
    use crate::Database;

    async fn setup() -> (Database, i64, i64, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("alice", "alice@example.com", "hash"))
            .await
            .unwrap();
        let board = BoardRepository::new(db.pool())
            .create(&NewBoard::new("General"))
            .await
            .unwrap();
        let thread = ThreadRepository::new(db.pool())
            .create(&NewThread::new(board.id, user.id, "Hello", "World"))
            .await
            .unwrap();
        let post = PostRepository::new(db.pool())
            .create(&NewPost::new(thread.id, user.id, "post"))
            .await
            .unwrap();
        (db, thread.id, post.id, user.id)
    }

    #[tokio::test]
    async fn test_comment_crud() {
        let (db, thread_id, post_id, user_id) = setup().await;
        let repo = CommentRepository::new(db.pool());

        let comment = repo
            .create(&NewComment::new(post_id, user_id, "nice"))
            .await
            .unwrap();
        assert_eq!(comment.owner_id, user_id);

        let updated = repo
            .update_content(comment.id, "very nice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.content, "very nice");
        assert!(updated.updated_at.is_some());

        assert_eq!(repo.list_by_post(post_id).await.unwrap().len(), 1);
        assert_eq!(repo.list_by_thread(thread_id).await.unwrap().len(), 1);

        assert!(repo.delete(comment.id).await.unwrap());
        assert!(repo.get_by_id(comment.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rolls() {
        let (db, thread_id, post_id, _) = setup().await;
        let repo = RollRepository::new(db.pool());

        let roll = repo
            .create(&NewRollResult::new(post_id, "2d6", 7).with_label("attack"))
            .await
            .unwrap();
        assert_eq!(roll.result, 7);
        assert_eq!(roll.label.as_deref(), Some("attack"));

        repo.create(&NewRollResult::new(post_id, "d20", 12))
            .await
            .unwrap();

        let rolls = repo.list_by_post(post_id).await.unwrap();
        assert_eq!(rolls.len(), 2);
        assert_eq!(rolls[0].roll, "2d6");
        assert_eq!(repo.list_by_thread(thread_id).await.unwrap().len(), 2);
    }
}
