//! Post, comment and roll result models for Agora.

/// Post entity. Posts are replies inside a thread.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Post {
    /// Unique post ID.
    pub id: i64,
    /// Thread this post belongs to.
    pub thread_id: i64,
    /// Author; cleared when the author's account is deleted.
    pub owner_id: Option<i64>,
    /// Markdown body.
    pub content: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: Option<String>,
}

impl Post {
    /// Check if the given user authored this post.
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == Some(user_id)
    }
}

/// Data for creating a new post.
#[derive(Debug, Clone)]
pub struct NewPost {
    /// Thread ID.
    pub thread_id: i64,
    /// Author user ID.
    pub owner_id: i64,
    /// Body.
    pub content: String,
}

impl NewPost {
    /// Create a new post.
    pub fn new(thread_id: i64, owner_id: i64, content: impl Into<String>) -> Self {
        Self {
            thread_id,
            owner_id,
            content: content.into(),
        }
    }
}

/// Comment entity. Comments hang off a single post.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    /// Unique comment ID.
    pub id: i64,
    /// Post this comment belongs to.
    pub post_id: i64,
    /// Author. Comments are removed with their author.
    pub owner_id: i64,
    /// Body.
    pub content: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: Option<String>,
}

/// Data for creating a new comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    /// Post ID.
    pub post_id: i64,
    /// Author user ID.
    pub owner_id: i64,
    /// Body.
    pub content: String,
}

impl NewComment {
    /// Create a new comment.
    pub fn new(post_id: i64, owner_id: i64, content: impl Into<String>) -> Self {
        Self {
            post_id,
            owner_id,
            content: content.into(),
        }
    }
}

/// A dice roll recorded against a post.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RollResult {
    /// Unique roll ID.
    pub id: i64,
    /// Post this roll belongs to.
    pub post_id: i64,
    /// Dice expression as entered, e.g. `2d6+3`.
    pub roll: String,
    /// Optional label ("attack", "damage").
    pub label: Option<String>,
    /// Total.
    pub result: i64,
    /// Creation timestamp.
    pub created_at: String,
}

/// Data for recording a roll.
#[derive(Debug, Clone)]
pub struct NewRollResult {
    /// Post ID.
    pub post_id: i64,
    /// Dice expression.
    pub roll: String,
    /// Optional label.
    pub label: Option<String>,
    /// Total.
    pub result: i64,
}

impl NewRollResult {
    /// Create a new roll result.
    pub fn new(post_id: i64, roll: impl Into<String>, result: i64) -> Self {
        Self {
            post_id,
            roll: roll.into(),
            label: None,
            result,
        }
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
