//! Thread model for Agora.

/// Thread entity. Threads live inside a board and hold posts.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Thread {
    /// Unique thread ID.
    pub id: i64,
    /// Board this thread belongs to.
    pub board_id: i64,
    /// Author; cleared when the author's account is deleted.
    pub owner_id: Option<i64>,
    /// Thread title.
    pub title: String,
    /// Opening markdown body.
    pub content: String,
    /// Read-only threads accept no new posts, comments or rolls.
    pub readonly: bool,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: Option<String>,
}

impl Thread {
    /// Check if the given user authored this thread.
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == Some(user_id)
    }
}

/// Data for creating a new thread.
#[derive(Debug, Clone)]
pub struct NewThread {
    /// Board ID.
    pub board_id: i64,
    /// Author user ID.
    pub owner_id: i64,
    /// Thread title.
    pub title: String,
    /// Opening body.
    pub content: String,
    /// Start the thread read-only.
    pub readonly: bool,
}

impl NewThread {
    /// Create a new thread.
    pub fn new(
        board_id: i64,
        owner_id: i64,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            board_id,
            owner_id,
            title: title.into(),
            content: content.into(),
            readonly: false,
        }
    }

    /// Set the read-only flag.
    pub fn with_readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }
}

/// Data for updating an existing thread.
#[derive(Debug, Clone, Default)]
pub struct ThreadUpdate {
    /// New title.
    pub title: Option<String>,
    /// New body.
    pub content: Option<String>,
    /// New read-only flag.
    pub readonly: Option<bool>,
}

impl ThreadUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set new title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set new body.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the read-only flag.
    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = Some(readonly);
        self
    }

    /// Check if the update is empty.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.readonly.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_thread() {
        let thread = NewThread::new(1, 2, "Hello", "First!").with_readonly(true);
        assert_eq!(thread.board_id, 1);
        assert_eq!(thread.owner_id, 2);
        assert_eq!(thread.title, "Hello");
        assert!(thread.readonly);
    }

    #[test]
    fn test_thread_update_builder() {
        let update = ThreadUpdate::new().title("New").readonly(true);
        assert_eq!(update.title.as_deref(), Some("New"));
        assert_eq!(update.readonly, Some(true));
        assert!(update.content.is_none());
        assert!(!update.is_empty());
        assert!(ThreadUpdate::new().is_empty());
    }
}
