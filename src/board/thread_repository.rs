//! Thread repository for Agora.
//!
//! This module provides CRUD operations for threads in the database.

use sqlx::{QueryBuilder, Sqlite};

use super::thread::{NewThread, Thread, ThreadUpdate};
use crate::db::DbPool;
use crate::error::missing_author;
use crate::Result;

const THREAD_COLUMNS: &str =
    "id, board_id, owner_id, title, content, readonly, created_at, updated_at";

/// Repository for thread CRUD operations.
pub struct ThreadRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ThreadRepository<'a> {
    /// Create a new ThreadRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new thread.
    ///
    /// Fails with `NotFound` if the author no longer exists.
    pub async fn create(&self, new_thread: &NewThread) -> Result<Thread> {
        let sql = format!(
            "INSERT INTO threads (board_id, owner_id, title, content, readonly)
             VALUES (?, ?, ?, ?, ?) RETURNING {THREAD_COLUMNS}"
        );
        let thread = sqlx::query_as::<_, Thread>(&sql)
            .bind(new_thread.board_id)
            .bind(new_thread.owner_id)
            .bind(&new_thread.title)
            .bind(&new_thread.content)
            .bind(new_thread.readonly)
            .fetch_one(self.pool)
            .await
            .map_err(missing_author)?;
        Ok(thread)
    }

    /// Get a thread by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Thread>> {
        let sql = format!("SELECT {THREAD_COLUMNS} FROM threads WHERE id = ?");
        let thread = sqlx::query_as::<_, Thread>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(thread)
    }

    /// Update a thread by ID, stamping `updated_at`.
    ///
    /// Returns the updated thread, or None if not found.
    pub async fn update(&self, id: i64, update: &ThreadUpdate) -> Result<Option<Thread>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("UPDATE threads SET updated_at = datetime('now')");
        if let Some(ref title) = update.title {
            query.push(", title = ").push_bind(title.clone());
        }
        if let Some(ref content) = update.content {
            query.push(", content = ").push_bind(content.clone());
        }
        if let Some(readonly) = update.readonly {
            query.push(", readonly = ").push_bind(readonly);
        }
        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {THREAD_COLUMNS}"));

        let thread = query
            .build_query_as::<Thread>()
            .fetch_optional(self.pool)
            .await?;
        Ok(thread)
    }

    /// Delete a thread by ID, cascading to its posts.
    ///
    /// Returns false if not found.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM threads WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List a page of a board's threads, newest first.
    pub async fn list_by_board_paginated(
        &self,
        board_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Thread>> {
        let sql = format!(
            "SELECT {THREAD_COLUMNS} FROM threads WHERE board_id = ?
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        );
        let threads = sqlx::query_as::<_, Thread>(&sql)
            .bind(board_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;
        Ok(threads)
    }

    /// Count threads in a board.
    pub async fn count_by_board(&self, board_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM threads WHERE board_id = ?")
            .bind(board_id)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
