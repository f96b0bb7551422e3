//! Board repository for Agora.
//!
//! This module provides CRUD operations for boards in the database.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::types::{Board, BoardUpdate, MemberRole, NewBoard};
use crate::db::DbPool;
use crate::{ForumError, Result};

const BOARD_COLUMNS: &str =
    "boards.id, boards.title, boards.description, boards.content, boards.visibility, \
     boards.created_at, boards.updated_at";

const RETURNING_COLUMNS: &str =
    "id, title, description, content, visibility, created_at, updated_at";

/// Repository for board CRUD operations.
pub struct BoardRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> BoardRepository<'a> {
    /// Create a new BoardRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a board on an existing connection or transaction.
    pub async fn insert(conn: &mut SqliteConnection, new_board: &NewBoard) -> Result<Board> {
        let sql = format!(
            "INSERT INTO boards (title, description, content, visibility)
             VALUES (?, ?, ?, ?) RETURNING {RETURNING_COLUMNS}"
        );
        let row: BoardRow = sqlx::query_as(&sql)
            .bind(&new_board.title)
            .bind(&new_board.description)
            .bind(&new_board.content)
            .bind(new_board.visibility.as_str())
            .fetch_one(&mut *conn)
            .await?;
        row.into_board()
    }

    /// Create a new board in the database.
    ///
    /// This does not add an owner; use `BoardService::create_board` for that.
    pub async fn create(&self, new_board: &NewBoard) -> Result<Board> {
        let mut conn = self.pool.acquire().await?;
        Self::insert(&mut conn, new_board).await
    }

    /// Get a board by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Board>> {
        let sql = format!("SELECT {BOARD_COLUMNS} FROM boards WHERE id = ?");
        let row: Option<BoardRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        row.map(BoardRow::into_board).transpose()
    }

    /// Update a board by ID.
    ///
    /// Only fields that are set in the update will be modified, and
    /// `updated_at` is stamped. Returns the updated board, or None if not found.
    pub async fn update(&self, id: i64, update: &BoardUpdate) -> Result<Option<Board>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("UPDATE boards SET updated_at = datetime('now')");

        if let Some(ref title) = update.title {
            query.push(", title = ").push_bind(title.clone());
        }
        if let Some(ref description) = update.description {
            query.push(", description = ").push_bind(description.clone());
        }
        if let Some(ref content) = update.content {
            query.push(", content = ").push_bind(content.clone());
        }
        if let Some(visibility) = update.visibility {
            query
                .push(", visibility = ")
                .push_bind(visibility.as_str().to_string());
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {RETURNING_COLUMNS}"));

        let row: Option<BoardRow> = query.build_query_as().fetch_optional(self.pool).await?;
        row.map(BoardRow::into_board).transpose()
    }

    /// Delete a board by ID.
    ///
    /// Members, threads, posts, comments and rolls go with it through the
    /// foreign key cascades. Returns false if not found.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM boards WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List the boards `user_id` may see in the index, newest first, at most
    /// `limit`, each paired with the role the user holds in it (None for
    /// anonymous viewers or non-members).
    ///
    /// Hidden boards are only listed for their members.
    pub async fn list_with_roles(
        &self,
        user_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<(Board, Option<MemberRole>)>> {
        let sql = format!(
            "SELECT {BOARD_COLUMNS}, board_members.role AS member_role
             FROM boards
             LEFT JOIN board_members
                    ON board_members.board_id = boards.id AND board_members.user_id = ?
             WHERE boards.visibility <> 'hidden' OR board_members.user_id IS NOT NULL
             ORDER BY boards.created_at DESC, boards.id DESC
             LIMIT ?"
        );
        let rows: Vec<BoardWithRoleRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(limit.max(0))
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(BoardWithRoleRow::into_pair).collect()
    }

}

/// Internal struct for mapping database rows to Board.
#[derive(sqlx::FromRow)]
struct BoardRow {
    id: i64,
    title: String,
    description: Option<String>,
    content: Option<String>,
    visibility: String,
    created_at: String,
    updated_at: Option<String>,
}

impl BoardRow {
    fn into_board(self) -> Result<Board> {
        let visibility = self.visibility.parse().map_err(ForumError::Database)?;
        Ok(Board {
            id: self.id,
            title: self.title,
            description: self.description,
            content: self.content,
            visibility,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BoardWithRoleRow {
    #[sqlx(flatten)]
    board: BoardRow,
    member_role: Option<String>,
}

impl BoardWithRoleRow {
    fn into_pair(self) -> Result<(Board, Option<MemberRole>)> {
        let role = self
            .member_role
            .map(|r| r.parse::<MemberRole>().map_err(ForumError::Database))
            .transpose()?;
        Ok((self.board.into_board()?, role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{MemberRepository, Visibility};
    use crate::db::{NewUser, UserRepository};
    use crate::Database;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_create_board() {
        let db = setup_db().await;
        let repo = BoardRepository::new(db.pool());

        let board = repo.create(&NewBoard::new("General")).await.unwrap();

        assert_eq!(board.id, 1);
        assert_eq!(board.title, "General");
        assert_eq!(board.visibility, Visibility::Public);
        assert!(board.description.is_none());
        assert!(board.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_create_board_with_options() {
        let db = setup_db().await;
        let repo = BoardRepository::new(db.pool());

        let board = repo
            .create(
                &NewBoard::new("Staff")
                    .with_description("Staff only")
                    .with_content("*rules*")
                    .with_visibility(Visibility::Hidden),
            )
            .await
            .unwrap();

        assert_eq!(board.description.as_deref(), Some("Staff only"));
        assert_eq!(board.content.as_deref(), Some("*rules*"));
        assert_eq!(board.visibility, Visibility::Hidden);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let db = setup_db().await;
        let repo = BoardRepository::new(db.pool());

        let created = repo.create(&NewBoard::new("General")).await.unwrap();
        assert_eq!(
            repo.get_by_id(created.id).await.unwrap().unwrap().title,
            "General"
        );
        assert!(repo.get_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_board() {
        let db = setup_db().await;
        let repo = BoardRepository::new(db.pool());

        let board = repo
            .create(&NewBoard::new("General").with_description("old"))
            .await
            .unwrap();

        let updated = repo
            .update(
                board.id,
                &BoardUpdate::new()
                    .title("Renamed")
                    .description(None)
                    .visibility(Visibility::Private),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert!(updated.description.is_none());
        assert_eq!(updated.visibility, Visibility::Private);
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_update_empty_and_missing() {
        let db = setup_db().await;
        let repo = BoardRepository::new(db.pool());

        let board = repo.create(&NewBoard::new("General")).await.unwrap();
        let unchanged = repo
            .update(board.id, &BoardUpdate::new())
            .await
            .unwrap()
            .unwrap();
        assert!(unchanged.updated_at.is_none());

        let missing = repo
            .update(999, &BoardUpdate::new().title("x"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_delete_board() {
        let db = setup_db().await;
        let repo = BoardRepository::new(db.pool());

        let board = repo.create(&NewBoard::new("General")).await.unwrap();
        assert!(repo.delete(board.id).await.unwrap());
        assert!(!repo.delete(board.id).await.unwrap());
        assert!(repo.get_by_id(board.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_with_roles() {
        let db = setup_db().await;
        let repo = BoardRepository::new(db.pool());
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("alice", "alice@example.com", "hash"))
            .await
            .unwrap();

        let first = repo.create(&NewBoard::new("First")).await.unwrap();
        let second = repo
            .create(&NewBoard::new("Second").with_visibility(Visibility::Hidden))
            .await
            .unwrap();
        MemberRepository::new(db.pool())
            .add(second.id, user.id, MemberRole::Admin)
            .await
            .unwrap();

        let listed = repo.list_with_roles(Some(user.id), 10).await.unwrap();
        assert_eq!(listed.len(), 2);
        // Same-second timestamps fall back to id order, newest first.
        assert_eq!(listed[0].0.id, second.id);
        assert_eq!(listed[0].1, Some(MemberRole::Admin));
        assert_eq!(listed[1].0.id, first.id);
        assert_eq!(listed[1].1, None);

        let limited = repo.list_with_roles(Some(user.id), 1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].0.id, second.id);
        assert!(repo.list_with_roles(Some(user.id), -5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_with_roles_skips_hidden_boards_for_outsiders() {
        let db = setup_db().await;
        let repo = BoardRepository::new(db.pool());
        let users = UserRepository::new(db.pool());
        let alice = users
            .create(&NewUser::new("alice", "alice@example.com", "hash"))
            .await
            .unwrap();
        let bob = users
            .create(&NewUser::new("bob", "bob@example.com", "hash"))
            .await
            .unwrap();

        let mut visible = Vec::new();
        for i in 0..3 {
            visible.push(repo.create(&NewBoard::new(format!("Open {i}"))).await.unwrap().id);
            let hidden = repo
                .create(&NewBoard::new(format!("Hidden {i}")).with_visibility(Visibility::Hidden))
                .await
                .unwrap();
            MemberRepository::new(db.pool())
                .add(hidden.id, alice.id, MemberRole::Owner)
                .await
                .unwrap();
        }
        visible.reverse();

        // The limit applies after hidden boards are dropped.
        for viewer in [Some(bob.id), None] {
            let ids: Vec<i64> = repo
                .list_with_roles(viewer, 3)
                .await
                .unwrap()
                .into_iter()
                .map(|(board, _)| board.id)
                .collect();
            assert_eq!(ids, visible);
        }

        let alice_view = repo.list_with_roles(Some(alice.id), 10).await.unwrap();
        assert_eq!(alice_view.len(), 6);
    }
}
