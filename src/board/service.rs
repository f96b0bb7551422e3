//! Board service for Agora.
//!
//! This module provides high-level operations for boards, memberships,
//! threads, posts, comments and dice rolls with built-in permission checking
//! and pagination support. Every operation takes the acting viewer
//! explicitly.
//!
//! Lookups below a board always verify containment: a thread that exists but
//! belongs to another board is reported as `NotFound`, exactly like a thread
//! that does not exist. A board the viewer may not see is also `NotFound`.

use tracing::info;

use crate::auth::AuthSubject;
use crate::db::{Database, UserRepository};
use crate::dice::{self, RollOutcome};
use crate::{ForumError, Result};

use super::comment_repository::{CommentRepository, RollRepository};
use super::member::{BoardMember, MemberInfo};
use super::member_repository::MemberRepository;
use super::policy::{self, Standing};
use super::post::{Comment, NewComment, NewPost, NewRollResult, Post, RollResult};
use super::post_repository::PostRepository;
use super::repository::BoardRepository;
use super::thread::{NewThread, Thread, ThreadUpdate};
use super::thread_repository::ThreadRepository;
use super::types::{Board, BoardUpdate, MemberRole, NewBoard};

/// Maximum length for board and thread titles (in characters).
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length for any markdown body (in characters).
pub const MAX_BODY_LENGTH: usize = 20_000;

/// Maximum length for a roll label (in characters).
pub const MAX_LABEL_LENGTH: usize = 64;

/// Maximum length for a dice expression (in characters).
pub const MAX_ROLL_LENGTH: usize = 128;

/// Validate a title string.
fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(ForumError::Validation("title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ForumError::Validation(format!(
            "title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a body that may be empty.
fn validate_optional_body(body: &str) -> Result<()> {
    if body.chars().count() > MAX_BODY_LENGTH {
        return Err(ForumError::Validation(format!(
            "content must be at most {MAX_BODY_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a body that must have text.
fn validate_body(body: &str) -> Result<()> {
    if body.trim().is_empty() {
        return Err(ForumError::Validation("content is required".to_string()));
    }
    validate_optional_body(body)
}

/// Who is performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    /// Not signed in.
    Anonymous,
    /// Signed in as the given user ID.
    User(i64),
}

impl Viewer {
    /// The signed-in user's ID, if any.
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User(id) => Some(*id),
        }
    }

    /// The signed-in user's ID, or an authentication error.
    fn require_user(&self) -> Result<i64> {
        self.user_id()
            .ok_or_else(|| ForumError::Auth("authentication required".to_string()))
    }
}

impl From<Option<&AuthSubject>> for Viewer {
    fn from(subject: Option<&AuthSubject>) -> Self {
        match subject {
            Some(subject) => Viewer::User(subject.user_id),
            None => Viewer::Anonymous,
        }
    }
}

/// Pagination parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pagination {
    /// Number of items to skip.
    pub offset: i64,
    /// Maximum number of items to return.
    pub limit: i64,
}

impl Pagination {
    /// Create new pagination parameters. Negative values are clamped.
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset: offset.max(0),
            limit: limit.max(1),
        }
    }

    /// Create pagination for the first page with given limit.
    pub fn first(limit: i64) -> Self {
        Self::new(0, limit)
    }
}

/// Result of a paginated query.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    /// The items in this page.
    pub items: Vec<T>,
    /// Total number of items (across all pages).
    pub total: i64,
    /// Current offset.
    pub offset: i64,
    /// Limit used for this query.
    pub limit: i64,
}

impl<T> PaginatedResult<T> {
    /// Check if there are more items after this page.
    pub fn has_more(&self) -> bool {
        self.offset + (self.items.len() as i64) < self.total
    }

    /// Get the next page pagination, or None if no more pages.
    pub fn next_page(&self) -> Option<Pagination> {
        if self.has_more() {
            Some(Pagination::new(self.offset + self.limit, self.limit))
        } else {
            None
        }
    }
}

/// A post together with its comments and dice rolls.
#[derive(Debug, Clone)]
pub struct PostView {
    /// The post.
    pub post: Post,
    /// Comments, oldest first.
    pub comments: Vec<Comment>,
    /// Rolls, oldest first.
    pub rolls: Vec<RollResult>,
}

/// Service for board operations with permission checking.
pub struct BoardService<'a> {
    db: &'a Database,
}

impl<'a> BoardService<'a> {
    /// Create a new BoardService with the given database reference.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    // ========== Access helpers ==========

    /// Work out the viewer's standing in a board.
    pub async fn standing(&self, viewer: Viewer, board_id: i64) -> Result<Standing> {
        let role = match viewer.user_id() {
            Some(user_id) => {
                MemberRepository::new(self.db.pool())
                    .role_of(board_id, user_id)
                    .await?
            }
            None => None,
        };
        Ok(Standing::from_parts(viewer.user_id().is_some(), role))
    }

    /// Load a board the viewer may see.
    async fn visible_board(&self, viewer: Viewer, board_id: i64) -> Result<(Board, Standing)> {
        let board = BoardRepository::new(self.db.pool())
            .get_by_id(board_id)
            .await?
            .ok_or_else(|| ForumError::not_found("board"))?;

        let standing = self.standing(viewer, board_id).await?;
        if !policy::can_view(board.visibility, standing) {
            return Err(ForumError::not_found("board"));
        }
        Ok((board, standing))
    }

    /// Load a thread and check it belongs to the board.
    async fn thread_in(&self, board_id: i64, thread_id: i64) -> Result<Thread> {
        ThreadRepository::new(self.db.pool())
            .get_by_id(thread_id)
            .await?
            .filter(|thread| thread.board_id == board_id)
            .ok_or_else(|| ForumError::not_found("thread"))
    }

    /// Load a post and check it belongs to the thread.
    async fn post_in(&self, thread_id: i64, post_id: i64) -> Result<Post> {
        PostRepository::new(self.db.pool())
            .get_by_id(post_id)
            .await?
            .filter(|post| post.thread_id == thread_id)
            .ok_or_else(|| ForumError::not_found("post"))
    }

    /// Load a comment and check it belongs to the post.
    async fn comment_in(&self, post_id: i64, comment_id: i64) -> Result<Comment> {
        CommentRepository::new(self.db.pool())
            .get_by_id(comment_id)
            .await?
            .filter(|comment| comment.post_id == post_id)
            .ok_or_else(|| ForumError::not_found("comment"))
    }

    // ========== Boards ==========

    /// List the boards the viewer may see, newest first, at most `limit`.
    pub async fn list_boards(&self, viewer: Viewer, limit: i64) -> Result<Vec<Board>> {
        let boards = BoardRepository::new(self.db.pool())
            .list_with_roles(viewer.user_id(), limit)
            .await?;
        Ok(boards.into_iter().map(|(board, _)| board).collect())
    }

    /// Get a board the viewer may see, with the viewer's standing in it.
    pub async fn get_board(&self, viewer: Viewer, board_id: i64) -> Result<(Board, Standing)> {
        self.visible_board(viewer, board_id).await
    }

    /// Create a board owned by the viewer.
    ///
    /// The board row and the Owner membership are written in one
    /// transaction; if the membership cannot be written the board is
    /// rolled back too.
    pub async fn create_board(&self, viewer: Viewer, new_board: &NewBoard) -> Result<Board> {
        let user_id = viewer.require_user()?;
        validate_title(&new_board.title)?;
        for text in [&new_board.description, &new_board.content].into_iter().flatten() {
            validate_optional_body(text)?;
        }

        let mut tx = self.db.begin().await?;
        let board = BoardRepository::insert(&mut *tx, new_board).await?;
        MemberRepository::insert(&mut *tx, board.id, user_id, MemberRole::Owner).await?;
        tx.commit().await?;

        info!(board_id = board.id, user_id, visibility = %board.visibility, "board created");
        Ok(board)
    }

    /// Update board settings. Requires Admin or above.
    pub async fn update_board(
        &self,
        viewer: Viewer,
        board_id: i64,
        update: &BoardUpdate,
    ) -> Result<Board> {
        viewer.require_user()?;
        let (_, standing) = self.visible_board(viewer, board_id).await?;
        if !policy::can_moderate(standing) {
            return Err(ForumError::forbidden("only board admins can edit the board"));
        }

        if let Some(ref title) = update.title {
            validate_title(title)?;
        }
        for text in [&update.description, &update.content]
            .into_iter()
            .flatten()
            .flatten()
        {
            validate_optional_body(text)?;
        }

        BoardRepository::new(self.db.pool())
            .update(board_id, update)
            .await?
            .ok_or_else(|| ForumError::not_found("board"))
    }

    /// Delete a board and everything in it. Requires Owner.
    pub async fn delete_board(&self, viewer: Viewer, board_id: i64) -> Result<()> {
        let user_id = viewer.require_user()?;
        let (_, standing) = self.visible_board(viewer, board_id).await?;
        if !policy::can_administer(standing) {
            return Err(ForumError::forbidden("only the board owner can delete the board"));
        }

        if !BoardRepository::new(self.db.pool()).delete(board_id).await? {
            return Err(ForumError::not_found("board"));
        }
        info!(board_id, user_id, "board deleted");
        Ok(())
    }

    // ========== Membership ==========

    /// List a board's members.
    pub async fn list_members(&self, viewer: Viewer, board_id: i64) -> Result<Vec<MemberInfo>> {
        self.visible_board(viewer, board_id).await?;
        MemberRepository::new(self.db.pool())
            .list_members(board_id)
            .await
    }

    /// Add a user to a board.
    ///
    /// Requires Admin or above; granting Owner requires Owner.
    pub async fn add_member(
        &self,
        viewer: Viewer,
        board_id: i64,
        user_id: i64,
        role: MemberRole,
    ) -> Result<BoardMember> {
        let actor = viewer.require_user()?;
        let (_, standing) = self.visible_board(viewer, board_id).await?;
        Self::check_can_assign(standing, role)?;

        if UserRepository::new(self.db.pool())
            .get_by_id(user_id)
            .await?
            .is_none()
        {
            return Err(ForumError::not_found("user"));
        }

        let member = MemberRepository::new(self.db.pool())
            .add(board_id, user_id, role)
            .await?;
        info!(board_id, user_id, actor, role = %role, "member added");
        Ok(member)
    }

    /// Change a member's role.
    ///
    /// Requires Admin or above; anything touching the Owner tier requires
    /// Owner, and the last Owner cannot be demoted.
    pub async fn set_member_role(
        &self,
        viewer: Viewer,
        board_id: i64,
        user_id: i64,
        role: MemberRole,
    ) -> Result<BoardMember> {
        let actor = viewer.require_user()?;
        let (_, standing) = self.visible_board(viewer, board_id).await?;
        Self::check_can_assign(standing, role)?;

        let members = MemberRepository::new(self.db.pool());
        let current = members
            .role_of(board_id, user_id)
            .await?
            .ok_or(ForumError::NotAMember)?;
        if current == MemberRole::Owner {
            Self::check_can_assign(standing, MemberRole::Owner)?;
        }

        // The repository refuses to demote the last Owner.
        let member = members.set_role(board_id, user_id, role).await?;
        info!(board_id, user_id, actor, role = %role, "member role changed");
        Ok(member)
    }

    /// Remove a user from a board.
    ///
    /// Anyone may remove themselves. Removing someone else requires Admin or
    /// above, or Owner when the target is an Owner. The last Owner can never
    /// leave.
    pub async fn remove_member(&self, viewer: Viewer, board_id: i64, user_id: i64) -> Result<()> {
        let actor = viewer.require_user()?;
        let (_, standing) = self.visible_board(viewer, board_id).await?;

        let members = MemberRepository::new(self.db.pool());
        let target_role = members.role_of(board_id, user_id).await?;

        if actor != user_id {
            if !policy::can_moderate(standing) {
                return Err(ForumError::forbidden("only board admins can remove members"));
            }
            if target_role == Some(MemberRole::Owner) {
                Self::check_can_assign(standing, MemberRole::Owner)?;
            }
        }

        if target_role.is_none() {
            return Err(ForumError::NotAMember);
        }

        members.remove(board_id, user_id).await?;
        info!(board_id, user_id, actor, "member removed");
        Ok(())
    }

    fn check_can_assign(standing: Standing, role: MemberRole) -> Result<()> {
        if !policy::can_moderate(standing) {
            return Err(ForumError::forbidden("only board admins can manage members"));
        }
        if role == MemberRole::Owner && !policy::can_administer(standing) {
            return Err(ForumError::forbidden("only owners can manage ownership"));
        }
        Ok(())
    }

    // ========== Threads ==========

    /// List a board's threads, newest first.
    pub async fn list_threads(
        &self,
        viewer: Viewer,
        board_id: i64,
        pagination: Pagination,
    ) -> Result<PaginatedResult<Thread>> {
        self.visible_board(viewer, board_id).await?;

        let repo = ThreadRepository::new(self.db.pool());
        let total = repo.count_by_board(board_id).await?;
        let items = repo
            .list_by_board_paginated(board_id, pagination.offset, pagination.limit)
            .await?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    /// Get a thread in a board the viewer may see.
    pub async fn get_thread(&self, viewer: Viewer, board_id: i64, thread_id: i64) -> Result<Thread> {
        self.visible_board(viewer, board_id).await?;
        self.thread_in(board_id, thread_id).await
    }

    /// Create a thread. Requires posting rights on the board.
    pub async fn create_thread(
        &self,
        viewer: Viewer,
        board_id: i64,
        title: &str,
        content: &str,
        readonly: bool,
    ) -> Result<Thread> {
        let user_id = viewer.require_user()?;
        let (board, standing) = self.visible_board(viewer, board_id).await?;
        if !policy::can_post(board.visibility, standing) {
            return Err(ForumError::forbidden("you cannot post on this board"));
        }
        validate_title(title)?;
        validate_optional_body(content)?;

        let thread = ThreadRepository::new(self.db.pool())
            .create(&NewThread::new(board_id, user_id, title.trim(), content).with_readonly(readonly))
            .await?;
        info!(board_id, thread_id = thread.id, user_id, "thread created");
        Ok(thread)
    }

    /// Edit a thread. Requires being its author or a board admin.
    pub async fn update_thread(
        &self,
        viewer: Viewer,
        board_id: i64,
        thread_id: i64,
        update: &ThreadUpdate,
    ) -> Result<Thread> {
        let user_id = viewer.require_user()?;
        let (_, standing) = self.visible_board(viewer, board_id).await?;
        let thread = self.thread_in(board_id, thread_id).await?;
        if !thread.is_owned_by(user_id) && !policy::can_moderate(standing) {
            return Err(ForumError::forbidden("you cannot edit this thread"));
        }

        if let Some(ref title) = update.title {
            validate_title(title)?;
        }
        if let Some(ref content) = update.content {
            validate_optional_body(content)?;
        }

        ThreadRepository::new(self.db.pool())
            .update(thread_id, update)
            .await?
            .ok_or_else(|| ForumError::not_found("thread"))
    }

    /// Delete a thread. Requires being its author or a board admin.
    pub async fn delete_thread(&self, viewer: Viewer, board_id: i64, thread_id: i64) -> Result<()> {
        let user_id = viewer.require_user()?;
        let (_, standing) = self.visible_board(viewer, board_id).await?;
        let thread = self.thread_in(board_id, thread_id).await?;
        if !thread.is_owned_by(user_id) && !policy::can_moderate(standing) {
            return Err(ForumError::forbidden("you cannot delete this thread"));
        }

        if !ThreadRepository::new(self.db.pool()).delete(thread_id).await? {
            return Err(ForumError::not_found("thread"));
        }
        info!(board_id, thread_id, user_id, "thread deleted");
        Ok(())
    }

    // ========== Posts ==========

    /// List a thread's posts, oldest first, each with its comments and rolls.
    pub async fn list_posts(
        &self,
        viewer: Viewer,
        board_id: i64,
        thread_id: i64,
    ) -> Result<Vec<PostView>> {
        self.visible_board(viewer, board_id).await?;
        self.thread_in(board_id, thread_id).await?;

        let posts = PostRepository::new(self.db.pool())
            .list_by_thread(thread_id)
            .await?;
        let mut comments = CommentRepository::new(self.db.pool())
            .list_by_thread(thread_id)
            .await?;
        let mut rolls = RollRepository::new(self.db.pool())
            .list_by_thread(thread_id)
            .await?;

        Ok(posts
            .into_iter()
            .map(|post| {
                let (mine, rest): (Vec<_>, Vec<_>) =
                    comments.drain(..).partition(|c| c.post_id == post.id);
                comments = rest;
                let (my_rolls, rest): (Vec<_>, Vec<_>) =
                    rolls.drain(..).partition(|r| r.post_id == post.id);
                rolls = rest;
                PostView {
                    post,
                    comments: mine,
                    rolls: my_rolls,
                }
            })
            .collect())
    }

    /// Create a post. Requires posting rights and a thread that is not
    /// read-only.
    pub async fn create_post(
        &self,
        viewer: Viewer,
        board_id: i64,
        thread_id: i64,
        content: &str,
    ) -> Result<Post> {
        let user_id = viewer.require_user()?;
        let (board, standing) = self.visible_board(viewer, board_id).await?;
        let thread = self.thread_in(board_id, thread_id).await?;
        if !policy::can_post(board.visibility, standing) {
            return Err(ForumError::forbidden("you cannot post on this board"));
        }
        if thread.readonly {
            return Err(ForumError::forbidden("thread is read-only"));
        }
        validate_body(content)?;

        let post = PostRepository::new(self.db.pool())
            .create(&NewPost::new(thread_id, user_id, content))
            .await?;
        info!(thread_id, post_id = post.id, user_id, "post created");
        Ok(post)
    }

    /// Edit a post. Requires being its author or a board admin.
    pub async fn update_post(
        &self,
        viewer: Viewer,
        board_id: i64,
        thread_id: i64,
        post_id: i64,
        content: &str,
    ) -> Result<Post> {
        let user_id = viewer.require_user()?;
        let (_, standing) = self.visible_board(viewer, board_id).await?;
        self.thread_in(board_id, thread_id).await?;
        let post = self.post_in(thread_id, post_id).await?;
        if !post.is_owned_by(user_id) && !policy::can_moderate(standing) {
            return Err(ForumError::forbidden("you cannot edit this post"));
        }
        validate_body(content)?;

        PostRepository::new(self.db.pool())
            .update_content(post_id, content)
            .await?
            .ok_or_else(|| ForumError::not_found("post"))
    }

    /// Delete a post. Requires being its author or a board admin.
    pub async fn delete_post(
        &self,
        viewer: Viewer,
        board_id: i64,
        thread_id: i64,
        post_id: i64,
    ) -> Result<()> {
        let user_id = viewer.require_user()?;
        let (_, standing) = self.visible_board(viewer, board_id).await?;
        self.thread_in(board_id, thread_id).await?;
        let post = self.post_in(thread_id, post_id).await?;
        if !post.is_owned_by(user_id) && !policy::can_moderate(standing) {
            return Err(ForumError::forbidden("you cannot delete this post"));
        }

        if !PostRepository::new(self.db.pool()).delete(post_id).await? {
            return Err(ForumError::not_found("post"));
        }
        info!(thread_id, post_id, user_id, "post deleted");
        Ok(())
    }

    // ========== Comments ==========

    /// Comment on a post. Same rights as posting.
    pub async fn create_comment(
        &self,
        viewer: Viewer,
        board_id: i64,
        thread_id: i64,
        post_id: i64,
        content: &str,
    ) -> Result<Comment> {
        let user_id = viewer.require_user()?;
        let (board, standing) = self.visible_board(viewer, board_id).await?;
        let thread = self.thread_in(board_id, thread_id).await?;
        self.post_in(thread_id, post_id).await?;
        if !policy::can_post(board.visibility, standing) {
            return Err(ForumError::forbidden("you cannot comment on this board"));
        }
        if thread.readonly {
            return Err(ForumError::forbidden("thread is read-only"));
        }
        validate_body(content)?;

        let comment = CommentRepository::new(self.db.pool())
            .create(&NewComment::new(post_id, user_id, content))
            .await?;
        info!(post_id, comment_id = comment.id, user_id, "comment created");
        Ok(comment)
    }

    /// Edit a comment. Requires being its author or a board admin.
    pub async fn update_comment(
        &self,
        viewer: Viewer,
        board_id: i64,
        thread_id: i64,
        post_id: i64,
        comment_id: i64,
        content: &str,
    ) -> Result<Comment> {
        let user_id = viewer.require_user()?;
        let (_, standing) = self.visible_board(viewer, board_id).await?;
        self.thread_in(board_id, thread_id).await?;
        self.post_in(thread_id, post_id).await?;
        let comment = self.comment_in(post_id, comment_id).await?;
        if comment.owner_id != user_id && !policy::can_moderate(standing) {
            return Err(ForumError::forbidden("you cannot edit this comment"));
        }
        validate_body(content)?;

        CommentRepository::new(self.db.pool())
            .update_content(comment_id, content)
            .await?
            .ok_or_else(|| ForumError::not_found("comment"))
    }

    /// Delete a comment. Requires being its author or a board admin.
    pub async fn delete_comment(
        &self,
        viewer: Viewer,
        board_id: i64,
        thread_id: i64,
        post_id: i64,
        comment_id: i64,
    ) -> Result<()> {
        let user_id = viewer.require_user()?;
        let (_, standing) = self.visible_board(viewer, board_id).await?;
        self.thread_in(board_id, thread_id).await?;
        self.post_in(thread_id, post_id).await?;
        let comment = self.comment_in(post_id, comment_id).await?;
        if comment.owner_id != user_id && !policy::can_moderate(standing) {
            return Err(ForumError::forbidden("you cannot delete this comment"));
        }

        if !CommentRepository::new(self.db.pool())
            .delete(comment_id)
            .await?
        {
            return Err(ForumError::not_found("comment"));
        }
        info!(post_id, comment_id, user_id, "comment deleted");
        Ok(())
    }

    // ========== Dice rolls ==========

    /// Roll dice on a post and record the total.
    ///
    /// Only the post's author may roll on it, and not in a read-only thread.
    pub async fn create_roll(
        &self,
        viewer: Viewer,
        board_id: i64,
        thread_id: i64,
        post_id: i64,
        expression: &str,
        label: Option<&str>,
    ) -> Result<(RollResult, RollOutcome)> {
        let user_id = viewer.require_user()?;
        self.visible_board(viewer, board_id).await?;
        let thread = self.thread_in(board_id, thread_id).await?;
        let post = self.post_in(thread_id, post_id).await?;
        if !post.is_owned_by(user_id) {
            return Err(ForumError::forbidden("only the post author can roll on it"));
        }
        if thread.readonly {
            return Err(ForumError::forbidden("thread is read-only"));
        }

        let expression = expression.trim();
        if expression.chars().count() > MAX_ROLL_LENGTH {
            return Err(ForumError::Validation(format!(
                "roll must be at most {MAX_ROLL_LENGTH} characters"
            )));
        }
        let label = label.map(str::trim).filter(|l| !l.is_empty());
        if label.is_some_and(|l| l.chars().count() > MAX_LABEL_LENGTH) {
            return Err(ForumError::Validation(format!(
                "label must be at most {MAX_LABEL_LENGTH} characters"
            )));
        }

        let outcome = dice::roll(expression)?;
        let mut new_roll = NewRollResult::new(post_id, expression, outcome.total);
        if let Some(label) = label {
            new_roll = new_roll.with_label(label);
        }

        let roll = RollRepository::new(self.db.pool()).create(&new_roll).await?;
        info!(post_id, roll_id = roll.id, user_id, total = outcome.total, "dice rolled");
        Ok((roll, outcome))
    }

    /// List the rolls on a post.
    pub async fn list_rolls(
        &self,
        viewer: Viewer,
        board_id: i64,
        thread_id: i64,
        post_id: i64,
    ) -> Result<Vec<RollResult>> {
        self.visible_board(viewer, board_id).await?;
        self.thread_in(board_id, thread_id).await?;
        self.post_in(thread_id, post_id).await?;
        RollRepository::new(self.db.pool()).list_by_post(post_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Visibility;
    use crate::db::NewUser;

    struct Fixture {
        db: Database,
        alice: i64,
        bob: i64,
        carol: i64,
    }

    impl Fixture {
        async fn new() -> Self {
            let db = Database::open_in_memory().await.unwrap();
            let users = UserRepository::new(db.pool());
            let mut ids = Vec::new();
            for name in ["alice", "bob", "carol"] {
                let user = users
                    .create(&NewUser::new(name, format!("{name}@example.com"), "hash"))
                    .await
                    .unwrap();
                ids.push(user.id);
            }
            Self {
                db,
                alice: ids[0],
                bob: ids[1],
                carol: ids[2],
            }
        }

        fn service(&self) -> BoardService<'_> {
            BoardService::new(&self.db)
        }

        async fn board(&self, owner: i64, visibility: Visibility) -> Board {
            self.service()
                .create_board(
                    Viewer::User(owner),
                    &NewBoard::new("Board").with_visibility(visibility),
                )
                .await
                .unwrap()
        }

        async fn count(&self, table: &str) -> i64 {
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
                .fetch_one(self.db.pool())
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn test_create_board_makes_creator_owner() {
        let fx = Fixture::new().await;
        let board = fx.board(fx.alice, Visibility::Public).await;

        let standing = fx
            .service()
            .standing(Viewer::User(fx.alice), board.id)
            .await
            .unwrap();
        assert_eq!(standing, Standing::Member(MemberRole::Owner));
    }

    #[tokio::test]
    async fn test_create_board_rolls_back_when_membership_fails() {
        let fx = Fixture::new().await;

        // No such user: the owner membership violates its foreign key.
        let result = fx
            .service()
            .create_board(Viewer::User(999), &NewBoard::new("Orphan"))
            .await;

        assert!(matches!(result, Err(ForumError::NotFound(_))));
        assert_eq!(fx.count("boards").await, 0);
        assert_eq!(fx.count("board_members").await, 0);
    }

    #[tokio::test]
    async fn test_create_board_requires_auth_and_title() {
        let fx = Fixture::new().await;
        let service = fx.service();

        let result = service
            .create_board(Viewer::Anonymous, &NewBoard::new("x"))
            .await;
        assert!(matches!(result, Err(ForumError::Auth(_))));

        let result = service
            .create_board(Viewer::User(fx.alice), &NewBoard::new("   "))
            .await;
        assert!(matches!(result, Err(ForumError::Validation(_))));
    }

    #[tokio::test]
    async fn test_hidden_board_listing_after_membership() {
        let fx = Fixture::new().await;
        let service = fx.service();
        let hidden = fx.board(fx.alice, Visibility::Hidden).await;

        let before = service.list_boards(Viewer::User(fx.bob), 20).await.unwrap();
        assert!(before.iter().all(|b| b.id != hidden.id));
        assert!(service
            .list_boards(Viewer::Anonymous, 20)
            .await
            .unwrap()
            .is_empty());

        service
            .add_member(Viewer::User(fx.alice), hidden.id, fx.bob, MemberRole::Member)
            .await
            .unwrap();

        let after = service.list_boards(Viewer::User(fx.bob), 20).await.unwrap();
        assert!(after.iter().any(|b| b.id == hidden.id));
    }

    #[tokio::test]
    async fn test_list_boards_limit_and_order() {
        let fx = Fixture::new().await;
        let service = fx.service();
        for _ in 0..3 {
            fx.board(fx.alice, Visibility::Public).await;
        }

        let boards = service.list_boards(Viewer::Anonymous, 2).await.unwrap();
        assert_eq!(boards.len(), 2);
        assert!(boards[0].id > boards[1].id);
    }

    #[tokio::test]
    async fn test_hidden_board_is_not_found_for_outsiders() {
        let fx = Fixture::new().await;
        let service = fx.service();
        let hidden = fx.board(fx.alice, Visibility::Hidden).await;

        for viewer in [Viewer::Anonymous, Viewer::User(fx.bob)] {
            let result = service.get_board(viewer, hidden.id).await;
            assert!(matches!(result, Err(ForumError::NotFound(_))));
        }
        assert!(service
            .get_board(Viewer::User(fx.alice), hidden.id)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_private_board_posting() {
        let fx = Fixture::new().await;
        let service = fx.service();
        let board = fx.board(fx.alice, Visibility::Private).await;

        // Outsiders can read but not post.
        assert!(service.get_board(Viewer::User(fx.bob), board.id).await.is_ok());
        let result = service
            .create_thread(Viewer::User(fx.bob), board.id, "Hi", "", false)
            .await;
        assert!(matches!(result, Err(ForumError::Forbidden(_))));

        service
            .add_member(Viewer::User(fx.alice), board.id, fx.bob, MemberRole::Member)
            .await
            .unwrap();
        assert!(service
            .create_thread(Viewer::User(fx.bob), board.id, "Hi", "", false)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_public_board_registered_can_post() {
        let fx = Fixture::new().await;
        let service = fx.service();
        let board = fx.board(fx.alice, Visibility::Public).await;

        let thread = service
            .create_thread(Viewer::User(fx.bob), board.id, "Hello", "body", false)
            .await
            .unwrap();
        assert_eq!(thread.owner_id, Some(fx.bob));

        let result = service
            .create_thread(Viewer::Anonymous, board.id, "Hello", "body", false)
            .await;
        assert!(matches!(result, Err(ForumError::Auth(_))));
    }

    #[tokio::test]
    async fn test_update_and_delete_board_permissions() {
        let fx = Fixture::new().await;
        let service = fx.service();
        let board = fx.board(fx.alice, Visibility::Public).await;
        service
            .add_member(Viewer::User(fx.alice), board.id, fx.bob, MemberRole::Admin)
            .await
            .unwrap();

        let result = service
            .update_board(
                Viewer::User(fx.carol),
                board.id,
                &BoardUpdate::new().title("Nope"),
            )
            .await;
        assert!(matches!(result, Err(ForumError::Forbidden(_))));

        let updated = service
            .update_board(
                Viewer::User(fx.bob),
                board.id,
                &BoardUpdate::new().title("Renamed"),
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert!(updated.updated_at.is_some());

        let result = service.delete_board(Viewer::User(fx.bob), board.id).await;
        assert!(matches!(result, Err(ForumError::Forbidden(_))));

        service
            .delete_board(Viewer::User(fx.alice), board.id)
            .await
            .unwrap();
        let result = service.get_board(Viewer::User(fx.alice), board.id).await;
        assert!(matches!(result, Err(ForumError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_board_cascades() {
        let fx = Fixture::new().await;
        let service = fx.service();
        let board = fx.board(fx.alice, Visibility::Public).await;
        let alice = Viewer::User(fx.alice);

        let thread = service
            .create_thread(alice, board.id, "T", "body", false)
            .await
            .unwrap();
        let post = service
            .create_post(alice, board.id, thread.id, "post")
            .await
            .unwrap();
        service
            .create_comment(alice, board.id, thread.id, post.id, "comment")
            .await
            .unwrap();
        service
            .create_roll(alice, board.id, thread.id, post.id, "1d6", None)
            .await
            .unwrap();

        service.delete_board(alice, board.id).await.unwrap();

        for table in [
            "boards",
            "board_members",
            "threads",
            "posts",
            "comments",
            "roll_results",
        ] {
            assert_eq!(fx.count(table).await, 0, "{table} not emptied");
        }
        assert_eq!(fx.count("users").await, 3);
    }

    #[tokio::test]
    async fn test_deleting_user_clears_owner_references() {
        let fx = Fixture::new().await;
        let service = fx.service();
        let board = fx.board(fx.alice, Visibility::Public).await;
        let bob = Viewer::User(fx.bob);

        let thread = service
            .create_thread(bob, board.id, "T", "body", false)
            .await
            .unwrap();
        let post = service
            .create_post(bob, board.id, thread.id, "post")
            .await
            .unwrap();
        service
            .create_comment(bob, board.id, thread.id, post.id, "comment")
            .await
            .unwrap();

        assert!(UserRepository::new(fx.db.pool())
            .delete(fx.bob)
            .await
            .unwrap());

        let thread = service
            .get_thread(Viewer::Anonymous, board.id, thread.id)
            .await
            .unwrap();
        assert_eq!(thread.owner_id, None);

        let posts = service
            .list_posts(Viewer::Anonymous, board.id, thread.id)
            .await
            .unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].post.owner_id, None);
        assert!(posts[0].comments.is_empty());
    }

    #[tokio::test]
    async fn test_deleted_user_with_live_session() {
        let fx = Fixture::new().await;
        let service = fx.service();
        let board = fx.board(fx.alice, Visibility::Public).await;
        let alice = Viewer::User(fx.alice);
        let bob = Viewer::User(fx.bob);
        service
            .add_member(alice, board.id, fx.bob, MemberRole::Admin)
            .await
            .unwrap();
        let thread = service
            .create_thread(alice, board.id, "T", "", false)
            .await
            .unwrap();
        let post = service
            .create_post(alice, board.id, thread.id, "post")
            .await
            .unwrap();

        UserRepository::new(fx.db.pool()).delete(fx.bob).await.unwrap();

        // Memberships go with the user.
        assert_eq!(
            service.standing(bob, board.id).await.unwrap(),
            Standing::Registered
        );
        let members = service.list_members(alice, board.id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id, fx.alice);

        // A token that outlives its user cannot author anything.
        let is_missing_user =
            |result: Result<()>| matches!(result, Err(ForumError::NotFound(what)) if what == "user");
        assert!(is_missing_user(
            service.create_thread(bob, board.id, "T", "", false).await.map(|_| ())
        ));
        assert!(is_missing_user(
            service.create_post(bob, board.id, thread.id, "hi").await.map(|_| ())
        ));
        assert!(is_missing_user(
            service
                .create_comment(bob, board.id, thread.id, post.id, "hi")
                .await
                .map(|_| ())
        ));
    }

    #[tokio::test]
    async fn test_readonly_thread_rejects_posts_for_everyone() {
        let fx = Fixture::new().await;
        let service = fx.service();
        let board = fx.board(fx.alice, Visibility::Public).await;
        let alice = Viewer::User(fx.alice);

        let thread = service
            .create_thread(alice, board.id, "Rules", "Read me", true)
            .await
            .unwrap();
        assert!(thread.readonly);

        for viewer in [alice, Viewer::User(fx.bob)] {
            let result = service
                .create_post(viewer, board.id, thread.id, "reply")
                .await;
            assert!(matches!(result, Err(ForumError::Forbidden(_))));
        }
        assert_eq!(fx.count("posts").await, 0);

        // Unlocking lets posts through again.
        service
            .update_thread(alice, board.id, thread.id, &ThreadUpdate::new().readonly(false))
            .await
            .unwrap();
        assert!(service
            .create_post(Viewer::User(fx.bob), board.id, thread.id, "reply")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_containment_mismatch_is_not_found() {
        let fx = Fixture::new().await;
        let service = fx.service();
        let alice = Viewer::User(fx.alice);
        let first = fx.board(fx.alice, Visibility::Public).await;
        let second = fx.board(fx.alice, Visibility::Public).await;

        let thread = service
            .create_thread(alice, first.id, "T", "body", false)
            .await
            .unwrap();
        let post = service
            .create_post(alice, first.id, thread.id, "post")
            .await
            .unwrap();
        let other_thread = service
            .create_thread(alice, first.id, "Other", "body", false)
            .await
            .unwrap();

        let result = service.get_thread(alice, second.id, thread.id).await;
        assert!(matches!(result, Err(ForumError::NotFound(_))));

        let result = service
            .update_post(alice, first.id, other_thread.id, post.id, "moved?")
            .await;
        assert!(matches!(result, Err(ForumError::NotFound(_))));

        let result = service.create_post(alice, 999, thread.id, "x").await;
        assert!(matches!(result, Err(ForumError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_post_edit_permissions() {
        let fx = Fixture::new().await;
        let service = fx.service();
        let board = fx.board(fx.alice, Visibility::Public).await;
        let thread = service
            .create_thread(Viewer::User(fx.alice), board.id, "T", "", false)
            .await
            .unwrap();
        let post = service
            .create_post(Viewer::User(fx.bob), board.id, thread.id, "mine")
            .await
            .unwrap();

        let result = service
            .update_post(Viewer::User(fx.carol), board.id, thread.id, post.id, "theirs")
            .await;
        assert!(matches!(result, Err(ForumError::Forbidden(_))));

        let edited = service
            .update_post(Viewer::User(fx.bob), board.id, thread.id, post.id, "edited")
            .await
            .unwrap();
        assert_eq!(edited.content, "edited");

        // The owner moderates.
        service
            .delete_post(Viewer::User(fx.alice), board.id, thread.id, post.id)
            .await
            .unwrap();
        assert_eq!(fx.count("posts").await, 0);
    }

    #[tokio::test]
    async fn test_comments() {
        let fx = Fixture::new().await;
        let service = fx.service();
        let board = fx.board(fx.alice, Visibility::Public).await;
        let (alice, bob, carol) = (
            Viewer::User(fx.alice),
            Viewer::User(fx.bob),
            Viewer::User(fx.carol),
        );
        let thread = service
            .create_thread(alice, board.id, "T", "", false)
            .await
            .unwrap();
        let post = service
            .create_post(alice, board.id, thread.id, "post")
            .await
            .unwrap();

        let comment = service
            .create_comment(bob, board.id, thread.id, post.id, "first!")
            .await
            .unwrap();
        let result = service
            .update_comment(carol, board.id, thread.id, post.id, comment.id, "no")
            .await;
        assert!(matches!(result, Err(ForumError::Forbidden(_))));

        let edited = service
            .update_comment(bob, board.id, thread.id, post.id, comment.id, "second")
            .await
            .unwrap();
        assert_eq!(edited.content, "second");

        let posts = service
            .list_posts(Viewer::Anonymous, board.id, thread.id)
            .await
            .unwrap();
        assert_eq!(posts[0].comments.len(), 1);

        service
            .delete_comment(bob, board.id, thread.id, post.id, comment.id)
            .await
            .unwrap();
        assert_eq!(fx.count("comments").await, 0);
    }

    #[tokio::test]
    async fn test_rolls() {
        let fx = Fixture::new().await;
        let service = fx.service();
        let board = fx.board(fx.alice, Visibility::Public).await;
        let alice = Viewer::User(fx.alice);
        let thread = service
            .create_thread(alice, board.id, "T", "", false)
            .await
            .unwrap();
        let post = service
            .create_post(alice, board.id, thread.id, "attack!")
            .await
            .unwrap();

        let (roll, outcome) = service
            .create_roll(alice, board.id, thread.id, post.id, "2d6+3", Some("damage"))
            .await
            .unwrap();
        assert_eq!(roll.result, outcome.total);
        assert!((5..=15).contains(&roll.result));
        assert_eq!(roll.label.as_deref(), Some("damage"));

        let result = service
            .create_roll(Viewer::User(fx.bob), board.id, thread.id, post.id, "1d6", None)
            .await;
        assert!(matches!(result, Err(ForumError::Forbidden(_))));

        let result = service
            .create_roll(alice, board.id, thread.id, post.id, "1d1", None)
            .await;
        assert!(matches!(result, Err(ForumError::Validation(_))));

        let rolls = service
            .list_rolls(Viewer::Anonymous, board.id, thread.id, post.id)
            .await
            .unwrap();
        assert_eq!(rolls.len(), 1);
    }

    #[tokio::test]
    async fn test_membership_management_rules() {
        let fx = Fixture::new().await;
        let service = fx.service();
        let board = fx.board(fx.alice, Visibility::Public).await;
        let (alice, bob, carol) = (
            Viewer::User(fx.alice),
            Viewer::User(fx.bob),
            Viewer::User(fx.carol),
        );

        // Non-members cannot add anyone.
        let result = service
            .add_member(carol, board.id, fx.carol, MemberRole::Member)
            .await;
        assert!(matches!(result, Err(ForumError::Forbidden(_))));

        service
            .add_member(alice, board.id, fx.bob, MemberRole::Admin)
            .await
            .unwrap();
        let result = service
            .add_member(alice, board.id, fx.bob, MemberRole::Member)
            .await;
        assert!(matches!(result, Err(ForumError::AlreadyMember)));

        // Admins manage members but not ownership.
        service
            .add_member(bob, board.id, fx.carol, MemberRole::Member)
            .await
            .unwrap();
        let result = service
            .set_member_role(bob, board.id, fx.carol, MemberRole::Owner)
            .await;
        assert!(matches!(result, Err(ForumError::Forbidden(_))));
        let result = service.remove_member(bob, board.id, fx.alice).await;
        assert!(matches!(result, Err(ForumError::Forbidden(_))));

        let result = service
            .add_member(alice, board.id, 999, MemberRole::Member)
            .await;
        assert!(matches!(result, Err(ForumError::NotFound(_))));

        let members = service.list_members(carol, board.id).await.unwrap();
        assert_eq!(members.len(), 3);
        assert_eq!(members[0].role, MemberRole::Owner);
    }

    #[tokio::test]
    async fn test_leaving_and_last_owner() {
        let fx = Fixture::new().await;
        let service = fx.service();
        let board = fx.board(fx.alice, Visibility::Public).await;
        let (alice, bob) = (Viewer::User(fx.alice), Viewer::User(fx.bob));

        service
            .add_member(alice, board.id, fx.bob, MemberRole::Member)
            .await
            .unwrap();
        service.remove_member(bob, board.id, fx.bob).await.unwrap();
        let result = service.remove_member(bob, board.id, fx.bob).await;
        assert!(matches!(result, Err(ForumError::NotAMember)));

        let result = service.remove_member(alice, board.id, fx.alice).await;
        assert!(matches!(result, Err(ForumError::Forbidden(_))));
        let result = service
            .set_member_role(alice, board.id, fx.alice, MemberRole::Admin)
            .await;
        assert!(matches!(result, Err(ForumError::Forbidden(_))));

        // With a second owner the first may step down.
        service
            .add_member(alice, board.id, fx.bob, MemberRole::Owner)
            .await
            .unwrap();
        service
            .set_member_role(alice, board.id, fx.alice, MemberRole::Admin)
            .await
            .unwrap();
        assert_eq!(
            service.standing(alice, board.id).await.unwrap(),
            Standing::Member(MemberRole::Admin)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_owner_exits_keep_one_owner() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("forum.db"), 4).await.unwrap();
        let users = UserRepository::new(db.pool());
        let alice = users
            .create(&NewUser::new("alice", "alice@example.com", "hash"))
            .await
            .unwrap()
            .id;
        let bob = users
            .create(&NewUser::new("bob", "bob@example.com", "hash"))
            .await
            .unwrap()
            .id;
        let service = BoardService::new(&db);

        for round in 0..10 {
            let board = service
                .create_board(Viewer::User(alice), &NewBoard::new(format!("Board {round}")))
                .await
                .unwrap();
            service
                .add_member(Viewer::User(alice), board.id, bob, MemberRole::Owner)
                .await
                .unwrap();

            // Both owners step down at once; only one of them may succeed.
            let (a, b) = if round % 2 == 0 {
                let (a, b) = tokio::join!(
                    service.set_member_role(Viewer::User(alice), board.id, alice, MemberRole::Admin),
                    service.set_member_role(Viewer::User(bob), board.id, bob, MemberRole::Admin),
                );
                (a.is_ok(), b.is_ok())
            } else {
                let (a, b) = tokio::join!(
                    service.remove_member(Viewer::User(alice), board.id, alice),
                    service.remove_member(Viewer::User(bob), board.id, bob),
                );
                (a.is_ok(), b.is_ok())
            };
            assert!(a ^ b, "round {round}: exactly one owner may step down");

            let owners: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM board_members WHERE board_id = ? AND role = 'owner'",
            )
            .bind(board.id)
            .fetch_one(db.pool())
            .await
            .unwrap();
            assert_eq!(owners, 1, "round {round}");
        }
    }

    #[tokio::test]
    async fn test_list_threads_paginates() {
        let fx = Fixture::new().await;
        let service = fx.service();
        let board = fx.board(fx.alice, Visibility::Public).await;
        for i in 0..5 {
            service
                .create_thread(Viewer::User(fx.alice), board.id, &format!("T{i}"), "", false)
                .await
                .unwrap();
        }

        let page = service
            .list_threads(Viewer::Anonymous, board.id, Pagination::first(2))
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        assert!(page.has_more());

        let next = page.next_page().unwrap();
        assert_eq!(next.offset, 2);

        let last = service
            .list_threads(Viewer::Anonymous, board.id, Pagination::new(4, 2))
            .await
            .unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(!last.has_more());
        assert!(last.next_page().is_none());
    }

    #[test]
    fn test_viewer_from_subject() {
        let subject = AuthSubject {
            user_id: 5,
            display_name: "alice".to_string(),
            is_admin: false,
        };
        assert_eq!(Viewer::from(Some(&subject)), Viewer::User(5));
        assert_eq!(Viewer::from(None), Viewer::Anonymous);
        assert_eq!(Viewer::Anonymous.user_id(), None);
    }
}
