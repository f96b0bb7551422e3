//! Response DTOs for the HTTP API.
//!
//! Markdown fields are returned twice: the stored source and a sanitized
//! HTML rendering. Timestamps are RFC 3339 with a relative "time since"
//! label alongside.

use serde::Serialize;
use utoipa::ToSchema;

use crate::board::{
    Board, BoardMember, Comment, MemberInfo, PostView, RollResult, Standing, Thread,
};
use crate::datetime::{time_since_stored, to_rfc3339};
use crate::db::User;
use crate::dice::RollOutcome;
use crate::markdown::{render_to_html, RenderProfile};

// ============================================================================
// Generic Response Wrappers
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Paginated response wrapper.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    /// Response data.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PaginationMeta,
}

impl<T: Serialize> PaginatedResponse<T> {
    /// Create a new paginated response.
    pub fn new(data: Vec<T>, page: u32, per_page: u32, total: i64) -> Self {
        Self {
            data,
            meta: PaginationMeta {
                page,
                per_page,
                total,
            },
        }
    }
}

/// Pagination metadata.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: i64,
}

// ============================================================================
// Users
// ============================================================================

/// Public user information.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    /// User ID.
    pub id: i64,
    /// Display name.
    pub display_name: String,
    /// Site administrator flag.
    pub is_admin: bool,
    /// Registration time.
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            display_name: user.display_name.clone(),
            is_admin: user.is_admin,
            created_at: to_rfc3339(&user.created_at),
        }
    }
}

/// Login or registration response.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// Signed session token.
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
    /// The signed-in user.
    pub user: UserResponse,
}

// ============================================================================
// Boards
// ============================================================================

fn render_optional(text: &Option<String>, profile: RenderProfile) -> Option<String> {
    text.as_deref().map(|t| render_to_html(t, profile))
}

/// Board summary for the board index.
#[derive(Debug, Serialize, ToSchema)]
pub struct BoardResponse {
    /// Board ID.
    pub id: i64,
    /// Title.
    pub title: String,
    /// Markdown description.
    pub description: Option<String>,
    /// Rendered description.
    pub description_html: Option<String>,
    /// Visibility tier (`public`, `private`, `hidden`).
    pub visibility: String,
    /// Creation time.
    pub created_at: String,
    /// Relative creation time.
    pub created_since: Option<String>,
    /// Last update time.
    pub updated_at: Option<String>,
}

impl From<&Board> for BoardResponse {
    fn from(board: &Board) -> Self {
        Self {
            id: board.id,
            title: board.title.clone(),
            description: board.description.clone(),
            description_html: render_optional(&board.description, RenderProfile::Board),
            visibility: board.visibility.as_str().to_string(),
            created_at: to_rfc3339(&board.created_at),
            created_since: time_since_stored(&board.created_at),
            updated_at: board.updated_at.as_deref().map(to_rfc3339),
        }
    }
}

/// Full board page.
#[derive(Debug, Serialize, ToSchema)]
pub struct BoardDetailResponse {
    /// Summary fields.
    #[serde(flatten)]
    pub board: BoardResponse,
    /// Markdown body.
    pub content: Option<String>,
    /// Rendered body.
    pub content_html: Option<String>,
    /// The viewer's role in this board, if any.
    pub role: Option<String>,
    /// Whether the viewer may start threads.
    pub can_post: bool,
    /// Whether the viewer may edit the board and manage members.
    pub can_moderate: bool,
}

impl BoardDetailResponse {
    /// Build the page for a viewer with the given standing.
    pub fn new(board: &Board, standing: Standing) -> Self {
        Self {
            board: BoardResponse::from(board),
            content: board.content.clone(),
            content_html: render_optional(&board.content, RenderProfile::Board),
            role: standing.role().map(|r| r.as_str().to_string()),
            can_post: crate::board::can_post(board.visibility, standing),
            can_moderate: crate::board::can_moderate(standing),
        }
    }
}

/// A board member.
#[derive(Debug, Serialize, ToSchema)]
pub struct MemberResponse {
    /// User ID.
    pub user_id: i64,
    /// Display name, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Role (`member`, `admin`, `owner`).
    pub role: String,
}

impl From<&MemberInfo> for MemberResponse {
    fn from(member: &MemberInfo) -> Self {
        Self {
            user_id: member.user_id,
            display_name: Some(member.display_name.clone()),
            role: member.role.as_str().to_string(),
        }
    }
}

impl From<&BoardMember> for MemberResponse {
    fn from(member: &BoardMember) -> Self {
        Self {
            user_id: member.user_id,
            display_name: None,
            role: member.role.as_str().to_string(),
        }
    }
}

// ============================================================================
// Threads and posts
// ============================================================================

/// Thread summary or header.
#[derive(Debug, Serialize, ToSchema)]
pub struct ThreadResponse {
    /// Thread ID.
    pub id: i64,
    /// Board ID.
    pub board_id: i64,
    /// Author, if the account still exists.
    pub owner_id: Option<i64>,
    /// Title.
    pub title: String,
    /// Markdown body.
    pub content: String,
    /// Rendered body.
    pub content_html: String,
    /// Whether replies are locked.
    pub readonly: bool,
    /// Creation time.
    pub created_at: String,
    /// Relative creation time.
    pub created_since: Option<String>,
    /// Last update time.
    pub updated_at: Option<String>,
}

impl From<&Thread> for ThreadResponse {
    fn from(thread: &Thread) -> Self {
        Self {
            id: thread.id,
            board_id: thread.board_id,
            owner_id: thread.owner_id,
            title: thread.title.clone(),
            content: thread.content.clone(),
            content_html: render_to_html(&thread.content, RenderProfile::Thread),
            readonly: thread.readonly,
            created_at: to_rfc3339(&thread.created_at),
            created_since: time_since_stored(&thread.created_at),
            updated_at: thread.updated_at.as_deref().map(to_rfc3339),
        }
    }
}

/// Thread page: the thread and its posts.
#[derive(Debug, Serialize, ToSchema)]
pub struct ThreadDetailResponse {
    /// The thread.
    pub thread: ThreadResponse,
    /// Posts, oldest first.
    pub posts: Vec<PostResponse>,
}

/// A comment.
#[derive(Debug, Serialize, ToSchema)]
pub struct CommentResponse {
    /// Comment ID.
    pub id: i64,
    /// Post ID.
    pub post_id: i64,
    /// Author.
    pub owner_id: i64,
    /// Markdown body.
    pub content: String,
    /// Rendered body.
    pub content_html: String,
    /// Creation time.
    pub created_at: String,
    /// Relative creation time.
    pub created_since: Option<String>,
    /// Last update time.
    pub updated_at: Option<String>,
}

impl From<&Comment> for CommentResponse {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            owner_id: comment.owner_id,
            content: comment.content.clone(),
            content_html: render_to_html(&comment.content, RenderProfile::Post),
            created_at: to_rfc3339(&comment.created_at),
            created_since: time_since_stored(&comment.created_at),
            updated_at: comment.updated_at.as_deref().map(to_rfc3339),
        }
    }
}

/// A recorded dice roll.
#[derive(Debug, Serialize, ToSchema)]
pub struct RollResponse {
    /// Roll ID.
    pub id: i64,
    /// Post ID.
    pub post_id: i64,
    /// The expression rolled.
    pub roll: String,
    /// What it was for.
    pub label: Option<String>,
    /// Total.
    pub result: i64,
    /// Individual dice, only when the roll was just made.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dice: Option<Vec<u32>>,
    /// Roll time.
    pub created_at: String,
}

impl From<&RollResult> for RollResponse {
    fn from(roll: &RollResult) -> Self {
        Self {
            id: roll.id,
            post_id: roll.post_id,
            roll: roll.roll.clone(),
            label: roll.label.clone(),
            result: roll.result,
            dice: None,
            created_at: to_rfc3339(&roll.created_at),
        }
    }
}

impl RollResponse {
    /// A freshly made roll, with its individual dice.
    pub fn with_outcome(roll: &RollResult, outcome: RollOutcome) -> Self {
        Self {
            dice: Some(outcome.dice),
            ..Self::from(roll)
        }
    }
}

/// A post with its comments and rolls.
#[derive(Debug, Serialize, ToSchema)]
pub struct PostResponse {
    /// Post ID.
    pub id: i64,
    /// Thread ID.
    pub thread_id: i64,
    /// Author, if the account still exists.
    pub owner_id: Option<i64>,
    /// Markdown body.
    pub content: String,
    /// Rendered body.
    pub content_html: String,
    /// Creation time.
    pub created_at: String,
    /// Relative creation time.
    pub created_since: Option<String>,
    /// Last update time.
    pub updated_at: Option<String>,
    /// Comments, oldest first.
    pub comments: Vec<CommentResponse>,
    /// Dice rolls, oldest first.
    pub rolls: Vec<RollResponse>,
}

impl From<&crate::board::Post> for PostResponse {
    fn from(post: &crate::board::Post) -> Self {
        Self {
            id: post.id,
            thread_id: post.thread_id,
            owner_id: post.owner_id,
            content: post.content.clone(),
            content_html: render_to_html(&post.content, RenderProfile::Post),
            created_at: to_rfc3339(&post.created_at),
            created_since: time_since_stored(&post.created_at),
            updated_at: post.updated_at.as_deref().map(to_rfc3339),
            comments: Vec::new(),
            rolls: Vec::new(),
        }
    }
}

impl From<&PostView> for PostResponse {
    fn from(view: &PostView) -> Self {
        Self {
            comments: view.comments.iter().map(CommentResponse::from).collect(),
            rolls: view.rolls.iter().map(RollResponse::from).collect(),
            ..Self::from(&view.post)
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` when the database answers.
    pub status: String,
    /// Crate version.
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{MemberRole, Post, Visibility};

    fn board() -> Board {
        Board {
            id: 1,
            title: "Tavern".to_string(),
            description: Some("Come <b>in</b>".to_string()),
            content: None,
            visibility: Visibility::Private,
            created_at: "2024-01-15 10:30:00".to_string(),
            updated_at: None,
        }
    }

    #[test]
    fn test_board_response_renders_and_escapes() {
        let response = BoardResponse::from(&board());
        assert_eq!(response.visibility, "private");
        assert_eq!(response.created_at, "2024-01-15T10:30:00Z");
        let html = response.description_html.unwrap();
        assert!(!html.contains("<b>"));
        assert!(html.contains("Come"));
    }

    #[test]
    fn test_board_detail_flags() {
        let detail = BoardDetailResponse::new(&board(), Standing::Registered);
        assert!(!detail.can_post);
        assert!(!detail.can_moderate);
        assert_eq!(detail.role, None);

        let detail = BoardDetailResponse::new(&board(), Standing::Member(MemberRole::Admin));
        assert!(detail.can_post);
        assert!(detail.can_moderate);
        assert_eq!(detail.role.as_deref(), Some("admin"));

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["title"], "Tavern");
        assert!(json.get("board").is_none());
    }

    #[test]
    fn test_post_response_includes_children() {
        let view = PostView {
            post: Post {
                id: 3,
                thread_id: 2,
                owner_id: None,
                content: "| a |\n|---|\n| 1 |".to_string(),
                created_at: "2024-01-15 10:30:00".to_string(),
                updated_at: None,
            },
            comments: vec![Comment {
                id: 9,
                post_id: 3,
                owner_id: 1,
                content: "nice".to_string(),
                created_at: "2024-01-15 10:31:00".to_string(),
                updated_at: None,
            }],
            rolls: vec![],
        };

        let response = PostResponse::from(&view);
        assert!(response.content_html.contains("table-striped"));
        assert_eq!(response.comments.len(), 1);
        assert!(response.rolls.is_empty());
    }

    #[test]
    fn test_roll_response_dice_only_when_fresh() {
        let roll = RollResult {
            id: 1,
            post_id: 3,
            roll: "2d6".to_string(),
            label: None,
            result: 7,
            created_at: "2024-01-15 10:30:00".to_string(),
        };
        let stored = serde_json::to_value(RollResponse::from(&roll)).unwrap();
        assert!(stored.get("dice").is_none());

        let fresh = RollResponse::with_outcome(
            &roll,
            RollOutcome {
                total: 7,
                dice: vec![3, 4],
            },
        );
        assert_eq!(fresh.dice, Some(vec![3, 4]));
    }
}
