//! Request DTOs for the HTTP API.
//!
//! Length limits here reject oversized bodies early; the domain layer still
//! applies its own rules.

use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use super::validation::{no_control_chars, not_empty_trimmed, required_line};
use crate::board::{MemberRole, Visibility};

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address.
    #[validate(length(min = 1, max = 254, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,
}

/// User registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name shown next to content.
    #[validate(
        length(min = 1, max = 32, message = "Display name must be 1-32 characters"),
        custom(function = "no_control_chars")
    )]
    pub display_name: String,
    /// Email address used to sign in.
    #[validate(length(min = 1, max = 254, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,
    /// Password confirmation, checked when present.
    #[serde(default)]
    pub confirm_password: Option<String>,
}

/// Create board request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardRequest {
    /// Title.
    #[validate(
        length(max = 200, message = "Title is too long"),
        custom(function = "required_line")
    )]
    pub title: String,
    /// Short description (markdown).
    #[serde(default)]
    #[validate(length(max = 20000))]
    pub description: Option<String>,
    /// Longer body (markdown).
    #[serde(default)]
    #[validate(length(max = 20000))]
    pub content: Option<String>,
    /// Visibility tier, public if omitted.
    #[serde(default)]
    pub visibility: Visibility,
}

/// Update board request.
///
/// Omitted fields are left alone. An empty `description` or `content`
/// clears it.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBoardRequest {
    /// New title.
    #[validate(
        length(max = 200, message = "Title is too long"),
        custom(function = "required_line")
    )]
    pub title: Option<String>,
    /// New description.
    #[validate(length(max = 20000))]
    pub description: Option<String>,
    /// New body.
    #[validate(length(max = 20000))]
    pub content: Option<String>,
    /// New visibility tier.
    pub visibility: Option<Visibility>,
}

/// Add member request.
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// User to add.
    pub user_id: i64,
    /// Role to grant, member if omitted.
    #[serde(default)]
    pub role: MemberRole,
}

/// Change member role request.
#[derive(Debug, Deserialize)]
pub struct UpdateMemberRequest {
    /// New role.
    pub role: MemberRole,
}

/// Create thread request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateThreadRequest {
    /// Title.
    #[validate(
        length(max = 200, message = "Title is too long"),
        custom(function = "required_line")
    )]
    pub title: String,
    /// Opening body (markdown). May be empty.
    #[serde(default)]
    #[validate(length(max = 20000))]
    pub content: String,
    /// Lock the thread against replies.
    #[serde(default)]
    pub readonly: bool,
}

/// Update thread request.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateThreadRequest {
    /// New title.
    #[validate(
        length(max = 200, message = "Title is too long"),
        custom(function = "required_line")
    )]
    pub title: Option<String>,
    /// New body.
    #[validate(length(max = 20000))]
    pub content: Option<String>,
    /// New read-only flag.
    pub readonly: Option<bool>,
}

/// Body for creating or editing a post or comment.
#[derive(Debug, Deserialize, Validate)]
pub struct ContentRequest {
    /// Markdown body.
    #[validate(
        length(max = 20000, message = "Content is too long"),
        custom(function = "not_empty_trimmed")
    )]
    pub content: String,
}

/// Dice roll request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRollRequest {
    /// Dice expression, e.g. `2d6+3`.
    #[validate(length(min = 1, max = 128, message = "Roll must be 1-128 characters"))]
    pub roll: String,
    /// What the roll is for.
    #[validate(length(max = 64), custom(function = "no_control_chars"))]
    pub label: Option<String>,
}

/// Board index query.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BoardListQuery {
    /// Maximum number of boards.
    pub limit: Option<i64>,
}

/// Page-based pagination query.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// Page number, starting at 1.
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

/// Largest page size a client may ask for.
pub const MAX_PER_PAGE: u32 = 100;

impl PaginationQuery {
    /// The effective `(page, per_page)` given a default page size.
    pub fn resolve(&self, default_per_page: i64) -> (u32, u32) {
        let default = u32::try_from(default_per_page).unwrap_or(MAX_PER_PAGE);
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(default).clamp(1, MAX_PER_PAGE);
        (page, per_page)
    }

    /// The `(offset, limit)` pair for a query.
    pub fn to_offset_limit(&self, default_per_page: i64) -> (i64, i64) {
        let (page, per_page) = self.resolve(default_per_page);
        (
            i64::from(page - 1) * i64::from(per_page),
            i64::from(per_page),
        )
    }
}
