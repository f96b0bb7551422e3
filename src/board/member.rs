//! Board membership model for Agora.

use super::types::MemberRole;

/// A user's membership of a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardMember {
    /// Board ID.
    pub board_id: i64,
    /// User ID.
    pub user_id: i64,
    /// Role within the board.
    pub role: MemberRole,
}

/// Membership row joined with the member's display name, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    /// User ID.
    pub user_id: i64,
    /// User display name.
    pub display_name: String,
    /// Role within the board.
    pub role: MemberRole,
}
