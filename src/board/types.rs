//! Board model for Agora.
//!
//! This module defines the Board struct together with the two closed tiers
//! that drive access control: board visibility and member role.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Board visibility tier.
///
/// Stored as a text label, never as a numeric discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Listed and readable by everyone; any signed-in user may post.
    #[default]
    Public,
    /// Listed and readable by everyone; only members may post.
    Private,
    /// Only members can see the board at all.
    Hidden,
}

impl Visibility {
    /// All tiers, in declaration order.
    pub const ALL: [Visibility; 3] = [Visibility::Public, Visibility::Private, Visibility::Hidden];

    /// Convert visibility to its stored label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Hidden => "hidden",
        }
    }

    /// Human-readable label.
    pub fn display_name(&self) -> &'static str {
        match self {
            Visibility::Public => "Public",
            Visibility::Private => "Private",
            Visibility::Hidden => "Hidden",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            "hidden" => Ok(Visibility::Hidden),
            _ => Err(format!("unknown visibility: {s}")),
        }
    }
}

/// Role of a user within one board.
///
/// Ordered `Member < Admin < Owner`; comparisons use the derived `Ord`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Regular member.
    #[default]
    Member,
    /// Board moderator.
    Admin,
    /// Board owner.
    Owner,
}

impl MemberRole {
    /// All roles, lowest first.
    pub const ALL: [MemberRole; 3] = [MemberRole::Member, MemberRole::Admin, MemberRole::Owner];

    /// Convert role to its stored label.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Member => "member",
            MemberRole::Admin => "admin",
            MemberRole::Owner => "owner",
        }
    }

    /// Human-readable label.
    pub fn display_name(&self) -> &'static str {
        match self {
            MemberRole::Member => "Member",
            MemberRole::Admin => "Admin",
            MemberRole::Owner => "Owner",
        }
    }

    /// Check if this role is at least `required`.
    pub fn can_access(&self, required: MemberRole) -> bool {
        *self >= required
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "member" => Ok(MemberRole::Member),
            "admin" => Ok(MemberRole::Admin),
            "owner" => Ok(MemberRole::Owner),
            _ => Err(format!("unknown member role: {s}")),
        }
    }
}

/// Board entity.
#[derive(Debug, Clone)]
pub struct Board {
    /// Unique board ID.
    pub id: i64,
    /// Board title.
    pub title: String,
    /// Short description shown in listings.
    pub description: Option<String>,
    /// Markdown body shown on the board page.
    pub content: Option<String>,
    /// Visibility tier.
    pub visibility: Visibility,
    /// Board creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: Option<String>,
}

/// Data for creating a new board.
#[derive(Debug, Clone)]
pub struct NewBoard {
    /// Board title.
    pub title: String,
    /// Board description.
    pub description: Option<String>,
    /// Board body.
    pub content: Option<String>,
    /// Visibility tier (defaults to Public).
    pub visibility: Visibility,
}

impl NewBoard {
    /// Create a new board with minimal required fields.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            content: None,
            visibility: Visibility::Public,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the body.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the visibility tier.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

/// Data for updating an existing board.
///
/// `Some(None)` clears a nullable field; `None` leaves it unchanged.
#[derive(Debug, Clone, Default)]
pub struct BoardUpdate {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New body.
    pub content: Option<Option<String>>,
    /// New visibility tier.
    pub visibility: Option<Visibility>,
}

impl BoardUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set new title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set new description.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Set new body.
    pub fn content(mut self, content: Option<String>) -> Self {
        self.content = Some(content);
        self
    }

    /// Set new visibility.
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Check if the update is empty.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.content.is_none()
            && self.visibility.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_round_trip_labels() {
        for visibility in Visibility::ALL {
            assert_eq!(visibility.as_str().parse::<Visibility>(), Ok(visibility));
        }
        assert_eq!("HIDDEN".parse::<Visibility>(), Ok(Visibility::Hidden));
        assert!("secret".parse::<Visibility>().is_err());
    }

    #[test]
    fn test_visibility_display() {
        assert_eq!(Visibility::Private.to_string(), "private");
        assert_eq!(Visibility::Private.display_name(), "Private");
        assert_eq!(Visibility::default(), Visibility::Public);
    }

    #[test]
    fn test_role_ordering() {
        assert!(MemberRole::Member < MemberRole::Admin);
        assert!(MemberRole::Admin < MemberRole::Owner);
        assert!(MemberRole::Owner.can_access(MemberRole::Admin));
        assert!(MemberRole::Admin.can_access(MemberRole::Admin));
        assert!(!MemberRole::Member.can_access(MemberRole::Admin));
    }

    #[test]
    fn test_role_labels() {
        for role in MemberRole::ALL {
            assert_eq!(role.as_str().parse::<MemberRole>(), Ok(role));
        }
        assert_eq!(MemberRole::Owner.display_name(), "Owner");
        assert!("moderator".parse::<MemberRole>().is_err());
    }

    #[test]
    fn test_serde_labels() {
        assert_eq!(
            serde_json::to_string(&Visibility::Hidden).unwrap(),
            "\"hidden\""
        );
        let role: MemberRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, MemberRole::Admin);
    }

    #[test]
    fn test_new_board_builder() {
        let board = NewBoard::new("General")
            .with_description("Chatter")
            .with_content("# Rules")
            .with_visibility(Visibility::Private);

        assert_eq!(board.title, "General");
        assert_eq!(board.description.as_deref(), Some("Chatter"));
        assert_eq!(board.content.as_deref(), Some("# Rules"));
        assert_eq!(board.visibility, Visibility::Private);
    }

    #[test]
    fn test_board_update_is_empty() {
        assert!(BoardUpdate::new().is_empty());
        assert!(!BoardUpdate::new().title("x").is_empty());
        assert!(!BoardUpdate::new().description(None).is_empty());
        assert!(!BoardUpdate::new().visibility(Visibility::Hidden).is_empty());
    }
}
