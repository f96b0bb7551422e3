//! Board access policy for Agora.
//!
//! Every predicate here is a pure function of a board's visibility tier and
//! the viewer's standing in that board. Nothing touches the database.
//!
//! | tier    | list / view     | post              |
//! |---------|-----------------|-------------------|
//! | Public  | everyone        | any signed-in user |
//! | Private | everyone        | members           |
//! | Hidden  | members         | members           |

use super::types::{MemberRole, Visibility};

/// A viewer's relationship to one board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standing {
    /// Not signed in.
    Anonymous,
    /// Signed in, with no membership in this board.
    Registered,
    /// Signed in and holding the given role.
    Member(MemberRole),
}

impl Standing {
    /// Build a standing from authentication state and membership lookup.
    pub fn from_parts(authenticated: bool, role: Option<MemberRole>) -> Self {
        match (authenticated, role) {
            (true, Some(role)) => Standing::Member(role),
            (true, None) => Standing::Registered,
            (false, _) => Standing::Anonymous,
        }
    }

    /// The member role, if any.
    pub fn role(&self) -> Option<MemberRole> {
        match self {
            Standing::Member(role) => Some(*role),
            _ => None,
        }
    }

    fn is_member(&self) -> bool {
        matches!(self, Standing::Member(_))
    }

    fn at_least(&self, required: MemberRole) -> bool {
        self.role().is_some_and(|role| role.can_access(required))
    }
}

/// Whether the board appears in the viewer's board index.
pub fn can_list(visibility: Visibility, standing: Standing) -> bool {
    match visibility {
        Visibility::Public | Visibility::Private => true,
        Visibility::Hidden => standing.is_member(),
    }
}

/// Whether the viewer may read the board and everything in it.
pub fn can_view(visibility: Visibility, standing: Standing) -> bool {
    can_list(visibility, standing)
}

/// Whether the viewer may create threads, posts and comments.
pub fn can_post(visibility: Visibility, standing: Standing) -> bool {
    match visibility {
        Visibility::Public => standing != Standing::Anonymous,
        Visibility::Private | Visibility::Hidden => standing.is_member(),
    }
}

/// Whether the viewer may moderate (edit board settings, manage members,
/// edit or delete other people's content).
pub fn can_moderate(standing: Standing) -> bool {
    standing.at_least(MemberRole::Admin)
}

/// Whether the viewer may delete the board and grant or revoke ownership.
pub fn can_administer(standing: Standing) -> bool {
    standing.at_least(MemberRole::Owner)
}
