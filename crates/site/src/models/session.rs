//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use cascade_officials_core::{Email, MemberId, Role};

use crate::models::Member;

/// Session-stored member identity.
///
/// Minimal data stored in the session to identify the logged-in member. The
/// role is snapshotted at login; role changes take effect on next login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentMember {
    /// Member's database ID.
    pub id: MemberId,
    /// Member's email address.
    pub email: Email,
    /// Member's privilege level.
    pub role: Role,
    /// Display name shown in the portal header.
    pub display_name: Option<String>,
}

impl CurrentMember {
    /// Whether this member can see the executive section.
    #[must_use]
    pub fn is_executive(&self) -> bool {
        self.role.meets(Role::Executive)
    }

    /// Whether this member can see the admin section.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.meets(Role::Admin)
    }
}

impl From<&Member> for CurrentMember {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            email: member.email.clone(),
            role: member.role,
            display_name: member.display_name.clone(),
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in member.
    pub const CURRENT_MEMBER: &str = "current_member";

    /// Single-slot path a denied visitor intended to reach; consumed once
    /// after login to return them there.
    pub const REDIRECT_AFTER_LOGIN: &str = "redirectAfterLogin";

    /// One-shot marker set on logout so the next portal denial does not
    /// immediately reopen the login prompt.
    pub const JUST_LOGGED_OUT: &str = "justLoggedOut";
}
