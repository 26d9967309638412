//! Member domain types.
//!
//! These types represent validated domain objects separate from database row
//! types.

use chrono::{DateTime, Utc};

use cascade_officials_core::{Email, MemberId, Role};

/// A registered member of the association (domain type).
///
/// The role is assigned by the membership system (database), never computed
/// from request data.
#[derive(Debug, Clone)]
pub struct Member {
    /// Unique member ID.
    pub id: MemberId,
    /// Member's email address (login identifier).
    pub email: Email,
    /// Member's privilege level.
    pub role: Role,
    /// Display name shown in the portal.
    pub display_name: Option<String>,
    /// Officiating certification level, if recorded.
    pub certification_level: Option<String>,
    /// When the member registered.
    pub created_at: DateTime<Utc>,
    /// When the member last logged in.
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Member {
    /// Name to greet the member with: display name, or the email local part.
    #[must_use]
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .unwrap_or_else(|| self.email.as_str().split('@').next().unwrap_or(""))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn member(display_name: Option<&str>) -> Member {
        Member {
            id: MemberId::new(1),
            email: Email::parse("jordan@example.com").unwrap(),
            role: Role::Official,
            display_name: display_name.map(String::from),
            certification_level: None,
            created_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn greeting_prefers_display_name() {
        assert_eq!(member(Some("Jordan R.")).greeting_name(), "Jordan R.");
    }

    #[test]
    fn greeting_falls_back_to_email_local_part() {
        assert_eq!(member(None).greeting_name(), "jordan");
    }
}
