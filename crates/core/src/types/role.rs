//! Member role hierarchy.
//!
//! Roles form a closed, totally ordered set of privilege levels. Access
//! checks compare ranks (`>=`), never exact equality, so a higher role can
//! always do what a lower one can.

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown role string.
///
/// Role strings arrive from the identity provider and the database; anything
/// outside the closed set is rejected at that boundary rather than mapped to
/// a default.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct RoleError(pub String);

/// A member's privilege level.
///
/// Ordered from least to most privileged:
/// `Public < Official < Executive < Admin`.
///
/// `Public` is the rank of unrestricted content; an anonymous visitor has
/// *no* role at all, which is distinct (see [`has_permission`]).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Unrestricted; the minimum role of public pages.
    #[default]
    Public,
    /// A registered basketball official (regular member).
    Official,
    /// An executive board member.
    Executive,
    /// A site administrator.
    Admin,
}

impl Role {
    /// Every role, in ascending rank order.
    pub const ALL: [Self; 4] = [Self::Public, Self::Official, Self::Executive, Self::Admin];

    /// Numeric rank, strictly increasing with privilege (0..=3).
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Public => 0,
            Self::Official => 1,
            Self::Executive => 2,
            Self::Admin => 3,
        }
    }

    /// Whether this role meets or exceeds `required`.
    #[must_use]
    pub const fn meets(self, required: Self) -> bool {
        self.rank() >= required.rank()
    }
}

/// Whether a (possibly absent) role satisfies a required role.
///
/// An absent role never has permission, not even for `Role::Public`-ranked
/// checks: "no role" means "not authenticated", which is a different thing
/// from "authenticated with the lowest rank".
#[must_use]
pub fn has_permission(user_role: Option<Role>, required: Role) -> bool {
    user_role.is_some_and(|role| role.meets(required))
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Public => "public",
            Self::Official => "official",
            Self::Executive => "executive",
            Self::Admin => "admin",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "official" => Ok(Self::Official),
            "executive" => Ok(Self::Executive),
            "admin" => Ok(Self::Admin),
            other => Err(RoleError(other.to_owned())),
        }
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Role {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.to_string(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ranks_are_strictly_increasing() {
        let ranks: Vec<u8> = Role::ALL.iter().map(|r| r.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
        for pair in Role::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn permission_matches_rank_comparison() {
        for user in Role::ALL {
            for required in Role::ALL {
                assert_eq!(
                    has_permission(Some(user), required),
                    user.rank() >= required.rank(),
                    "{user} vs {required}"
                );
            }
        }
    }

    #[test]
    fn absent_role_never_has_permission() {
        for required in Role::ALL {
            assert!(!has_permission(None, required));
        }
    }

    #[test]
    fn admin_meets_everything() {
        for required in Role::ALL {
            assert!(Role::Admin.meets(required));
        }
    }

    #[test]
    fn official_does_not_meet_executive_or_admin() {
        assert!(Role::Official.meets(Role::Official));
        assert!(!Role::Official.meets(Role::Executive));
        assert!(!Role::Official.meets(Role::Admin));
    }

    #[test]
    fn parse_round_trips() {
        for role in Role::ALL {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert!("superadmin".parse::<Role>().is_err());
        assert!("Official".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Executive).unwrap(), "\"executive\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
