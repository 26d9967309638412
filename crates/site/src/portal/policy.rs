//! Route policy: path prefixes mapped to minimum roles.
//!
//! The policy is static configuration, loaded once and immutable. A path may
//! fall under several prefixes; the entry with the highest rank governs.

use std::sync::LazyLock;

use cascade_officials_core::Role;

/// The coarse prefix of the protected namespace, used by the edge gate.
pub const PORTAL_PREFIX: &str = "/portal";

/// Where a logged-in member lands; role-gated sections redirect here when
/// the member's rank is insufficient.
pub const MEMBER_HOME: &str = "/portal";

/// A mapping from path prefixes to the minimum role required under them.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    entries: Vec<(String, Role)>,
}

impl RoutePolicy {
    /// Build a policy from (prefix, minimum role) pairs. Insertion order is
    /// irrelevant to lookups.
    #[must_use]
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Role)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(prefix, role)| (prefix.into(), role))
                .collect(),
        }
    }

    /// The minimum role required to access `path`, or `None` if the path is
    /// unrestricted.
    ///
    /// Every entry whose prefix is a string prefix of the path matches
    /// (trailing slashes normalized on both sides); among the matches the
    /// **highest rank** wins. This is deliberately not "longest prefix
    /// wins": a shorter prefix may legitimately require a higher role, and
    /// the stricter rule must still apply.
    #[must_use]
    pub fn required_role_for(&self, path: &str) -> Option<Role> {
        let path = normalize(path);
        self.entries
            .iter()
            .filter(|(prefix, _)| path.starts_with(normalize(prefix)))
            .map(|&(_, role)| role)
            .max_by_key(|role| role.rank())
    }
}

/// Strip trailing slashes so `/portal` and `/portal/` compare equal. The
/// bare root `/` is left alone.
fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// The portal route policy.
///
/// `/portal` itself requires a logged-in official; the executive and admin
/// sections tighten that. Pages outside the table are unrestricted.
pub static PORTAL_POLICY: LazyLock<RoutePolicy> = LazyLock::new(|| {
    RoutePolicy::new([
        ("/portal", Role::Official),
        ("/portal/resources", Role::Official),
        ("/portal/news", Role::Official),
        ("/portal/profile", Role::Official),
        ("/portal/directory", Role::Official),
        ("/portal/executive", Role::Executive),
        ("/portal/executive/minutes", Role::Executive),
        ("/portal/executive/announcements", Role::Executive),
        ("/portal/admin", Role::Admin),
        ("/portal/admin/members", Role::Admin),
        ("/portal/admin/settings", Role::Admin),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_path_is_unrestricted() {
        let policy = RoutePolicy::new([("/portal", Role::Official)]);
        assert_eq!(policy.required_role_for("/about"), None);
        assert_eq!(policy.required_role_for("/"), None);
    }

    #[test]
    fn empty_policy_means_everything_public() {
        let policy = RoutePolicy::new(Vec::<(String, Role)>::new());
        assert_eq!(policy.required_role_for("/portal/admin"), None);
    }

    #[test]
    fn exact_prefix_match_counts() {
        let policy = RoutePolicy::new([("/portal", Role::Official)]);
        assert_eq!(policy.required_role_for("/portal"), Some(Role::Official));
    }

    #[test]
    fn trailing_slashes_are_normalized() {
        let policy = RoutePolicy::new([("/portal/", Role::Official)]);
        assert_eq!(policy.required_role_for("/portal"), Some(Role::Official));
        assert_eq!(policy.required_role_for("/portal/"), Some(Role::Official));
        assert_eq!(
            policy.required_role_for("/portal/resources/"),
            Some(Role::Official)
        );
    }

    #[test]
    fn highest_rank_wins_among_matches() {
        let policy = RoutePolicy::new([
            ("/portal", Role::Official),
            ("/portal/admin", Role::Admin),
        ]);
        assert_eq!(
            policy.required_role_for("/portal/admin/members"),
            Some(Role::Admin)
        );
    }

    #[test]
    fn highest_rank_wins_regardless_of_entry_order() {
        let forward = RoutePolicy::new([
            ("/portal", Role::Official),
            ("/portal/admin", Role::Admin),
        ]);
        let reverse = RoutePolicy::new([
            ("/portal/admin", Role::Admin),
            ("/portal", Role::Official),
        ]);
        assert_eq!(
            forward.required_role_for("/portal/admin"),
            reverse.required_role_for("/portal/admin")
        );
    }

    #[test]
    fn shorter_prefix_with_higher_role_still_governs() {
        // Not "most specific string wins": the stricter rule applies even
        // when a longer prefix asks for less.
        let policy = RoutePolicy::new([
            ("/portal", Role::Executive),
            ("/portal/open-area", Role::Official),
        ]);
        assert_eq!(
            policy.required_role_for("/portal/open-area/schedule"),
            Some(Role::Executive)
        );
    }

    #[test]
    fn portal_policy_covers_the_sections() {
        assert_eq!(
            PORTAL_POLICY.required_role_for("/portal"),
            Some(Role::Official)
        );
        assert_eq!(
            PORTAL_POLICY.required_role_for("/portal/executive/minutes"),
            Some(Role::Executive)
        );
        assert_eq!(
            PORTAL_POLICY.required_role_for("/portal/admin/members"),
            Some(Role::Admin)
        );
        assert_eq!(PORTAL_POLICY.required_role_for("/news"), None);
    }
}
