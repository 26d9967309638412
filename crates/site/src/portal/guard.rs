//! Authentication lifecycle and portal guard decisions.
//!
//! This module is the decision core of portal access control, kept free of
//! HTTP and rendering so every transition can be exercised directly:
//!
//! - [`AuthSession`] is an explicit state machine over the identity
//!   provider's events (resolve, login, logout, failure). It is constructed
//!   and owned by its caller; there are no module-level globals.
//! - [`Guard`] turns an auth state plus a protected path into a
//!   [`Decision`]: allow, wait, or redirect. A guard instance issues at most
//!   one redirect, no matter how often it is re-evaluated.
//!
//! The HTTP layer (extractors in `middleware::auth`) maps decisions onto
//! responses and persists the redirect intent into the browser session.

use cascade_officials_core::{Role, has_permission};

use crate::models::CurrentMember;
use crate::portal::policy::MEMBER_HOME;

/// Where denied anonymous visitors are sent.
pub const PUBLIC_ENTRY: &str = "/";

/// Authentication state, as resolved from the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Identity not yet resolved. No access decision may be made here.
    Resolving,
    /// Resolved: nobody is logged in.
    Anonymous,
    /// Resolved: a member is logged in.
    Authenticated(CurrentMember),
}

impl AuthState {
    /// The role of the current member, if any.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        match self {
            Self::Authenticated(member) => Some(member.role),
            _ => None,
        }
    }
}

/// The auth session: current state plus the one-shot markers that shape the
/// next denial.
///
/// Transitions follow the identity provider's event order; a repeated
/// `resolve` is last-write-wins. A provider failure is recorded and treated
/// as anonymous (fail-closed).
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    state: SessionState,
    just_logged_out: bool,
    error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum SessionState {
    #[default]
    Resolving,
    Anonymous,
    Authenticated(CurrentMember),
}

impl AuthSession {
    /// A fresh session, still resolving.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current auth state. A recorded provider error degrades
    /// `Authenticated` to `Anonymous`; authorization never fails open.
    #[must_use]
    pub fn state(&self) -> AuthState {
        if self.error.is_some() {
            return match self.state {
                SessionState::Resolving => AuthState::Resolving,
                _ => AuthState::Anonymous,
            };
        }
        match &self.state {
            SessionState::Resolving => AuthState::Resolving,
            SessionState::Anonymous => AuthState::Anonymous,
            SessionState::Authenticated(member) => AuthState::Authenticated(member.clone()),
        }
    }

    /// Provider error, if one was recorded.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Identity provider resolved. Last write wins if the provider fires
    /// more than once.
    pub fn resolve(&mut self, member: Option<CurrentMember>) {
        self.state = match member {
            Some(m) => SessionState::Authenticated(m),
            None => SessionState::Anonymous,
        };
    }

    /// A member logged in. A pending logout marker belongs to the previous
    /// member and is discarded.
    pub fn login(&mut self, member: CurrentMember) {
        self.state = SessionState::Authenticated(member);
        self.just_logged_out = false;
        self.error = None;
    }

    /// The member explicitly logged out. Records the one-shot marker that
    /// suppresses the login prompt on the immediately following denial.
    pub fn logout(&mut self) {
        self.state = SessionState::Anonymous;
        self.just_logged_out = true;
    }

    /// The identity provider failed. The session degrades to anonymous.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        if self.state == SessionState::Resolving {
            self.state = SessionState::Anonymous;
        }
    }

    /// Consume the just-logged-out marker, if set. One-shot.
    pub fn take_just_logged_out(&mut self) -> bool {
        std::mem::take(&mut self.just_logged_out)
    }

    /// Whether the logout marker is pending (test/inspection hook).
    #[must_use]
    pub const fn just_logged_out(&self) -> bool {
        self.just_logged_out
    }
}

/// A planned redirect away from protected content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectPlan {
    /// Navigation target.
    pub to: String,
    /// Path to remember as the redirect intent, to return to after login.
    pub remember: Option<String>,
    /// Whether the login prompt should open after navigation lands.
    pub prompt_login: bool,
}

impl RedirectPlan {
    /// The full location including query parameters, as the edge gate and
    /// the guard both emit it.
    #[must_use]
    pub fn location(&self) -> String {
        match (&self.remember, self.prompt_login) {
            (Some(path), true) => format!(
                "{}?redirect={}&auth=required",
                self.to,
                urlencoding::encode(path)
            ),
            (Some(path), false) => format!("{}?redirect={}", self.to, urlencoding::encode(path)),
            (None, true) => format!("{}?auth=required", self.to),
            (None, false) => self.to.clone(),
        }
    }
}

/// Outcome of evaluating a guard against the current auth state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Render the protected content.
    Allow,
    /// Identity unresolved; render a loading placeholder, decide nothing.
    Wait,
    /// Deny: navigate per the plan and render a transient placeholder.
    Redirect(RedirectPlan),
    /// A redirect was already issued by this guard; keep rendering the
    /// placeholder, do not fire again.
    Redirecting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum GuardPhase {
    #[default]
    Watching,
    Redirected,
}

/// Guard for a protected subtree: decides allow/wait/redirect from the auth
/// state, issuing at most one redirect per instance.
#[derive(Debug, Clone, Default)]
pub struct Guard {
    phase: GuardPhase,
    /// Diagnostic escape hatch; wired to config only in debug builds.
    bypass: bool,
}

impl Guard {
    /// A guard with no bypass.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A guard honoring the development bypass flag.
    #[must_use]
    pub const fn with_bypass(bypass: bool) -> Self {
        Self {
            phase: GuardPhase::Watching,
            bypass,
        }
    }

    /// Evaluate access to `path`. `require_auth` is false for subtrees that
    /// merely personalize when someone is logged in.
    ///
    /// Re-evaluation is expected (every auth-state change); the denial
    /// redirect fires at most once per guard.
    pub fn evaluate(
        &mut self,
        session: &mut AuthSession,
        require_auth: bool,
        path: &str,
    ) -> Decision {
        if self.bypass {
            return Decision::Allow;
        }

        match session.state() {
            AuthState::Resolving => Decision::Wait,
            AuthState::Authenticated(_) => Decision::Allow,
            AuthState::Anonymous if !require_auth => Decision::Allow,
            AuthState::Anonymous => {
                if self.phase == GuardPhase::Redirected {
                    return Decision::Redirecting;
                }
                self.phase = GuardPhase::Redirected;

                if session.take_just_logged_out() {
                    // Logout echo: go home without reopening the login
                    // prompt, and leave no intent behind.
                    Decision::Redirect(RedirectPlan {
                        to: PUBLIC_ENTRY.to_string(),
                        remember: None,
                        prompt_login: false,
                    })
                } else {
                    Decision::Redirect(RedirectPlan {
                        to: PUBLIC_ENTRY.to_string(),
                        remember: Some(path.to_string()),
                        prompt_login: true,
                    })
                }
            }
        }
    }

    /// Evaluate a role-gated subtree (executive/admin sections).
    ///
    /// The caller is assumed already authenticated at this layer: an
    /// insufficient rank redirects to the member home, never to the public
    /// entry point, and never opens a login prompt. Unresolved state waits.
    pub fn evaluate_role(&mut self, session: &AuthSession, required: Role) -> Decision {
        if self.bypass {
            return Decision::Allow;
        }

        match session.state() {
            AuthState::Resolving => Decision::Wait,
            state if has_permission(state.role(), required) => Decision::Allow,
            _ => {
                if self.phase == GuardPhase::Redirected {
                    return Decision::Redirecting;
                }
                self.phase = GuardPhase::Redirected;
                Decision::Redirect(RedirectPlan {
                    to: MEMBER_HOME.to_string(),
                    remember: None,
                    prompt_login: false,
                })
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cascade_officials_core::{Email, MemberId};

    fn member(role: Role) -> CurrentMember {
        CurrentMember {
            id: MemberId::new(1),
            email: Email::parse("official@example.com").unwrap(),
            role,
            display_name: None,
        }
    }

    #[test]
    fn resolving_never_redirects() {
        let mut session = AuthSession::new();
        let mut guard = Guard::new();
        assert_eq!(
            guard.evaluate(&mut session, true, "/portal/resources"),
            Decision::Wait
        );
        // Still waiting on repeated evaluation, no redirect sneaks out.
        assert_eq!(
            guard.evaluate(&mut session, true, "/portal/resources"),
            Decision::Wait
        );
    }

    #[test]
    fn anonymous_denial_remembers_intent_and_prompts_login() {
        let mut session = AuthSession::new();
        session.resolve(None);
        let mut guard = Guard::new();

        let decision = guard.evaluate(&mut session, true, "/portal/resources");
        let Decision::Redirect(plan) = decision else {
            panic!("expected redirect, got {decision:?}");
        };
        assert_eq!(plan.to, PUBLIC_ENTRY);
        assert_eq!(plan.remember.as_deref(), Some("/portal/resources"));
        assert!(plan.prompt_login);
        assert_eq!(
            plan.location(),
            "/?redirect=%2Fportal%2Fresources&auth=required"
        );
    }

    #[test]
    fn denial_redirect_fires_exactly_once() {
        let mut session = AuthSession::new();
        session.resolve(None);
        let mut guard = Guard::new();

        assert!(matches!(
            guard.evaluate(&mut session, true, "/portal"),
            Decision::Redirect(_)
        ));
        // Re-renders keep showing the placeholder without re-firing.
        for _ in 0..3 {
            assert_eq!(
                guard.evaluate(&mut session, true, "/portal"),
                Decision::Redirecting
            );
        }
    }

    #[test]
    fn logout_suppresses_the_login_prompt_once() {
        let mut session = AuthSession::new();
        session.resolve(Some(member(Role::Official)));
        session.logout();

        let mut guard = Guard::new();
        let decision = guard.evaluate(&mut session, true, "/portal");
        let Decision::Redirect(plan) = decision else {
            panic!("expected redirect");
        };
        assert!(!plan.prompt_login);
        assert_eq!(plan.remember, None);
        assert_eq!(plan.location(), "/");

        // Marker is one-shot: the next denial prompts again.
        let mut second = Guard::new();
        let Decision::Redirect(plan) = second.evaluate(&mut session, true, "/portal") else {
            panic!("expected redirect");
        };
        assert!(plan.prompt_login);
    }

    #[test]
    fn authenticated_or_unrequired_subtrees_render() {
        let mut session = AuthSession::new();
        session.resolve(Some(member(Role::Official)));
        let mut guard = Guard::new();
        assert_eq!(guard.evaluate(&mut session, true, "/portal"), Decision::Allow);

        let mut anon = AuthSession::new();
        anon.resolve(None);
        let mut guard = Guard::new();
        assert_eq!(guard.evaluate(&mut anon, false, "/news"), Decision::Allow);
    }

    #[test]
    fn bypass_always_allows() {
        let mut session = AuthSession::new();
        let mut guard = Guard::with_bypass(true);
        assert_eq!(guard.evaluate(&mut session, true, "/portal"), Decision::Allow);
        assert_eq!(guard.evaluate_role(&session, Role::Admin), Decision::Allow);
    }

    #[test]
    fn login_after_logout_clears_stale_state() {
        let mut session = AuthSession::new();
        session.resolve(Some(member(Role::Official)));
        session.logout();
        session.login(member(Role::Official));
        assert!(matches!(session.state(), AuthState::Authenticated(_)));
        // The marker belonged to the previous login and must not survive.
        assert!(!session.just_logged_out());

        let mut guard = Guard::new();
        assert_eq!(guard.evaluate(&mut session, true, "/portal"), Decision::Allow);
    }

    #[test]
    fn provider_failure_fails_closed() {
        let mut session = AuthSession::new();
        session.fail("identity provider unreachable");
        assert_eq!(session.state(), AuthState::Anonymous);
        assert_eq!(session.error(), Some("identity provider unreachable"));

        let mut guard = Guard::new();
        assert!(matches!(
            guard.evaluate(&mut session, true, "/portal"),
            Decision::Redirect(_)
        ));
    }

    #[test]
    fn repeated_resolve_is_last_write_wins() {
        let mut session = AuthSession::new();
        session.resolve(Some(member(Role::Official)));
        session.resolve(None);
        assert_eq!(session.state(), AuthState::Anonymous);
    }

    #[test]
    fn role_gate_waits_while_resolving() {
        let session = AuthSession::new();
        let mut guard = Guard::new();
        assert_eq!(guard.evaluate_role(&session, Role::Admin), Decision::Wait);
    }

    #[test]
    fn role_gate_redirects_insufficient_rank_to_member_home() {
        let mut session = AuthSession::new();
        session.resolve(Some(member(Role::Executive)));

        let mut guard = Guard::new();
        let decision = guard.evaluate_role(&session, Role::Admin);
        let Decision::Redirect(plan) = decision else {
            panic!("expected redirect");
        };
        // A logged-in non-admin goes to their own home, not to logout.
        assert_eq!(plan.to, MEMBER_HOME);
        assert!(!plan.prompt_login);
        assert_eq!(
            guard.evaluate_role(&session, Role::Admin),
            Decision::Redirecting
        );
    }

    #[test]
    fn role_gate_uses_rank_not_equality() {
        let mut session = AuthSession::new();
        session.resolve(Some(member(Role::Admin)));
        let mut guard = Guard::new();
        // Admin rank satisfies an executive-gated section.
        assert_eq!(
            guard.evaluate_role(&session, Role::Executive),
            Decision::Allow
        );
    }

    #[test]
    fn role_gate_never_prompts_login() {
        let mut session = AuthSession::new();
        session.resolve(None);
        let mut guard = Guard::new();
        let Decision::Redirect(plan) = guard.evaluate_role(&session, Role::Admin) else {
            panic!("expected redirect");
        };
        assert!(!plan.prompt_login);
    }
}
