//! Authentication extractors for portal routes.
//!
//! These wire the pure guard decisions (`portal::guard`) to requests:
//! extractors resolve the current member from the session, run the guard,
//! persist the redirect intent, and map the decision onto a response.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn dashboard(
//!     RequireMember(member): RequireMember,
//! ) -> impl IntoResponse {
//!     format!("Hello, {}!", member.email)
//! }
//! ```

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use cascade_officials_core::{Email, MemberId, Role};

use crate::models::{CurrentMember, session_keys};
use crate::portal::guard::{AuthSession, Decision, Guard};
use crate::portal::policy::PORTAL_POLICY;
use crate::state::AppState;

/// Extractor that requires a logged-in member whose role satisfies the
/// route policy for the requested path.
///
/// Anonymous HTML requests are redirected to the public entry point with
/// the intended path remembered; API requests get 401. A member whose rank
/// falls short of the policy for this path is sent to the member home.
pub struct RequireMember(pub CurrentMember);

/// Extractor that requires executive rank or above.
pub struct RequireExecutive(pub CurrentMember);

/// Extractor that requires admin rank.
///
/// A logged-in member without admin rank is redirected to the member home,
/// never to the public entry point, and never sees a login prompt.
pub struct RequireAdmin(pub CurrentMember);

/// Error returned when a portal requirement is not met.
pub enum PortalRejection {
    /// Redirect (login flow or member home, per the guard's plan).
    Redirect(String),
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for PortalRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(location) => Redirect::to(&location).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireMember {
    type Rejection = PortalRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let path = request_path(parts);
        let required = PORTAL_POLICY.required_role_for(&path).unwrap_or(Role::Official);
        require_rank(parts, state, &path, required).await.map(Self)
    }
}

impl FromRequestParts<AppState> for RequireExecutive {
    type Rejection = PortalRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let path = request_path(parts);
        require_rank(parts, state, &path, Role::Executive)
            .await
            .map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = PortalRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let path = request_path(parts);
        require_rank(parts, state, &path, Role::Admin).await.map(Self)
    }
}

/// Full request path as the client sent it.
///
/// Nested routers rewrite `parts.uri` to the remainder after the matched
/// prefix, so `/portal/executive` arrives here as `/executive`.
/// `OriginalUri` keeps the unstripped path the route policy and the
/// redirect intent need.
fn request_path(parts: &Parts) -> String {
    parts
        .extensions
        .get::<OriginalUri>()
        .map_or_else(|| parts.uri.path().to_owned(), |uri| uri.path().to_owned())
}

/// Rebuild the auth state machine from what the session holds.
///
/// The logout marker only matters for an anonymous visitor; a stored login
/// must never be knocked back to anonymous by a stale marker.
async fn resolve_auth(session: &Session, stored: Option<CurrentMember>) -> AuthSession {
    let anonymous = stored.is_none();
    let mut auth = AuthSession::new();
    auth.resolve(stored);
    if anonymous && take_logged_out(session).await {
        auth.logout();
    }
    auth
}

/// Shared gate: resolve the member, rebuild the auth session, and run the
/// guard for `required` rank on `path`.
async fn require_rank(
    parts: &mut Parts,
    state: &AppState,
    path: &str,
    required: Role,
) -> Result<CurrentMember, PortalRejection> {
    if state.auth_bypass() {
        // Diagnostic escape hatch (debug builds only): render everything
        // with a synthetic admin member.
        return Ok(dev_member());
    }

    // Session is set by SessionManagerLayer
    let session = parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or(PortalRejection::Unauthorized)?;

    let stored: Option<CurrentMember> = session
        .get(session_keys::CURRENT_MEMBER)
        .await
        .ok()
        .flatten();

    let mut auth = resolve_auth(&session, stored).await;

    let mut guard = Guard::new();

    // Authentication first: is anyone logged in at all?
    match guard.evaluate(&mut auth, true, path) {
        Decision::Allow | Decision::Wait => {}
        Decision::Redirect(plan) => {
            if path.starts_with("/api/") {
                return Err(PortalRejection::Unauthorized);
            }
            if let Some(intent) = &plan.remember {
                remember_intent(&session, intent).await;
            }
            return Err(PortalRejection::Redirect(plan.location()));
        }
        Decision::Redirecting => return Err(PortalRejection::Unauthorized),
    }

    // Then rank: does the logged-in member meet the requirement?
    match guard.evaluate_role(&auth, required) {
        Decision::Allow => current(&auth).ok_or(PortalRejection::Unauthorized),
        Decision::Redirect(plan) => Err(PortalRejection::Redirect(plan.location())),
        Decision::Wait | Decision::Redirecting => Err(PortalRejection::Unauthorized),
    }
}

/// Synthetic member used when the dev auth bypass is active.
fn dev_member() -> CurrentMember {
    CurrentMember {
        id: MemberId::new(0),
        email: Email::parse("dev@localhost.test").unwrap_or_else(|_| unreachable!()),
        role: Role::Admin,
        display_name: Some("Dev Bypass".to_owned()),
    }
}

fn current(auth: &AuthSession) -> Option<CurrentMember> {
    match auth.state() {
        crate::portal::guard::AuthState::Authenticated(member) => Some(member),
        _ => None,
    }
}

/// Extractor that optionally gets the current member.
///
/// Unlike `RequireMember`, this never rejects; public pages use it to
/// personalize the header when someone is logged in.
pub struct OptionalMember(pub Option<CurrentMember>);

impl<S> FromRequestParts<S> for OptionalMember
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let member = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentMember>(session_keys::CURRENT_MEMBER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(member))
    }
}

// =============================================================================
// Session helpers
// =============================================================================

/// Set the current member in the session (login).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_member(
    session: &Session,
    member: &CurrentMember,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_MEMBER, member).await
}

/// Clear the current member from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_member(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentMember>(session_keys::CURRENT_MEMBER)
        .await?;
    Ok(())
}

/// Remember the path a denied visitor intended to reach. Single slot,
/// overwritten rather than appended.
pub async fn remember_intent(session: &Session, path: &str) {
    if let Err(error) = session
        .insert(session_keys::REDIRECT_AFTER_LOGIN, path.to_owned())
        .await
    {
        tracing::warn!(%error, "failed to store redirect intent");
    }
}

/// Consume the stored redirect intent, if any. Read-then-delete: a second
/// call returns `None`.
pub async fn take_intent(session: &Session) -> Option<String> {
    session
        .remove::<String>(session_keys::REDIRECT_AFTER_LOGIN)
        .await
        .ok()
        .flatten()
}

/// Record that the member just logged out, so the next portal denial does
/// not immediately reopen the login prompt.
pub async fn mark_logged_out(session: &Session) {
    if let Err(error) = session.insert(session_keys::JUST_LOGGED_OUT, true).await {
        tracing::warn!(%error, "failed to store logout marker");
    }
}

/// Consume the just-logged-out marker. One-shot.
pub async fn take_logged_out(session: &Session) -> bool {
    session
        .remove::<bool>(session_keys::JUST_LOGGED_OUT)
        .await
        .ok()
        .flatten()
        .unwrap_or(false)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn redirect_intent_is_read_then_delete() {
        let session = session();
        remember_intent(&session, "/portal/resources").await;

        assert_eq!(
            take_intent(&session).await.as_deref(),
            Some("/portal/resources")
        );
        // Second read finds nothing.
        assert_eq!(take_intent(&session).await, None);
    }

    #[tokio::test]
    async fn intent_slot_is_overwritten_not_appended() {
        let session = session();
        remember_intent(&session, "/portal").await;
        remember_intent(&session, "/portal/admin").await;

        assert_eq!(take_intent(&session).await.as_deref(), Some("/portal/admin"));
        assert_eq!(take_intent(&session).await, None);
    }

    #[tokio::test]
    async fn logout_marker_is_one_shot() {
        let session = session();
        assert!(!take_logged_out(&session).await);

        mark_logged_out(&session).await;
        assert!(take_logged_out(&session).await);
        assert!(!take_logged_out(&session).await);
    }

    #[tokio::test]
    async fn member_round_trip_and_clear() {
        let session = session();
        let member = CurrentMember {
            id: MemberId::new(7),
            email: Email::parse("ref@example.com").unwrap(),
            role: Role::Official,
            display_name: None,
        };

        set_current_member(&session, &member).await.unwrap();
        let stored: Option<CurrentMember> = session
            .get(session_keys::CURRENT_MEMBER)
            .await
            .ok()
            .flatten();
        assert_eq!(stored.map(|m| m.id), Some(MemberId::new(7)));

        clear_current_member(&session).await.unwrap();
        let stored: Option<CurrentMember> = session
            .get(session_keys::CURRENT_MEMBER)
            .await
            .ok()
            .flatten();
        assert!(stored.is_none());
    }

    fn official() -> CurrentMember {
        CurrentMember {
            id: MemberId::new(3),
            email: Email::parse("official@example.com").unwrap(),
            role: Role::Official,
            display_name: None,
        }
    }

    #[tokio::test]
    async fn stale_logout_marker_does_not_sign_out_a_stored_member() {
        let session = session();
        mark_logged_out(&session).await;

        let auth = resolve_auth(&session, Some(official())).await;
        assert!(matches!(
            auth.state(),
            crate::portal::guard::AuthState::Authenticated(_)
        ));
        // The marker is left for the next anonymous denial, not consumed.
        assert!(take_logged_out(&session).await);
    }

    #[tokio::test]
    async fn logout_marker_applies_to_anonymous_sessions() {
        let session = session();
        mark_logged_out(&session).await;

        let auth = resolve_auth(&session, None).await;
        assert!(matches!(
            auth.state(),
            crate::portal::guard::AuthState::Anonymous
        ));
        assert!(auth.just_logged_out());
        // Consumed: a later rebuild starts clean.
        assert!(!take_logged_out(&session).await);
    }

    #[tokio::test]
    async fn nested_routers_see_the_full_request_path() {
        use axum::{Router, routing::get};
        use tower::ServiceExt;

        struct SeenPath(String);

        impl<S> FromRequestParts<S> for SeenPath
        where
            S: Send + Sync,
        {
            type Rejection = std::convert::Infallible;

            async fn from_request_parts(
                parts: &mut Parts,
                _state: &S,
            ) -> Result<Self, Self::Rejection> {
                Ok(Self(request_path(parts)))
            }
        }

        let app = Router::new().nest(
            "/portal",
            Router::new().route(
                "/executive",
                get(|SeenPath(path): SeenPath| async move { path }),
            ),
        );

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/portal/executive")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        // The nested router strips the prefix from `parts.uri`; the policy
        // must still see the path the client asked for.
        assert_eq!(&body[..], b"/portal/executive");
    }
}
