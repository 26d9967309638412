//! Authentication route handlers.
//!
//! Password login and registration against the membership roster. The
//! role stored in the session is a snapshot taken at login; promotions
//! take effect on the next login.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::{
    clear_current_member, mark_logged_out, set_current_member, take_intent, take_logged_out,
};
use crate::models::{CurrentMember, Member};
use crate::portal::MEMBER_HOME;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub display_name: Option<String>,
}

/// Error/success codes carried back to the form pages via the query string.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error,
        success: query.success,
    }
}

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate { error: query.error }
}

/// Handle login form submission.
///
/// On success the member lands on the portal path they originally asked
/// for, consumed from the session, or the portal home otherwise.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let member = match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(member) => member,
        Err(AuthError::InvalidCredentials | AuthError::InvalidEmail(_)) => {
            tracing::warn!("Login failed: invalid credentials");
            return Redirect::to("/auth/login?error=credentials").into_response();
        }
        Err(e) => {
            tracing::error!("Login failed: {}", e);
            return Redirect::to("/auth/login?error=internal").into_response();
        }
    };

    if establish_session(&session, &member).await.is_err() {
        return Redirect::to("/auth/login?error=session").into_response();
    }
    tracing::info!(member_id = %member.id, role = %member.role, "Member logged in");

    // One-shot: the stored intent is gone after this read. Only site-local
    // paths are honored; `//host` would leave the site.
    let destination = take_intent(&session)
        .await
        .filter(|path| path.starts_with('/') && !path.starts_with("//"))
        .unwrap_or_else(|| MEMBER_HOME.to_string());

    Redirect::to(&destination).into_response()
}

/// Handle registration form submission.
///
/// New members start as officials. The executive promotes from there.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    if form.password != form.password_confirm {
        return Redirect::to("/auth/register?error=password_mismatch").into_response();
    }

    let member = match AuthService::new(state.pool())
        .register(&form.email, &form.password, form.display_name.as_deref())
        .await
    {
        Ok(member) => member,
        Err(e) => return register_failure(&e),
    };

    // Welcome mail is best-effort; registration already succeeded.
    if let Some(email_service) = state.email() {
        if let Err(e) = email_service
            .send_welcome(member.email.as_str(), member.greeting_name())
            .await
        {
            tracing::warn!("Failed to send welcome mail: {}", e);
        }
    }

    if establish_session(&session, &member).await.is_err() {
        // Account exists; let them log in the normal way.
        return Redirect::to("/auth/login?success=registered").into_response();
    }
    tracing::info!(member_id = %member.id, "Member registered");

    Redirect::to(MEMBER_HOME).into_response()
}

/// Handle logout.
///
/// Clears the member from the session and leaves a one-shot marker so the
/// home page can show a logged-out notice without prompting for login.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_member(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }

    // Set after clearing so the marker survives into the next request.
    mark_logged_out(&session).await;
    clear_sentry_user();

    Redirect::to("/").into_response()
}

/// Store the member in the session and tag Sentry with their identity.
async fn establish_session(session: &Session, member: &Member) -> Result<(), ()> {
    // A leftover logout marker from a previous member must not shadow the
    // fresh login.
    take_logged_out(session).await;

    let current = CurrentMember::from(member);
    if let Err(e) = set_current_member(session, &current).await {
        tracing::error!("Failed to set session: {}", e);
        return Err(());
    }
    set_sentry_user(&member.id, Some(member.email.as_str()));
    Ok(())
}

fn register_failure(error: &AuthError) -> Response {
    let code = match error {
        AuthError::MemberAlreadyExists => "email_taken",
        AuthError::WeakPassword(_) => "password_too_short",
        AuthError::InvalidEmail(_) => "invalid_email",
        AuthError::InvalidCredentials | AuthError::Repository(_) | AuthError::PasswordHash => {
            tracing::error!("Registration failed: {}", error);
            "failed"
        }
    };
    Redirect::to(&format!("/auth/register?error={code}")).into_response()
}
