//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Server-side failures are
//! captured to Sentry before the response goes out; clients only ever see
//! generic wording for those.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::content::ContentError;
use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::email::EmailError;
use crate::services::forms::FormsError;

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    #[error("Forms error: {0}")]
    Forms(#[from] FormsError),

    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this failure is ours rather than the client's; these are the
    /// ones reported to Sentry.
    fn is_server_side(&self) -> bool {
        match self {
            Self::Database(_) | Self::Internal(_) | Self::Email(_) | Self::Forms(_)
            | Self::Content(_) => true,
            Self::Auth(err) => matches!(err, AuthError::Repository(_) | AuthError::PasswordHash),
            Self::NotFound(_) | Self::Unauthorized(_) | Self::BadRequest(_) => false,
        }
    }

    /// Status and body for the client. Internals never leak: server-side
    /// failures all collapse to generic wording.
    fn client_facing(&self) -> (StatusCode, String) {
        match self {
            Self::Database(_) | Self::Internal(_) | Self::Content(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
            Self::Email(_) | Self::Forms(_) => {
                (StatusCode::BAD_GATEWAY, "External service error".into())
            }
            Self::Auth(err) => auth_client_facing(err),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
        }
    }
}

fn auth_client_facing(err: &AuthError) -> (StatusCode, String) {
    match err {
        AuthError::InvalidCredentials => {
            (StatusCode::UNAUTHORIZED, "Invalid email or password".into())
        }
        AuthError::MemberAlreadyExists => (
            StatusCode::CONFLICT,
            "An account with this email already exists".into(),
        ),
        AuthError::WeakPassword(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        AuthError::InvalidEmail(_) => (StatusCode::BAD_REQUEST, "Invalid email address".into()),
        AuthError::Repository(_) | AuthError::PasswordHash => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_side() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        self.client_facing().into_response()
    }
}

/// Associate Sentry events with the logged-in member. Call after login.
pub fn set_sentry_user(member_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(member_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Drop the member association. Call on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn display_keeps_the_detail() {
        let err = AppError::NotFound("page-about".to_owned());
        assert_eq!(err.to_string(), "Not found: page-about");
    }

    #[test]
    fn status_codes_match_the_failure() {
        assert_eq!(
            status_of(AppError::NotFound("x".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Unauthorized("x".to_owned())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::BadRequest("x".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Internal("x".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::MemberAlreadyExists)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn internal_detail_never_reaches_the_body() {
        let (status, body) = AppError::Internal("secret detail".to_owned()).client_facing();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("secret detail"));
    }
}
