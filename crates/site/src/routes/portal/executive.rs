//! Executive section route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::RequireExecutive;
use crate::models::CurrentMember;
use crate::state::AppState;

/// Executive section template.
#[derive(Template, WebTemplate)]
#[template(path = "portal/executive.html")]
pub struct ExecutiveTemplate {
    pub member: CurrentMember,
    pub member_count: usize,
}

/// Display the executive section.
#[instrument(skip(state, member))]
pub async fn index(
    State(state): State<AppState>,
    RequireExecutive(member): RequireExecutive,
) -> Result<impl IntoResponse, AppError> {
    let member_count = crate::db::MemberRepository::new(state.pool())
        .list()
        .await?
        .len();

    Ok(ExecutiveTemplate {
        member,
        member_count,
    })
}
