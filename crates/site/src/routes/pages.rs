//! Static markdown page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;

use crate::state::AppState;

/// Static page template.
#[derive(Template, WebTemplate)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub title: String,
    pub description: Option<String>,
    pub content_html: String,
}

/// Display a static markdown page by slug.
///
/// # Errors
///
/// Returns 404 if no page with that slug exists.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let page = state.content().page(&slug).ok_or(StatusCode::NOT_FOUND)?;

    Ok(PageTemplate {
        title: page.meta.title.clone(),
        description: page.meta.description.clone(),
        content_html: page.content_html.clone(),
    })
}
