//! News route handlers.
//!
//! Public visitors see published public posts; members-only posts are
//! served through the portal news feed instead.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use tracing::instrument;

use crate::content::Post;
use crate::middleware::OptionalMember;
use crate::state::AppState;

/// Post view for templates.
#[derive(Clone)]
pub struct PostView {
    pub slug: String,
    pub title: String,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub published_at: NaiveDate,
    pub members_only: bool,
    pub content_html: String,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.meta.title.clone(),
            summary: post.meta.summary.clone(),
            author: post.meta.author.clone(),
            published_at: post.meta.published_at,
            members_only: post.meta.members_only,
            content_html: post.content_html.clone(),
        }
    }
}

/// News index page template.
#[derive(Template, WebTemplate)]
#[template(path = "news/index.html")]
pub struct NewsIndexTemplate {
    pub posts: Vec<PostView>,
}

/// News post detail template.
#[derive(Template, WebTemplate)]
#[template(path = "news/show.html")]
pub struct NewsShowTemplate {
    pub post: PostView,
}

/// Display the news index with all published public posts.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let posts: Vec<PostView> = state.content().public_posts().map(PostView::from).collect();
    NewsIndexTemplate { posts }
}

/// Display a single news post by slug.
///
/// # Errors
///
/// Returns 404 if the post doesn't exist, is a draft, or is members-only
/// and the visitor isn't logged in.
#[instrument(skip(state, member))]
pub async fn show(
    State(state): State<AppState>,
    OptionalMember(member): OptionalMember,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let post = state.content().post(&slug).ok_or(StatusCode::NOT_FOUND)?;

    if post.meta.draft {
        return Err(StatusCode::NOT_FOUND);
    }
    if post.meta.members_only && member.is_none() {
        return Err(StatusCode::NOT_FOUND);
    }

    Ok(NewsShowTemplate {
        post: PostView::from(post),
    })
}
