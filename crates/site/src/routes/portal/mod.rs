//! Member portal route handlers.
//!
//! Every handler here takes a `Require*` extractor; an unauthenticated or
//! under-ranked request never reaches the handler body.

pub mod admin;
pub mod executive;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::instrument;

use crate::middleware::RequireMember;
use crate::models::CurrentMember;
use crate::routes::news::PostView;
use crate::state::AppState;

/// Member dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "portal/dashboard.html")]
pub struct DashboardTemplate {
    pub member: CurrentMember,
    pub recent_news: Vec<PostView>,
}

/// Resources page template.
#[derive(Template, WebTemplate)]
#[template(path = "portal/resources.html")]
pub struct ResourcesTemplate {
    pub member: CurrentMember,
}

/// Member news feed template.
#[derive(Template, WebTemplate)]
#[template(path = "portal/news.html")]
pub struct PortalNewsTemplate {
    pub member: CurrentMember,
    pub posts: Vec<PostView>,
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "portal/profile.html")]
pub struct ProfileTemplate {
    pub member: CurrentMember,
}

/// Number of news posts on the dashboard.
const DASHBOARD_NEWS_COUNT: usize = 5;

/// Display the member dashboard.
#[instrument(skip(state, member))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireMember(member): RequireMember,
) -> impl IntoResponse {
    let recent_news = state
        .content()
        .member_posts()
        .take(DASHBOARD_NEWS_COUNT)
        .map(PostView::from)
        .collect();

    DashboardTemplate {
        member,
        recent_news,
    }
}

/// Display the officiating resources page.
#[instrument(skip(member))]
pub async fn resources(RequireMember(member): RequireMember) -> impl IntoResponse {
    ResourcesTemplate { member }
}

/// Display the member news feed, including members-only posts.
#[instrument(skip(state, member))]
pub async fn news(
    State(state): State<AppState>,
    RequireMember(member): RequireMember,
) -> impl IntoResponse {
    let posts = state.content().member_posts().map(PostView::from).collect();
    PortalNewsTemplate { member, posts }
}

/// Display the member's own profile.
#[instrument(skip(member))]
pub async fn profile(RequireMember(member): RequireMember) -> impl IntoResponse {
    ProfileTemplate { member }
}

/// Create the portal routes router.
pub fn portal_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        .route("/resources", get(resources))
        .route("/news", get(news))
        .route("/profile", get(profile))
        .route("/executive", get(executive::index))
        .route("/admin", get(admin::index))
        .route("/admin/members", get(admin::members))
        .route("/admin/members/role", post(admin::set_role))
}
