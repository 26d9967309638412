//! HTTP route handlers for the association site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (shows login prompt when sent back from the portal)
//! GET  /health                 - Health check
//!
//! # Public content
//! GET  /pages/{slug}           - Static markdown pages (about, become-an-official, ...)
//! GET  /news                   - Public news index
//! GET  /news/{slug}            - News post
//! GET  /contact                - Contact page
//!
//! # Forms (JSON API)
//! POST /api/forms/contact      - Contact form submission
//! POST /api/forms/request-officials - Officials request form submission
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//!
//! # Portal (requires login; role per section)
//! GET  /portal                 - Member dashboard
//! GET  /portal/resources       - Officiating resources
//! GET  /portal/news            - Member news feed (includes members-only posts)
//! GET  /portal/profile         - Member profile
//! GET  /portal/executive       - Executive section
//! GET  /portal/admin           - Admin section
//! GET  /portal/admin/members   - Member management
//! POST /portal/admin/members/role - Change a member's role
//! ```

pub mod auth;
pub mod contact;
pub mod home;
pub mod news;
pub mod pages;
pub mod portal;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the news routes router.
pub fn news_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(news::index))
        .route("/{slug}", get(news::show))
}

/// Create the form API routes router.
pub fn form_routes() -> Router<AppState> {
    Router::new()
        .route("/contact", post(contact::submit_contact))
        .route("/request-officials", post(contact::request_officials))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Static markdown pages
        .route("/pages/{slug}", get(pages::show))
        // Contact page
        .route("/contact", get(contact::contact_page))
        // News
        .nest("/news", news_routes())
        // Auth routes
        .nest("/auth", auth_routes())
        // Form API
        .nest("/api/forms", form_routes())
        // Member portal
        .nest("/portal", portal::portal_routes())
}
