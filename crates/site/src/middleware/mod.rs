//! HTTP middleware stack for the site.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. Request ID (add unique ID to each request)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)
//! 4. Portal edge gate (presence-only credential check for `/portal`)
//! 5. Security headers

pub mod auth;
pub mod gate;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    OptionalMember, RequireAdmin, RequireExecutive, RequireMember, clear_current_member,
    mark_logged_out, remember_intent, set_current_member, take_intent, take_logged_out,
};
pub use gate::portal_gate;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
