//! Portal access control: route policy and guard decision logic.
//!
//! The pieces here are pure - no HTTP, no session store. The `middleware`
//! module wires them to requests.

pub mod guard;
pub mod policy;

pub use guard::{AuthSession, AuthState, Decision, Guard, RedirectPlan};
pub use policy::{MEMBER_HOME, PORTAL_POLICY, PORTAL_PREFIX, RoutePolicy};
