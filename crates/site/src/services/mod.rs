//! External-facing services: authentication, email delivery, and form
//! forwarding.

pub mod auth;
pub mod email;
pub mod forms;

pub use auth::{AuthError, AuthService};
pub use email::{EmailError, EmailService};
pub use forms::{FormForwarder, FormsError};
