//! Contact and officials-request form route handlers.
//!
//! Submissions are delivered two ways, both best-effort against a single
//! hard failure: email to the association inbox and a webhook that appends
//! to the registrar's spreadsheet. The submission succeeds if at least one
//! configured channel accepts it.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use cascade_officials_core::Email;

use crate::state::AppState;

/// Contact form data.
#[derive(Debug, Deserialize, Serialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
}

/// Officials request form data, submitted by leagues and tournaments.
#[derive(Debug, Deserialize, Serialize)]
pub struct RequestOfficialsForm {
    pub organization: String,
    pub contact_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub event_date: String,
    pub venue: String,
    pub games_count: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Response for form submissions.
#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {}

/// Display the contact page.
pub async fn contact_page() -> impl IntoResponse {
    ContactTemplate {}
}

/// Submit the contact form.
///
/// POST /api/forms/contact
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> impl IntoResponse {
    if form.name.trim().is_empty() || form.message.trim().is_empty() {
        return bad_request("Name and message are required.");
    }
    let Ok(email) = form.email.parse::<Email>() else {
        return bad_request("Please enter a valid email address.");
    };

    let body = format!(
        "Name: {}\nEmail: {}\nPhone: {}\n\n{}",
        form.name.trim(),
        email.as_str(),
        form.phone.as_deref().unwrap_or("-").trim(),
        form.message.trim(),
    );

    deliver(&state, "contact", "Website contact form", email.as_str(), body, &form).await
}

/// Submit the officials request form.
///
/// POST /api/forms/request-officials
#[instrument(skip(state, form), fields(email = %form.email, organization = %form.organization))]
pub async fn request_officials(
    State(state): State<AppState>,
    Json(form): Json<RequestOfficialsForm>,
) -> impl IntoResponse {
    if form.organization.trim().is_empty()
        || form.contact_name.trim().is_empty()
        || form.venue.trim().is_empty()
    {
        return bad_request("Organization, contact name and venue are required.");
    }
    let Ok(email) = form.email.parse::<Email>() else {
        return bad_request("Please enter a valid email address.");
    };

    let body = format!(
        "Organization: {}\nContact: {}\nEmail: {}\nPhone: {}\nEvent date: {}\nVenue: {}\nGames: {}\n\n{}",
        form.organization.trim(),
        form.contact_name.trim(),
        email.as_str(),
        form.phone.as_deref().unwrap_or("-").trim(),
        form.event_date.trim(),
        form.venue.trim(),
        form.games_count,
        form.notes.as_deref().unwrap_or("").trim(),
    );

    deliver(
        &state,
        "request-officials",
        "Officials request",
        email.as_str(),
        body,
        &form,
    )
    .await
}

/// Deliver a submission to every configured channel.
async fn deliver<T: Serialize + Sync>(
    state: &AppState,
    form_kind: &str,
    subject: &str,
    reply_to: &str,
    body: String,
    submission: &T,
) -> (StatusCode, Json<FormResponse>) {
    let mut delivered = false;

    if let Some(email_service) = state.email() {
        match email_service.send_form_submission(subject, reply_to, body).await {
            Ok(()) => delivered = true,
            Err(e) => tracing::error!(form = form_kind, error = %e, "Form email delivery failed"),
        }
    }

    if let Some(forms) = state.forms() {
        match forms.forward(form_kind, submission).await {
            Ok(()) => delivered = true,
            Err(e) => tracing::error!(form = form_kind, error = %e, "Form webhook delivery failed"),
        }
    }

    if delivered {
        tracing::info!(form = form_kind, "Form submission delivered");
        (
            StatusCode::OK,
            Json(FormResponse {
                success: true,
                message: None,
            }),
        )
    } else {
        tracing::error!(form = form_kind, "No delivery channel accepted the submission");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(FormResponse {
                success: false,
                message: Some("Something went wrong. Please try again.".to_string()),
            }),
        )
    }
}

fn bad_request(message: &str) -> (StatusCode, Json<FormResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(FormResponse {
            success: false,
            message: Some(message.to_string()),
        }),
    )
}
