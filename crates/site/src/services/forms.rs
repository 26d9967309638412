//! Form submission forwarding to the spreadsheet backend.
//!
//! Submissions are posted as JSON to a configured webhook (the hosted
//! spreadsheet integration). The forwarder is optional: when no webhook is
//! configured, submissions are delivered by email only.

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

/// Errors from webhook forwarding.
#[derive(Debug, Error)]
pub enum FormsError {
    /// HTTP transport error.
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The webhook answered with a non-success status.
    #[error("webhook rejected submission: {0}")]
    Rejected(reqwest::StatusCode),
}

/// Forwards form submissions to the spreadsheet webhook.
#[derive(Clone)]
pub struct FormForwarder {
    client: Client,
    webhook_url: String,
}

impl FormForwarder {
    /// Create a forwarder for the given webhook URL.
    #[must_use]
    pub fn new(webhook_url: String) -> Self {
        Self {
            client: Client::new(),
            webhook_url,
        }
    }

    /// Post a submission to the webhook.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the webhook answers with a
    /// non-success status.
    pub async fn forward<T: Serialize + Sync>(
        &self,
        form_kind: &str,
        submission: &T,
    ) -> Result<(), FormsError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .query(&[("form", form_kind)])
            .json(submission)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FormsError::Rejected(status));
        }

        Ok(())
    }
}
