//! Email delivery for form submissions.
//!
//! Uses SMTP via lettre. Form submissions are forwarded to the association
//! inbox; delivery failures surface as errors to the route handler, which
//! reports them without losing the submission (the webhook forwarder runs
//! independently).

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("invalid email address: {0}")]
    InvalidAddress(String),
}

/// Email service for forwarding form submissions.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    forms_inbox: String,
}

fn mailbox(addr: &str) -> Result<Mailbox, EmailError> {
    addr.parse()
        .map_err(|_| EmailError::InvalidAddress(addr.to_owned()))
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            forms_inbox: config.forms_inbox.clone(),
        })
    }

    /// Forward a form submission to the association inbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be built or delivered.
    pub async fn send_form_submission(
        &self,
        subject: &str,
        reply_to: &str,
        body: String,
    ) -> Result<(), EmailError> {
        let message = Message::builder()
            .from(mailbox(&self.from_address)?)
            .reply_to(mailbox(reply_to)?)
            .to(mailbox(&self.forms_inbox)?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        self.mailer.send(message).await?;
        Ok(())
    }

    /// Send a welcome mail to a newly registered member. Best-effort from
    /// the caller's point of view; registration never fails on this.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be built or delivered.
    pub async fn send_welcome(&self, to: &str, greeting_name: &str) -> Result<(), EmailError> {
        let body = format!(
            "Hi {greeting_name},\n\n\
             Welcome to the Cascade Basketball Officials Association.\n\n\
             Your account is ready - log in at any time to reach the members\n\
             portal, where you'll find resources, news, and your profile.\n\n\
             See you on the court,\n\
             The Executive",
        );

        let message = Message::builder()
            .from(mailbox(&self.from_address)?)
            .to(mailbox(to)?)
            .subject("Welcome to Cascade Officials")
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        self.mailer.send(message).await?;
        Ok(())
    }
}
