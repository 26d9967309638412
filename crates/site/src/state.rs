//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::SiteConfig;
use crate::content::{ContentError, ContentStore};
use crate::services::email::EmailService;
use crate::services::forms::FormForwarder;

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("content error: {0}")]
    Content(#[from] ContentError),
    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Application state shared across all handlers. Clones are cheap; the
/// contents sit behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    pool: PgPool,
    content: ContentStore,
    email: Option<EmailService>,
    forms: Option<FormForwarder>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Loads markdown content from the configured content directory and
    /// builds the optional SMTP and webhook clients.
    ///
    /// # Errors
    ///
    /// Returns an error if content cannot be loaded or the SMTP relay
    /// configuration is invalid.
    pub fn new(config: SiteConfig, pool: PgPool) -> Result<Self, StateError> {
        let content = ContentStore::load(&config.content_dir)?;
        let email = config
            .email
            .as_ref()
            .map(EmailService::new)
            .transpose()?;
        let forms = config.forms_webhook_url.clone().map(FormForwarder::new);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                content,
                email,
                forms,
            }),
        })
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the loaded markdown content.
    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }

    /// Get the form submission email service, if configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }

    /// Get the form submission webhook forwarder, if configured.
    #[must_use]
    pub fn forms(&self) -> Option<&FormForwarder> {
        self.inner.forms.as_ref()
    }

    /// Whether the diagnostic auth bypass is active.
    ///
    /// Only ever true in debug builds; release config loading rejects the
    /// flag outright.
    #[must_use]
    pub fn auth_bypass(&self) -> bool {
        cfg!(debug_assertions) && self.inner.config.disable_auth_dev
    }
}
