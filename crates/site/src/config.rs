//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SITE_DATABASE_URL` - `PostgreSQL` connection string
//! - `SITE_BASE_URL` - Public URL for the site
//! - `SITE_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `SITE_CONTENT_DIR` - Markdown content directory (default: crates/site/content)
//! - `SITE_DISABLE_AUTH_DEV` - Bypass portal auth checks; debug builds only
//! - `SMTP_HOST` / `SMTP_PORT` / `SMTP_USERNAME` / `SMTP_PASSWORD` /
//!   `SMTP_FROM` / `FORMS_INBOX` - Form submission email delivery
//! - `FORMS_WEBHOOK_URL` - Spreadsheet backend webhook for form submissions
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

const SESSION_SECRET_MIN_LEN: usize = 32;
const SESSION_SECRET_MIN_ENTROPY: f64 = 3.3;

// Substrings that mark a secret as a template leftover, matched
// case-insensitively.
const PLACEHOLDER_MARKERS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "fixme",
    "insert",
    "enter-",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
    #[error("{0} must not be enabled in release builds")]
    DevOnlyFlag(String),
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// `PostgreSQL` connection URL (contains the password).
    pub database_url: SecretString,
    /// Bind address.
    pub host: IpAddr,
    /// Listen port.
    pub port: u16,
    /// Public base URL for the site.
    pub base_url: String,
    /// Session signing secret.
    pub session_secret: SecretString,
    /// Markdown content directory.
    pub content_dir: PathBuf,
    /// Diagnostic bypass of portal auth checks. Only honored in debug
    /// builds; `from_env` refuses to load it in release builds.
    pub disable_auth_dev: bool,
    /// SMTP delivery for form submissions (forms degrade gracefully if unset).
    pub email: Option<EmailConfig>,
    /// Spreadsheet backend webhook for form submissions.
    pub forms_webhook_url: Option<String>,
    /// Sentry DSN for error tracking.
    pub sentry_dsn: Option<String>,
    /// Sentry environment name.
    pub sentry_environment: Option<String>,
}

/// SMTP settings for outgoing mail.
///
/// `Debug` is hand-written so the password never reaches a log line.
#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    /// From address for outgoing mail.
    pub from_address: String,
    /// Inbox that receives contact/request form submissions.
    pub forms_inbox: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .field("forms_inbox", &self.forms_inbox)
            .finish()
    }
}

impl SiteConfig {
    /// Load configuration from the environment, reading `.env` first if one
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a required variable is missing or
    /// unparseable, when the session secret looks like a placeholder or has
    /// too little entropy, or when the dev auth bypass is set in a release
    /// build.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let host: IpAddr = parse_var("SITE_HOST", "127.0.0.1")?;
        let port: u16 = parse_var("SITE_PORT", "3000")?;

        let session_secret = require_var("SITE_SESSION_SECRET")?;
        audit_session_secret(&session_secret, "SITE_SESSION_SECRET")?;

        let disable_auth_dev =
            matches!(optional_var("SITE_DISABLE_AUTH_DEV").as_deref(), Some("true" | "1"));
        if disable_auth_dev && !cfg!(debug_assertions) {
            return Err(ConfigError::DevOnlyFlag("SITE_DISABLE_AUTH_DEV".into()));
        }

        Ok(Self {
            database_url: database_url()?,
            host,
            port,
            base_url: require_var("SITE_BASE_URL")?,
            session_secret: SecretString::from(session_secret),
            content_dir: optional_var("SITE_CONTENT_DIR")
                .map_or_else(|| PathBuf::from("crates/site/content"), PathBuf::from),
            disable_auth_dev,
            email: EmailConfig::from_env()?,
            forms_webhook_url: optional_var("FORMS_WEBHOOK_URL"),
            sentry_dsn: optional_var("SENTRY_DSN"),
            sentry_environment: optional_var("SENTRY_ENVIRONMENT"),
        })
    }

    /// The socket address to bind the server to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl EmailConfig {
    /// Present only when `SMTP_HOST` is set; the remaining SMTP variables
    /// then become required.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(smtp_host) = optional_var("SMTP_HOST") else {
            return Ok(None);
        };

        Ok(Some(Self {
            smtp_host,
            smtp_port: parse_var("SMTP_PORT", "587")?,
            smtp_username: require_var("SMTP_USERNAME")?,
            smtp_password: SecretString::from(require_var("SMTP_PASSWORD")?),
            from_address: require_var("SMTP_FROM")?,
            forms_inbox: require_var("FORMS_INBOX")?,
        }))
    }
}

fn require_var(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

fn optional_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn parse_var<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    optional_var(key)
        .unwrap_or_else(|| default.to_owned())
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
}

/// `SITE_DATABASE_URL`, falling back to the conventional `DATABASE_URL`.
fn database_url() -> Result<SecretString, ConfigError> {
    optional_var("SITE_DATABASE_URL")
        .or_else(|| optional_var("DATABASE_URL"))
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar("SITE_DATABASE_URL".to_owned()))
}

/// Reject short, template-looking, or low-entropy session secrets.
fn audit_session_secret(value: &str, var_name: &str) -> Result<(), ConfigError> {
    let insecure = |reason: String| ConfigError::InsecureSecret(var_name.to_owned(), reason);

    if value.len() < SESSION_SECRET_MIN_LEN {
        return Err(insecure(format!(
            "must be at least {SESSION_SECRET_MIN_LEN} characters (got {})",
            value.len()
        )));
    }

    let lower = value.to_lowercase();
    if let Some(marker) = PLACEHOLDER_MARKERS.iter().find(|m| lower.contains(**m)) {
        return Err(insecure(format!(
            "appears to be a placeholder (contains '{marker}')"
        )));
    }

    let entropy = shannon_entropy(value);
    if entropy < SESSION_SECRET_MIN_ENTROPY {
        return Err(insecure(format!(
            "entropy too low ({entropy:.2} bits/char, need >= {SESSION_SECRET_MIN_ENTROPY:.1}). \
             Use a randomly generated secret."
        )));
    }

    Ok(())
}

/// Shannon entropy in bits per character.
#[allow(clippy::cast_precision_loss)]
fn shannon_entropy(s: &str) -> f64 {
    let mut freq: HashMap<char, f64> = HashMap::new();
    let mut len = 0.0;
    for c in s.chars() {
        *freq.entry(c).or_insert(0.0) += 1.0;
        len += 1.0;
    }
    if len == 0.0 {
        return 0.0;
    }
    freq.values()
        .map(|count| {
            let p = count / len;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn entropy_of_empty_and_uniform_strings_is_zero() {
        assert!(shannon_entropy("").abs() < f64::EPSILON);
        assert!(shannon_entropy("bbbbbbb").abs() < f64::EPSILON);
    }

    #[test]
    fn entropy_of_random_string_is_high() {
        assert!(shannon_entropy("qW3$qZ9!mJ2@nR5#tY8%") > 3.3);
    }

    #[test]
    fn session_secret_rejects_placeholders() {
        assert!(audit_session_secret("your-session-key-here-padded-out-long", "TEST_VAR").is_err());
        assert!(audit_session_secret("changeme123-changeme123-changeme123", "TEST_VAR").is_err());
    }

    #[test]
    fn session_secret_rejects_low_entropy() {
        let result = audit_session_secret("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn session_secret_rejects_short_values() {
        assert!(matches!(
            audit_session_secret("qW3$xZ9!", "TEST_VAR").unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn session_secret_accepts_a_random_key() {
        assert!(audit_session_secret("qW3$xZ9!mJ2@nR5#pL7&vT0*uB4^kC6s", "TEST_VAR").is_ok());
    }

    #[test]
    fn socket_addr_combines_host_and_port() {
        let config = SiteConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_owned(),
            session_secret: SecretString::from("q".repeat(32)),
            content_dir: PathBuf::from("content"),
            disable_auth_dev: false,
            email: None,
            forms_webhook_url: None,
            sentry_dsn: None,
            sentry_environment: None,
        };

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn email_config_debug_redacts_password() {
        let config = EmailConfig {
            smtp_host: "smtp.example.com".to_owned(),
            smtp_port: 587,
            smtp_username: "mailer".to_owned(),
            smtp_password: SecretString::from("super_secret_smtp_password"),
            from_address: "no-reply@cascadeofficials.org".to_owned(),
            forms_inbox: "info@cascadeofficials.org".to_owned(),
        };

        let rendered = format!("{config:?}");
        assert!(rendered.contains("smtp.example.com"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("super_secret_smtp_password"));
    }
}
