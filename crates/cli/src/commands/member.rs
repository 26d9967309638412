//! Member management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a member (password from MEMBER_PASSWORD env or --password)
//! cascade-cli member add -e ref@example.com -n "Jordan Reed" -r official
//!
//! # Promote a member (takes effect at their next login)
//! cascade-cli member set-role -e ref@example.com -r executive
//!
//! # List the roster
//! cascade-cli member list
//! ```
//!
//! # Environment Variables
//!
//! - `SITE_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `MEMBER_PASSWORD` - Initial password when `--password` is omitted

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use cascade_officials_core::{Email, Role};
use cascade_officials_site::db::{self, MemberRepository, RepositoryError};
use cascade_officials_site::services::auth;

/// Errors that can occur during member operations.
#[derive(Debug, Error)]
pub enum MemberError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository error.
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: official, executive, admin")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// No password provided.
    #[error("No password: pass --password or set MEMBER_PASSWORD")]
    MissingPassword,

    /// Password hashing failed.
    #[error("Password hashing failed")]
    PasswordHash,

    /// Member already exists.
    #[error("Member already exists with email: {0}")]
    MemberExists(String),

    /// Member not found.
    #[error("No member with email: {0}")]
    NotFound(String),
}

/// Create a new member.
///
/// # Errors
///
/// Returns an error if the email or role is invalid, no password is
/// available, or the member already exists.
pub async fn add(
    email: &str,
    name: Option<&str>,
    role: &str,
    password: Option<&str>,
) -> Result<(), MemberError> {
    dotenvy::dotenv().ok();

    let email = parse_email(email)?;
    let role = parse_role(role)?;

    let password = match password {
        Some(p) => p.to_owned(),
        None => std::env::var("MEMBER_PASSWORD").map_err(|_| MemberError::MissingPassword)?,
    };
    let password_hash = auth::hash_password(&password).map_err(|_| MemberError::PasswordHash)?;

    let pool = connect().await?;
    let repo = MemberRepository::new(&pool);

    let member = repo
        .create(&email, &password_hash, role, name)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => MemberError::MemberExists(email.as_str().to_owned()),
            other => MemberError::Repository(other),
        })?;

    tracing::info!("Member created successfully!");
    tracing::info!("  ID: {}", member.id);
    tracing::info!("  Email: {}", member.email);
    tracing::info!("  Role: {}", member.role);

    Ok(())
}

/// Change a member's role.
///
/// The change takes effect at the member's next login; a live session
/// keeps the role it was given when it was created.
///
/// # Errors
///
/// Returns an error if the email or role is invalid or the member does
/// not exist.
pub async fn set_role(email: &str, role: &str) -> Result<(), MemberError> {
    dotenvy::dotenv().ok();

    let email = parse_email(email)?;
    let role = parse_role(role)?;

    let pool = connect().await?;
    let repo = MemberRepository::new(&pool);

    let member = repo
        .get_by_email(&email)
        .await?
        .ok_or_else(|| MemberError::NotFound(email.as_str().to_owned()))?;

    let updated = repo
        .set_role(member.id, role)
        .await?
        .ok_or_else(|| MemberError::NotFound(email.as_str().to_owned()))?;

    tracing::info!("Role updated: {} is now {}", updated.email, updated.role);
    tracing::info!("Takes effect at their next login.");

    Ok(())
}

/// List all members.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn list() -> Result<(), MemberError> {
    dotenvy::dotenv().ok();

    let pool = connect().await?;
    let members = MemberRepository::new(&pool).list().await?;

    tracing::info!("{} members:", members.len());
    for member in members {
        tracing::info!(
            "  {} [{}] {}",
            member.email,
            member.role,
            member.display_name.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}

fn parse_email(email: &str) -> Result<Email, MemberError> {
    email
        .parse::<Email>()
        .map_err(|_| MemberError::InvalidEmail(email.to_owned()))
}

fn parse_role(role: &str) -> Result<Role, MemberError> {
    role.parse::<Role>()
        .map_err(|_| MemberError::InvalidRole(role.to_owned()))
}

async fn connect() -> Result<PgPool, MemberError> {
    let database_url = std::env::var("SITE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MemberError::MissingEnvVar("SITE_DATABASE_URL"))?;

    Ok(db::create_pool(&database_url).await?)
}
