//! Member repository for database operations.
//!
//! Queries use the runtime sqlx API with an explicit row type; domain
//! validation (email, role) happens when rows are mapped out, so an invalid
//! stored role surfaces as `DataCorruption` instead of leaking into access
//! checks.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use cascade_officials_core::{Email, MemberId, Role};

use super::RepositoryError;
use crate::models::Member;

/// Raw database row for a member.
#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    id: i32,
    email: String,
    role: String,
    display_name: Option<String>,
    certification_level: Option<String>,
    created_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
}

impl MemberRow {
    fn into_member(self) -> Result<Member, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role: Role = self.role.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;

        Ok(Member {
            id: MemberId::new(self.id),
            email,
            role,
            display_name: self.display_name,
            certification_level: self.certification_level,
            created_at: self.created_at,
            last_login_at: self.last_login_at,
        })
    }
}

const MEMBER_COLUMNS: &str =
    "id, email, role, display_name, certification_level, created_at, last_login_at";

/// Repository for member database operations.
pub struct MemberRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MemberRepository<'a> {
    /// Create a new member repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a member by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `DataCorruption` if a stored email/role is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Member>, RepositoryError> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(MemberRow::into_member).transpose()
    }

    /// Get a member by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `DataCorruption` if a stored email/role is invalid.
    pub async fn get_by_id(&self, id: MemberId) -> Result<Option<Member>, RepositoryError> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(MemberRow::into_member).transpose()
    }

    /// Create a new member with a password hash and role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
        role: Role,
        display_name: Option<&str>,
    ) -> Result<Member, RepositoryError> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "INSERT INTO members (email, password_hash, role, display_name)
             VALUES ($1, $2, $3, $4)
             RETURNING {MEMBER_COLUMNS}"
        ))
        .bind(email.as_str())
        .bind(password_hash)
        .bind(role.to_string())
        .bind(display_name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict(format!("member already exists: {email}"))
            }
            _ => RepositoryError::Database(e),
        })?;

        row.into_member()
    }

    /// Get a member together with their password hash, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `DataCorruption` if a stored email/role is invalid.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Member, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct HashRow {
            id: i32,
            email: String,
            role: String,
            display_name: Option<String>,
            certification_level: Option<String>,
            created_at: DateTime<Utc>,
            last_login_at: Option<DateTime<Utc>>,
            password_hash: String,
        }

        let row = sqlx::query_as::<_, HashRow>(&format!(
            "SELECT {MEMBER_COLUMNS}, password_hash FROM members WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let hash = row.password_hash;
        let member = MemberRow {
            id: row.id,
            email: row.email,
            role: row.role,
            display_name: row.display_name,
            certification_level: row.certification_level,
            created_at: row.created_at,
            last_login_at: row.last_login_at,
        }
        .into_member()?;

        Ok(Some((member, hash)))
    }

    /// Change a member's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails; updating a
    /// nonexistent member is a no-op reported as `Ok(None)`.
    pub async fn set_role(
        &self,
        id: MemberId,
        role: Role,
    ) -> Result<Option<Member>, RepositoryError> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "UPDATE members SET role = $2 WHERE id = $1 RETURNING {MEMBER_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(role.to_string())
        .fetch_optional(self.pool)
        .await?;

        row.map(MemberRow::into_member).transpose()
    }

    /// Record a successful login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn touch_last_login(&self, id: MemberId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE members SET last_login_at = now() WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// List all members, most recently registered first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `DataCorruption` if a stored email/role is invalid.
    pub async fn list(&self) -> Result<Vec<Member>, RepositoryError> {
        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(MemberRow::into_member).collect()
    }
}
