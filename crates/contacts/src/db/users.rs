//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use rolodex_core::{Email, UserId};

use super::{RepositoryError, conflict_on_unique, violates_constraint};
use crate::models::User;

/// Unique index over pending verification codes.
const VERIFICATION_CODE_INDEX: &str = "idx_user_verification_code";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    password_hash: String,
    verified: bool,
    avatar_url: Option<String>,
    verification_code: Option<String>,
    verification_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            password_hash: row.password_hash,
            verified: row.verified,
            avatar_url: row.avatar_url,
            verification_code: row.verification_code,
            verification_expires_at: row.verification_expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Fields needed to create an account.
#[derive(Debug, Clone)]
pub struct CreateUser<'a> {
    pub email: &'a Email,
    pub password_hash: &'a str,
    pub verification_code: &'a str,
    pub verification_expires_at: DateTime<Utc>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, verified, avatar_url,
                   verification_code, verification_expires_at, created_at, updated_at
            FROM contacts."user"
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, verified, avatar_url,
                   verification_code, verification_expires_at, created_at, updated_at
            FROM contacts."user"
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get the user holding a pending verification code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_verification_code(
        &self,
        code: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, verified, avatar_url,
                   verification_code, verification_expires_at, created_at, updated_at
            FROM contacts."user"
            WHERE verification_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Create a new, unverified user.
    ///
    /// Returns `Ok(None)` when another pending account already holds
    /// `verification_code`; the caller picks a new code and retries.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, input: &CreateUser<'_>) -> Result<Option<User>, RepositoryError> {
        let result = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO contacts."user"
                (email, password_hash, verification_code, verification_expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, verified, avatar_url,
                      verification_code, verification_expires_at, created_at, updated_at
            "#,
        )
        .bind(input.email.as_str())
        .bind(input.password_hash)
        .bind(input.verification_code)
        .bind(input.verification_expires_at)
        .fetch_one(self.pool)
        .await;

        match result {
            Ok(row) => User::try_from(row).map(Some),
            Err(e) if violates_constraint(&e, VERIFICATION_CODE_INDEX) => Ok(None),
            Err(e) => Err(conflict_on_unique(e, "email already exists")),
        }
    }

    /// Mark a user verified and clear their pending code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_verified(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE contacts."user"
            SET verified = TRUE,
                verification_code = NULL,
                verification_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Store a new avatar URL.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_avatar(&self, id: UserId, avatar_url: &str) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE contacts."user"
            SET avatar_url = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, password_hash, verified, avatar_url,
                      verification_code, verification_expires_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(avatar_url)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        User::try_from(row)
    }
}
