//! Password reset token repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use rolodex_core::{PasswordResetTokenId, UserId};

use super::{RepositoryError, conflict_on_unique};

/// A stored reset token.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PasswordResetToken {
    pub id: PasswordResetTokenId,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

/// Repository for password reset tokens.
pub struct PasswordResetRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PasswordResetRepository<'a> {
    /// Create a new password reset repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a reset token for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the token collides with an existing one.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user_id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<PasswordResetToken, RepositoryError> {
        let row = sqlx::query_as::<_, PasswordResetToken>(
            r"
            INSERT INTO contacts.password_reset_token (user_id, token, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, expires_at
            ",
        )
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "reset token already exists"))?;

        Ok(row)
    }

    /// Consume a token and replace the owner's password hash.
    ///
    /// The token is deleted whether or not it has expired. Returns the user
    /// whose password changed, or `None` if the token is unknown or expired.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction is rolled back in that case.
    pub async fn consume(
        &self,
        token: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UserId>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let consumed = sqlx::query_as::<_, PasswordResetToken>(
            r"
            DELETE FROM contacts.password_reset_token
            WHERE token = $1
            RETURNING id, user_id, expires_at
            ",
        )
        .bind(token)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(consumed) = consumed else {
            return Ok(None);
        };

        if now > consumed.expires_at {
            tx.commit().await?;
            return Ok(None);
        }

        let result = sqlx::query(
            r#"
            UPDATE contacts."user"
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(consumed.user_id)
        .bind(new_password_hash)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::DataCorruption(format!(
                "reset token {} references missing user {}",
                consumed.id, consumed.user_id
            )));
        }

        tx.commit().await?;
        Ok(Some(consumed.user_id))
    }
}
