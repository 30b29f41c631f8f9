//! Author repository.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use rolodex_core::AuthorId;

use super::RepositoryError;
use crate::models::Author;

#[derive(sqlx::FromRow)]
struct AuthorRow {
    id: i32,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        Self {
            id: AuthorId::new(row.id),
            name: row.name,
            created_at: row.created_at,
        }
    }
}

/// Repository for author database operations.
pub struct AuthorRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AuthorRepository<'a> {
    /// Create a new author repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every author ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Author>, RepositoryError> {
        let rows = sqlx::query_as::<_, AuthorRow>(
            r"
            SELECT id, name, created_at
            FROM quotes.author
            ORDER BY name, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Author::from).collect())
    }

    /// Create an author.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is already taken.
    pub async fn create(&self, name: &str) -> Result<Author, RepositoryError> {
        let row = sqlx::query_as::<_, AuthorRow>(
            r"
            INSERT INTO quotes.author (name)
            VALUES ($1)
            RETURNING id, name, created_at
            ",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!("author '{name}' already exists"));
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }
}

/// Insert an author unless the name exists. Returns whether a row was added.
pub(crate) async fn insert_if_missing(
    conn: &mut PgConnection,
    name: &str,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        INSERT INTO quotes.author (name)
        VALUES ($1)
        ON CONFLICT (name) DO NOTHING
        ",
    )
    .bind(name)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}
