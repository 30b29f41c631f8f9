//! Quote repository.
//!
//! Quotes are always read together with their author names, aggregated in
//! SQL so each page needs a single query.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use rolodex_core::QuoteId;

use super::RepositoryError;
use crate::models::{NewQuote, Quote};

#[derive(sqlx::FromRow)]
struct QuoteRow {
    id: i32,
    text: String,
    authors: Vec<String>,
    created_at: DateTime<Utc>,
}

impl From<QuoteRow> for Quote {
    fn from(row: QuoteRow) -> Self {
        Self {
            id: QuoteId::new(row.id),
            text: row.text,
            authors: row.authors,
            created_at: row.created_at,
        }
    }
}

const SELECT_QUOTES: &str = r"
    SELECT
        q.id,
        q.text,
        q.created_at,
        COALESCE(
            array_agg(a.name::TEXT ORDER BY a.name) FILTER (WHERE a.id IS NOT NULL),
            '{}'
        ) AS authors
    FROM quotes.quote q
    LEFT JOIN quotes.quote_author qa ON qa.quote_id = q.id
    LEFT JOIN quotes.author a ON a.id = qa.author_id
";

/// Repository for quote database operations.
pub struct QuoteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> QuoteRepository<'a> {
    /// Create a new quote repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every quote, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Quote>, RepositoryError> {
        let sql = format!("{SELECT_QUOTES} GROUP BY q.id ORDER BY q.id");
        let rows = sqlx::query_as::<_, QuoteRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Quote::from).collect())
    }

    /// Get a quote by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: QuoteId) -> Result<Option<Quote>, RepositoryError> {
        let sql = format!("{SELECT_QUOTES} WHERE q.id = $1 GROUP BY q.id");
        let row = sqlx::query_as::<_, QuoteRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Quote::from))
    }

    /// Insert a quote and link it to the named authors in one transaction.
    ///
    /// Names that match no author are ignored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// written in that case.
    pub async fn create(&self, quote: &NewQuote) -> Result<Quote, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let created = insert(&mut *tx, quote).await?;
        tx.commit().await?;

        tracing::debug!(quote_id = %created.id, authors = created.authors.len(), "Quote stored");
        Ok(created)
    }
}

/// Insert a quote and its author links on an open connection.
pub(crate) async fn insert(
    conn: &mut PgConnection,
    quote: &NewQuote,
) -> Result<Quote, RepositoryError> {
    let (id, created_at): (i32, DateTime<Utc>) = sqlx::query_as(
        r"
        INSERT INTO quotes.quote (text)
        VALUES ($1)
        RETURNING id, created_at
        ",
    )
    .bind(&quote.text)
    .fetch_one(&mut *conn)
    .await?;

    let authors: Vec<String> = sqlx::query_scalar(
        r"
        WITH linked AS (
            INSERT INTO quotes.quote_author (quote_id, author_id)
            SELECT $1, id FROM quotes.author WHERE name = ANY($2)
            ON CONFLICT DO NOTHING
            RETURNING author_id
        )
        SELECT a.name::TEXT
        FROM linked
        JOIN quotes.author a ON a.id = linked.author_id
        ORDER BY a.name
        ",
    )
    .bind(id)
    .bind(&quote.authors)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Quote {
        id: QuoteId::new(id),
        text: quote.text.clone(),
        authors,
        created_at,
    })
}

/// Whether a quote with exactly this text is already stored.
pub(crate) async fn exists_with_text(
    conn: &mut PgConnection,
    text: &str,
) -> Result<bool, RepositoryError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM quotes.quote WHERE text = $1)")
            .bind(text)
            .fetch_one(conn)
            .await?;
    Ok(exists)
}

/// Delete every quote, link and author. Used by `seed --clear`.
pub(crate) async fn clear_all(conn: &mut PgConnection) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM quotes.quote_author")
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM quotes.quote")
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM quotes.author")
        .execute(&mut *conn)
        .await?;
    Ok(())
}
