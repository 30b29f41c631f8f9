//! Database operations for the quotes site.
//!
//! # Schema: `quotes`
//!
//! - `author` - Quoted people, unique by name
//! - `quote` - Quote text
//! - `quote_author` - Many-to-many link between quotes and authors
//!
//! # Migrations
//!
//! Migrations are stored in `crates/quotes/migrations/` and run via:
//! ```bash
//! cargo run -p rolodex-cli -- migrate quotes
//! ```

pub mod authors;
pub mod quotes;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use authors::AuthorRepository;
pub use quotes::QuoteRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Constraint violation (e.g., duplicate author name).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
