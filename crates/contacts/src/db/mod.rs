//! Database operations for the contacts API.
//!
//! # Schema: `contacts`
//!
//! ## Tables
//!
//! - `user` - Accounts (email, Argon2id hash, verification state, avatar)
//! - `contact` - Contact records, each owned by one user
//! - `tag`, `contact_tag` - Contact labels (not yet exposed over HTTP)
//! - `password_reset_token` - Single-use reset tokens
//!
//! # Migrations
//!
//! Migrations are stored in `crates/contacts/migrations/` and run via:
//! ```bash
//! cargo run -p rolodex-cli -- migrate contacts
//! ```

pub mod contacts;
pub mod password_resets;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use contacts::ContactRepository;
pub use password_resets::PasswordResetRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique violation to [`RepositoryError::Conflict`].
pub(crate) fn conflict_on_unique(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}

/// Whether `e` is a unique violation of the named constraint or index.
pub(crate) fn violates_constraint(e: &sqlx::Error, constraint: &str) -> bool {
    matches!(
        e,
        sqlx::Error::Database(db_err)
            if db_err.is_unique_violation() && db_err.constraint() == Some(constraint)
    )
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
