//! Database migration commands.
//!
//! # Environment Variables
//!
//! - `CONTACTS_DATABASE_URL` - `PostgreSQL` connection string for the contacts API
//! - `QUOTES_DATABASE_URL` - `PostgreSQL` connection string for the quotes site
//!
//! Both fall back to `DATABASE_URL`.
//!
//! # Migration Files
//!
//! - Contacts: `crates/contacts/migrations/`
//! - Quotes: `crates/quotes/migrations/`
//!
//! The two sets may share one database and therefore one `_sqlx_migrations`
//! table, so their versions must not overlap and each run ignores the other
//! set's applied rows.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::migrate::Migrator;

/// Errors from a migration run.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run contacts API migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the URL is unset, the connection fails or a
/// migration fails.
pub async fn contacts() -> Result<(), MigrationError> {
    run(
        "contacts",
        "CONTACTS_DATABASE_URL",
        sqlx::migrate!("../contacts/migrations"),
    )
    .await
}

/// Run quotes site migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the URL is unset, the connection fails or a
/// migration fails.
pub async fn quotes() -> Result<(), MigrationError> {
    run(
        "quotes",
        "QUOTES_DATABASE_URL",
        sqlx::migrate!("../quotes/migrations"),
    )
    .await
}

async fn run(
    name: &str,
    env_var: &'static str,
    mut migrator: Migrator,
) -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = database_url(env_var)?;

    tracing::info!("Connecting to {name} database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running {name} migrations...");
    migrator.set_ignore_missing(true);
    migrator.run(&pool).await?;

    tracing::info!("{name} migrations complete!");
    Ok(())
}

fn database_url(env_var: &'static str) -> Result<SecretString, MigrationError> {
    std::env::var(env_var)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar(env_var))
}
