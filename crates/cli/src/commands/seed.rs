//! Seed the quotes site with authors and quotes from a YAML file.

use std::path::Path;

use secrecy::SecretString;
use tracing::{error, info};

use rolodex_quotes::db;
use rolodex_quotes::seed::{SeedFile, seed, validate_seed};

/// Seed quotes from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML seed file
/// * `clear_existing` - If true, delete existing authors and quotes first
///
/// # Errors
///
/// Returns an error if the database URL is missing, the file cannot be read
/// or fails validation, or database operations fail.
pub async fn quotes(file_path: &str, clear_existing: bool) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("QUOTES_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "QUOTES_DATABASE_URL not set")?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading quotes from file");

    // Read and validate before connecting to the database
    let content = tokio::fs::read_to_string(path).await?;
    let file: SeedFile = serde_yaml::from_str(&content)?;

    info!(
        authors = file.authors.len(),
        quotes = file.quotes.len(),
        "Parsed seed file"
    );

    let errors = validate_seed(&file);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    info!(clear_existing, "Starting seeding process");
    let result = seed(&pool, &file, clear_existing).await?;

    info!("Seeding complete!");
    info!("  Authors inserted: {}", result.authors_inserted);
    info!("  Authors skipped (already exist): {}", result.authors_skipped);
    info!("  Quotes inserted: {}", result.quotes_inserted);
    info!("  Quotes skipped (already exist): {}", result.quotes_skipped);

    Ok(())
}
