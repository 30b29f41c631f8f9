//! Bulk loading of authors and quotes.
//!
//! The CLI parses a YAML file into [`SeedFile`], checks it with
//! [`validate_seed`] and hands it to [`seed`]:
//!
//! ```yaml
//! authors:
//!   - Ada Lovelace
//!   - Grace Hopper
//! quotes:
//!   - text: It's easier to ask forgiveness than it is to get permission.
//!     authors: [Grace Hopper]
//! ```

use std::collections::HashSet;

use serde::Deserialize;
use sqlx::PgPool;
use tracing::instrument;

use crate::db::{RepositoryError, authors, quotes};
use crate::models::{AuthorForm, QuoteForm};

/// Seed file contents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub quotes: Vec<SeedQuote>,
}

/// One quote in a seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedQuote {
    pub text: String,
    #[serde(default)]
    pub authors: Vec<String>,
}

/// Counts reported after seeding.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedResult {
    pub authors_inserted: u64,
    /// Authors whose name was already present
    pub authors_skipped: u64,
    pub quotes_inserted: u64,
    /// Quotes whose exact text was already present
    pub quotes_skipped: u64,
}

/// Check a seed file, returning one message per problem.
///
/// Authors follow the same rules as the web form. Every author a quote
/// names must be listed under `authors`.
#[must_use]
pub fn validate_seed(file: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();
    let mut known = HashSet::new();

    for raw in &file.authors {
        let form = AuthorForm { name: raw.clone() };
        match form.validate() {
            Ok(name) => {
                if !known.insert(name.to_string()) {
                    errors.push(format!("Duplicate author: {name}"));
                }
            }
            Err(e) => errors.push(format!("Author '{raw}': {e}")),
        }
    }

    for (index, quote) in file.quotes.iter().enumerate() {
        let position = index + 1;
        if quote.text.trim().is_empty() {
            errors.push(format!("Quote #{position}: text is required"));
        }
        for name in &quote.authors {
            if !known.contains(name.trim()) {
                errors.push(format!("Quote #{position}: unknown author '{name}'"));
            }
        }
    }

    errors
}

/// Load a validated seed file in a single transaction.
///
/// With `clear_existing`, every author and quote is deleted first.
/// Otherwise existing authors and identical quotes are left alone, so the
/// same file can be applied repeatedly.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if any statement fails; the
/// transaction is rolled back.
#[instrument(skip(pool, file), fields(authors = file.authors.len(), quotes = file.quotes.len()))]
pub async fn seed(
    pool: &PgPool,
    file: &SeedFile,
    clear_existing: bool,
) -> Result<SeedResult, RepositoryError> {
    let mut tx = pool.begin().await?;
    let mut result = SeedResult::default();

    if clear_existing {
        quotes::clear_all(&mut tx).await?;
        tracing::info!("Cleared existing quotes and authors");
    }

    for name in &file.authors {
        if authors::insert_if_missing(&mut tx, name.trim()).await? {
            result.authors_inserted += 1;
        } else {
            result.authors_skipped += 1;
        }
    }

    for entry in &file.quotes {
        let form = QuoteForm {
            text: entry.text.clone(),
            author: entry.authors.clone(),
        };
        let Ok(quote) = form.validate() else {
            continue;
        };

        if quotes::exists_with_text(&mut tx, &quote.text).await? {
            result.quotes_skipped += 1;
            continue;
        }
        quotes::insert(&mut tx, &quote).await?;
        result.quotes_inserted += 1;
    }

    tx.commit().await?;
    Ok(result)
}
