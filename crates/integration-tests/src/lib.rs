//! End-to-end test helpers for Rolodex.
//!
//! # Running Tests
//!
//! ```bash
//! cargo run -p rolodex-cli -- migrate all
//! cargo run -p rolodex-contacts &
//! cargo run -p rolodex-quotes &
//! cargo test -p rolodex-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `CONTACTS_BASE_URL` - Contacts API (default: `http://localhost:8000`)
//! - `QUOTES_BASE_URL` - Quotes site (default: `http://localhost:8001`)
//! - `CONTACTS_DATABASE_URL` / `DATABASE_URL` - Read back verification codes
//!   and reset tokens that would otherwise arrive by mail

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use sqlx::PgPool;

/// Base URL for the contacts API.
#[must_use]
pub fn contacts_base_url() -> String {
    std::env::var("CONTACTS_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// Base URL for the quotes site.
#[must_use]
pub fn quotes_base_url() -> String {
    std::env::var("QUOTES_BASE_URL").unwrap_or_else(|_| "http://localhost:8001".to_string())
}

/// HTTP client presenting its own client address.
///
/// Each test gets a distinct `X-Forwarded-For` value so the per-address
/// rate limit is not shared between tests.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
#[allow(clippy::expect_used)]
pub fn client() -> Client {
    let bytes = uuid::Uuid::new_v4().into_bytes();
    let address = format!("10.{}.{}.{}", bytes[0], bytes[1], bytes[2]);

    let mut headers = HeaderMap::new();
    headers.insert(
        "x-forwarded-for",
        HeaderValue::from_str(&address).expect("generated address is a valid header"),
    );

    Client::builder()
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// A fresh email address for one test.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4().simple())
}

/// Connect to the contacts database.
///
/// # Panics
///
/// Panics if no database URL is set or the connection fails.
#[allow(clippy::expect_used)]
pub async fn contacts_pool() -> PgPool {
    let url = std::env::var("CONTACTS_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("CONTACTS_DATABASE_URL or DATABASE_URL must be set");
    PgPool::connect(&url)
        .await
        .expect("Failed to connect to contacts database")
}
