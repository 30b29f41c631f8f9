//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ContactsConfig;
use crate::services::{
    CloudinaryClient, CloudinaryError, EmailService, TokenIssuer,
};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("email service: {0}")]
    Email(#[from] lettre::transport::smtp::Error),
    #[error("image host client: {0}")]
    ImageHost(#[from] CloudinaryError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ContactsConfig,
    pool: PgPool,
    tokens: TokenIssuer,
    email: EmailService,
    cloudinary: CloudinaryClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP transport or HTTP client cannot be built.
    pub fn new(config: ContactsConfig, pool: PgPool) -> Result<Self, StateError> {
        let tokens = TokenIssuer::from_config(&config.jwt);
        let email = EmailService::new(&config.email)?;
        let cloudinary = CloudinaryClient::new(&config.cloudinary)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
                email,
                cloudinary,
            }),
        })
    }

    /// Get a reference to the contacts configuration.
    #[must_use]
    pub fn config(&self) -> &ContactsConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the access token issuer.
    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }

    /// Get a reference to the email service.
    #[must_use]
    pub fn email(&self) -> &EmailService {
        &self.inner.email
    }

    /// Get a reference to the Cloudinary client.
    #[must_use]
    pub fn cloudinary(&self) -> &CloudinaryClient {
        &self.inner.cloudinary
    }
}
