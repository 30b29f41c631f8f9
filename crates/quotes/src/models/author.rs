//! Author model and the author creation form.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use rolodex_core::AuthorId;

/// Longest accepted author name, in characters.
pub const MAX_AUTHOR_NAME_LENGTH: usize = 100;

/// A quoted author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Reasons an author form is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorValidationError {
    #[error("Name is required")]
    Blank,
    #[error("Name must be at most {MAX_AUTHOR_NAME_LENGTH} characters")]
    TooLong,
    #[error("An author with this name already exists")]
    Duplicate,
}

/// `POST /author/` form body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorForm {
    #[serde(default)]
    pub name: String,
}

impl AuthorForm {
    /// Return the trimmed name if it is acceptable.
    ///
    /// Uniqueness is checked by the database.
    ///
    /// # Errors
    ///
    /// Returns `AuthorValidationError` for a blank or overlong name.
    pub fn validate(&self) -> Result<&str, AuthorValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AuthorValidationError::Blank);
        }
        if name.chars().count() > MAX_AUTHOR_NAME_LENGTH {
            return Err(AuthorValidationError::TooLong);
        }
        Ok(name)
    }
}
