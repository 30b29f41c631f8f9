//! Quote model and the quote creation form.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use rolodex_core::QuoteId;

/// A quote with the names of its authors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub id: QuoteId,
    pub text: String,
    /// Author names, sorted
    pub authors: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Quote {
    /// Author names joined for display.
    #[must_use]
    pub fn author_names(&self) -> AuthorNames<'_> {
        AuthorNames(&self.authors)
    }
}

/// Displays a list of author names separated by `", "`.
#[derive(Debug, Clone, Copy)]
pub struct AuthorNames<'a>(pub &'a [String]);

impl fmt::Display for AuthorNames<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

/// Reasons a quote form is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteValidationError {
    #[error("Quote text is required")]
    Blank,
}

/// `POST /quote/` form body.
///
/// Each checked author arrives as a repeated `author` field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteForm {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub author: Vec<String>,
}

/// A validated quote ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuote {
    pub text: String,
    pub authors: Vec<String>,
}

impl QuoteForm {
    /// Validate the form.
    ///
    /// Author names are trimmed and de-duplicated; whether they exist is
    /// decided at insert time.
    ///
    /// # Errors
    ///
    /// Returns `QuoteValidationError::Blank` when the text is empty.
    pub fn validate(&self) -> Result<NewQuote, QuoteValidationError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(QuoteValidationError::Blank);
        }

        let mut authors: Vec<String> = self
            .author
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect();
        authors.sort();
        authors.dedup();

        Ok(NewQuote {
            text: text.to_string(),
            authors,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_author_names_display() {
        let names = vec!["Ada".to_string(), "Grace".to_string()];
        assert_eq!(AuthorNames(&names).to_string(), "Ada, Grace");
        assert_eq!(AuthorNames(&names[..1]).to_string(), "Ada");
        assert_eq!(AuthorNames(&[]).to_string(), "");
    }

    #[test]
    fn test_blank_text_rejected() {
        let form = QuoteForm {
            text: " \n ".to_string(),
            author: vec!["Ada".to_string()],
        };
        assert_eq!(form.validate(), Err(QuoteValidationError::Blank));
    }

    #[test]
    fn test_authors_cleaned() {
        let form = QuoteForm {
            text: "  Stay hungry.  ".to_string(),
            author: vec![
                "Grace".to_string(),
                " Ada ".to_string(),
                String::new(),
                "Ada".to_string(),
            ],
        };
        let quote = form.validate().unwrap();
        assert_eq!(quote.text, "Stay hungry.");
        assert_eq!(quote.authors, vec!["Ada".to_string(), "Grace".to_string()]);
    }
}
