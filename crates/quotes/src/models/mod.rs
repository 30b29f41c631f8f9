//! Domain models for the quotes site.

pub mod author;
pub mod quote;

pub use author::{Author, AuthorForm, AuthorValidationError, MAX_AUTHOR_NAME_LENGTH};
pub use quote::{AuthorNames, NewQuote, Quote, QuoteForm, QuoteValidationError};
