//! Author list and creation form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use crate::db::{AuthorRepository, RepositoryError};
use crate::error::Result;
use crate::extract::PageForm;
use crate::filters;
use crate::models::{Author, AuthorForm, AuthorValidationError, MAX_AUTHOR_NAME_LENGTH};
use crate::state::AppState;

/// Author list with the create form.
#[derive(Template, WebTemplate)]
#[template(path = "authors.html")]
pub struct AuthorsTemplate {
    pub authors: Vec<Author>,
    /// Previously submitted name, echoed back after an error
    pub name: String,
    pub error: Option<String>,
    pub max_name_length: usize,
}

impl AuthorsTemplate {
    fn new(authors: Vec<Author>, name: String, error: Option<String>) -> Self {
        Self {
            authors,
            name,
            error,
            max_name_length: MAX_AUTHOR_NAME_LENGTH,
        }
    }
}

/// GET /author/
#[instrument(skip_all)]
pub async fn list(State(state): State<AppState>) -> Result<AuthorsTemplate> {
    let authors = AuthorRepository::new(state.pool()).list().await?;
    Ok(AuthorsTemplate::new(authors, String::new(), None))
}

/// POST /author/
///
/// Redirects to the index on success; re-renders the form with status 422
/// when the name is rejected.
#[instrument(skip(state, form), fields(name = %form.name))]
pub async fn create(
    State(state): State<AppState>,
    PageForm(form): PageForm<AuthorForm>,
) -> Result<Response> {
    let repo = AuthorRepository::new(state.pool());

    let outcome = match form.validate() {
        Ok(name) => match repo.create(name).await {
            Ok(author) => Ok(author),
            Err(RepositoryError::Conflict(_)) => Err(AuthorValidationError::Duplicate),
            Err(e) => return Err(e.into()),
        },
        Err(e) => Err(e),
    };

    match outcome {
        Ok(author) => {
            tracing::info!(author_id = %author.id, "Author created");
            Ok(Redirect::to("/").into_response())
        }
        Err(rejected) => {
            let authors = repo.list().await?;
            let page = AuthorsTemplate::new(authors, form.name, Some(rejected.to_string()));
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}
