//! Quote creation form and detail page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use rolodex_core::QuoteId;

use crate::db::{AuthorRepository, QuoteRepository};
use crate::error::{AppError, Result};
use crate::extract::{PageForm, PagePath};
use crate::filters;
use crate::models::{Author, Quote, QuoteForm};
use crate::state::AppState;

/// One author checkbox on the quote form.
#[derive(Debug, Clone)]
pub struct AuthorChoice {
    pub name: String,
    pub checked: bool,
}

fn choices(authors: Vec<Author>, selected: &[String]) -> Vec<AuthorChoice> {
    authors
        .into_iter()
        .map(|author| AuthorChoice {
            checked: selected.iter().any(|s| s.trim() == author.name),
            name: author.name,
        })
        .collect()
}

/// Quote creation form.
#[derive(Template, WebTemplate)]
#[template(path = "quote_form.html")]
pub struct QuoteFormTemplate {
    pub choices: Vec<AuthorChoice>,
    pub text: String,
    pub error: Option<String>,
}

/// Quote detail page.
#[derive(Template, WebTemplate)]
#[template(path = "detail.html")]
pub struct DetailTemplate {
    pub quote: Quote,
}

/// GET /quote/
#[instrument(skip_all)]
pub async fn new_form(State(state): State<AppState>) -> Result<QuoteFormTemplate> {
    let authors = AuthorRepository::new(state.pool()).list().await?;
    Ok(QuoteFormTemplate {
        choices: choices(authors, &[]),
        text: String::new(),
        error: None,
    })
}

/// POST /quote/
///
/// Stores the quote with its checked authors, then redirects to the index.
#[instrument(skip(state, form), fields(authors = form.author.len()))]
pub async fn create(
    State(state): State<AppState>,
    PageForm(form): PageForm<QuoteForm>,
) -> Result<Response> {
    match form.validate() {
        Ok(quote) => {
            let created = QuoteRepository::new(state.pool()).create(&quote).await?;
            tracing::info!(quote_id = %created.id, "Quote created");
            Ok(Redirect::to("/").into_response())
        }
        Err(rejected) => {
            let authors = AuthorRepository::new(state.pool()).list().await?;
            let page = QuoteFormTemplate {
                choices: choices(authors, &form.author),
                text: form.text,
                error: Some(rejected.to_string()),
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

/// GET /detail/{id}
#[instrument(skip(state))]
pub async fn detail(
    State(state): State<AppState>,
    PagePath(id): PagePath<QuoteId>,
) -> Result<DetailTemplate> {
    QuoteRepository::new(state.pool())
        .get(id)
        .await?
        .map(|quote| DetailTemplate { quote })
        .ok_or_else(|| AppError::NotFound("Quote not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rolodex_core::AuthorId;

    fn author(id: i32, name: &str) -> Author {
        Author {
            id: AuthorId::new(id),
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_choices_keep_previous_selection() {
        let authors = vec![author(1, "Ada"), author(2, "Grace")];
        let picked = choices(authors, &[" Grace ".to_string(), "Nobody".to_string()]);

        assert_eq!(picked.len(), 2);
        assert!(!picked[0].checked);
        assert!(picked[1].checked);
    }

    #[test]
    fn test_detail_renders_authors() {
        let page = DetailTemplate {
            quote: Quote {
                id: QuoteId::new(3),
                text: "Simplicity is prerequisite for reliability.".to_string(),
                authors: vec!["Edsger Dijkstra".to_string()],
                created_at: Utc::now(),
            },
        };
        let html = page.render().unwrap_or_default();
        assert!(html.contains("Simplicity is prerequisite"));
        assert!(html.contains("Edsger Dijkstra"));
    }
}
