//! Index page listing every quote.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::db::QuoteRepository;
use crate::error::Result;
use crate::filters;
use crate::models::Quote;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub quotes: Vec<Quote>,
}

/// GET /
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>) -> Result<IndexTemplate> {
    let quotes = QuoteRepository::new(state.pool()).list().await?;
    Ok(IndexTemplate { quotes })
}
