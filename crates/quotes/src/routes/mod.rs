//! HTTP route handlers for the quotes site.

pub mod authors;
pub mod home;
pub mod quotes;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Build the page router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route(
            "/author/",
            get(authors::list).post(authors::create),
        )
        .route("/quote/", get(quotes::new_form).post(quotes::create))
        .route("/detail/{id}", get(quotes::detail))
}
