//! HTTP route handlers for the contacts API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                          - Greeting
//! POST   /verify/?token=            - Confirm an email verification code
//!
//! # Accounts
//! POST   /api/register/             - Create an account
//! PUT    /api/users/{id}/avatar/    - Upload an avatar (multipart, bearer)
//! POST   /api/auth/token            - Exchange credentials for an access token
//! POST   /api/password-reset/       - Mail a reset token
//! POST   /api/password-reset/confirm - Set a new password with a reset token
//!
//! # Contacts (bearer)
//! POST   /api/contacts/             - Create
//! GET    /api/contacts/             - List (?skip=&limit=)
//! GET    /api/contacts/search/      - Search (?query=)
//! GET    /api/contacts/birthday/    - Birthdays in the next 7 days
//! GET    /api/contacts/{id}         - Fetch
//! PUT    /api/contacts/{id}         - Replace
//! DELETE /api/contacts/{id}         - Delete
//! ```
//!
//! Every route except the greeting carries its own rate limiter.

pub mod auth;
pub mod contacts;
pub mod password_reset;
pub mod users;
pub mod verify;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};

use crate::middleware::route_rate_limiter;
use crate::state::AppState;

/// Largest accepted avatar image.
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

/// Room for multipart boundaries and headers around the avatar part.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the account and token routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/register/",
            post(users::register).layer(route_rate_limiter()),
        )
        .route(
            "/users/{id}/avatar/",
            put(users::update_avatar)
                .layer::<_, std::convert::Infallible>(route_rate_limiter())
                .layer(DefaultBodyLimit::max(
                    MAX_AVATAR_BYTES + MULTIPART_OVERHEAD_BYTES,
                )),
        )
        .route("/auth/token", post(auth::login).layer(route_rate_limiter()))
        .route(
            "/password-reset/",
            post(password_reset::request_reset).layer(route_rate_limiter()),
        )
        .route(
            "/password-reset/confirm",
            post(password_reset::confirm_reset).layer(route_rate_limiter()),
        )
}

/// Create the contact routes router.
pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/contacts/",
            post(contacts::create)
                .layer(route_rate_limiter())
                .merge(get(contacts::list).layer(route_rate_limiter())),
        )
        .route(
            "/api/contacts/search/",
            get(contacts::search).layer(route_rate_limiter()),
        )
        .route(
            "/api/contacts/birthday/",
            get(contacts::upcoming_birthdays).layer(route_rate_limiter()),
        )
        .route(
            "/api/contacts/{id}",
            get(contacts::get)
                .layer(route_rate_limiter())
                .merge(put(contacts::update).layer(route_rate_limiter()))
                .merge(delete(contacts::delete).layer(route_rate_limiter())),
        )
}

/// Create all routes for the contacts API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/verify/", post(verify::verify).layer(route_rate_limiter()))
        .nest("/api", account_routes())
        .merge(contact_routes())
}

/// Greeting at the API root.
async fn root() -> Json<Value> {
    Json(json!({ "message": "Hello World" }))
}
