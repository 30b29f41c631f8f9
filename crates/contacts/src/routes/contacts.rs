//! Contact route handlers.
//!
//! All handlers act on the authenticated caller's contacts only.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use rolodex_core::ContactId;

use crate::db::{ContactRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAuth;
use crate::models::{Contact, ContactInput, upcoming_birthdays as birthdays_within_week};
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// Pagination query (`?skip=&limit=`).
#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl Pagination {
    /// Resolve to `(skip, limit)` with defaults applied and `limit` clamped.
    fn resolve(&self) -> Result<(i64, i64)> {
        let skip = self.skip.unwrap_or(0);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if skip < 0 || limit < 0 {
            return Err(AppError::BadRequest(
                "skip and limit must not be negative".to_string(),
            ));
        }
        Ok((skip, limit.min(MAX_LIMIT)))
    }
}

/// Search query (`?query=`).
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: Option<String>,
}

fn not_found(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => contact_not_found(),
        other => AppError::Database(other),
    }
}

fn contact_not_found() -> AppError {
    AppError::NotFound("Contact not found".to_string())
}

fn validate(input: ContactInput) -> Result<crate::models::NewContact> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

/// POST /api/contacts/
#[instrument(skip(state, user, input), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(input): ApiJson<ContactInput>,
) -> Result<(StatusCode, Json<Contact>)> {
    let contact = validate(input)?;
    let created = ContactRepository::new(state.pool())
        .create(user.id, &contact)
        .await?;

    tracing::info!(contact_id = %created.id, "Contact created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/contacts/
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiQuery(page): ApiQuery<Pagination>,
) -> Result<Json<Vec<Contact>>> {
    let (skip, limit) = page.resolve()?;
    let contacts = ContactRepository::new(state.pool())
        .list(user.id, skip, limit)
        .await?;
    Ok(Json(contacts))
}

/// GET /api/contacts/{id}
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<ContactId>,
) -> Result<Json<Contact>> {
    ContactRepository::new(state.pool())
        .get(user.id, id)
        .await?
        .map(Json)
        .ok_or_else(contact_not_found)
}

/// PUT /api/contacts/{id}
#[instrument(skip(state, user, input), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<ContactId>,
    ApiJson(input): ApiJson<ContactInput>,
) -> Result<Json<Contact>> {
    let contact = validate(input)?;
    let updated = ContactRepository::new(state.pool())
        .update(user.id, id, &contact)
        .await
        .map_err(not_found)?;

    tracing::info!(contact_id = %updated.id, "Contact updated");
    Ok(Json(updated))
}

/// DELETE /api/contacts/{id}
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<ContactId>,
) -> Result<Json<Value>> {
    ContactRepository::new(state.pool())
        .delete(user.id, id)
        .await
        .map_err(not_found)?;

    tracing::info!(contact_id = %id, "Contact deleted");
    Ok(Json(json!({ "message": "Contact deleted" })))
}

/// GET /api/contacts/search/
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn search(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiQuery(search): ApiQuery<SearchQuery>,
) -> Result<Json<Vec<Contact>>> {
    let contacts = ContactRepository::new(state.pool())
        .search(user.id, search.query.as_deref())
        .await?;
    Ok(Json(contacts))
}

/// GET /api/contacts/birthday/
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn upcoming_birthdays(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Contact>>> {
    let contacts = ContactRepository::new(state.pool())
        .with_birthdays(user.id)
        .await?;
    let today = Utc::now().date_naive();
    Ok(Json(birthdays_within_week(contacts, today)))
}
