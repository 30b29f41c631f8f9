//! Email verification route handler.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::Result;
use crate::extract::ApiQuery;
use crate::services::AuthService;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct VerifyQuery {
    pub token: String,
}

/// Confirm an emailed verification code.
///
/// POST /verify/?token=<code>
#[instrument(skip_all)]
pub async fn verify(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<VerifyQuery>,
) -> Result<Json<Value>> {
    let user = AuthService::new(state.pool())
        .verify_email(&query.token, Utc::now())
        .await?;

    tracing::info!(user_id = %user.id, "Email verified");

    Ok(Json(json!({ "message": "Email verified successfully" })))
}
