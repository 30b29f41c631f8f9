//! Token route handler.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::extract::ApiForm;
use crate::services::AuthService;
use crate::state::AppState;

/// Password grant form (`application/x-www-form-urlencoded`).
///
/// Extra OAuth2 fields such as `grant_type` and `scope` are accepted and ignored.
#[derive(Deserialize)]
pub struct TokenForm {
    /// Account email.
    pub username: String,
    pub password: String,
}

/// Issued access token.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Exchange credentials for a bearer token.
///
/// POST /api/auth/token
#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<TokenForm>,
) -> Result<Json<TokenResponse>> {
    let user = AuthService::new(state.pool())
        .login(&form.username, &form.password)
        .await?;

    let access_token = state
        .tokens()
        .issue(&user.email, Utc::now())
        .map_err(crate::services::AuthError::from)?;

    tracing::info!(user_id = %user.id, "Access token issued");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}
