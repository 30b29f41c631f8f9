//! Password reset route handlers.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::Result;
use crate::extract::ApiJson;
use crate::services::{AuthService, auth::RESET_TOKEN_TTL};
use crate::state::AppState;

const RESET_REQUESTED: &str = "If an account exists for that email, a reset token has been sent";

#[derive(Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetConfirm {
    pub token: String,
    pub new_password: String,
}

/// Mail a reset token if the account exists.
///
/// POST /api/password-reset/
///
/// Responds 202 the same way whether or not the email is registered. The
/// mail is sent in the background.
#[instrument(skip(state, input), fields(email = %input.email))]
pub async fn request_reset(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ResetRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let issued = AuthService::new(state.pool())
        .request_password_reset(&input.email, Utc::now())
        .await?;

    if let Some((user, token)) = issued {
        tracing::info!(user_id = %user.id, "Password reset token issued");

        tokio::spawn(async move {
            if let Err(e) = state
                .email()
                .send_password_reset(&user.email, &token, RESET_TOKEN_TTL.num_minutes())
                .await
            {
                let event_id = sentry::capture_error(&e);
                tracing::error!(
                    error = %e,
                    user_id = %user.id,
                    sentry_event_id = %event_id,
                    "Failed to send password reset email"
                );
            }
        });
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "message": RESET_REQUESTED })),
    ))
}

/// Set a new password using a reset token.
///
/// POST /api/password-reset/confirm
#[instrument(skip_all)]
pub async fn confirm_reset(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ResetConfirm>,
) -> Result<Json<Value>> {
    let user_id = AuthService::new(state.pool())
        .confirm_password_reset(&input.token, &input.new_password, Utc::now())
        .await?;

    tracing::info!(user_id = %user_id, "Password reset completed");

    Ok(Json(json!({ "message": "Password updated successfully" })))
}
