//! Registration and avatar route handlers.

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use rolodex_core::UserId;

use super::MAX_AVATAR_BYTES;
use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAuth;
use crate::models::PublicUser;
use crate::services::{AuthService, auth::VERIFICATION_CODE_TTL};
use crate::state::AppState;

/// Multipart field holding the avatar image.
const AVATAR_FIELD: &str = "avatar";

/// Registration request body.
#[derive(Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
}

/// Create an account and mail its verification code.
///
/// POST /api/register/
///
/// The verification email is sent in the background. A failed send is
/// logged but does not undo the registration.
#[instrument(skip(state, input), fields(email = %input.email))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RegisterInput>,
) -> Result<(StatusCode, Json<PublicUser>)> {
    let user = AuthService::new(state.pool())
        .register(&input.email, &input.password, Utc::now())
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    if let Some(code) = user.verification_code.clone() {
        let email = user.email.clone();
        let user_id = user.id;
        tokio::spawn(async move {
            if let Err(e) = state
                .email()
                .send_verification_code(&email, &code, VERIFICATION_CODE_TTL.num_hours())
                .await
            {
                let event_id = sentry::capture_error(&e);
                tracing::error!(
                    error = %e,
                    user_id = %user_id,
                    sentry_event_id = %event_id,
                    "Failed to send verification email"
                );
            }
        });
    }

    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

/// Replace the caller's avatar.
///
/// PUT /api/users/{id}/avatar/
///
/// Expects a `multipart/form-data` body with an `avatar` image part.
#[instrument(skip(state, user, multipart), fields(user_id = %user.id))]
pub async fn update_avatar(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<UserId>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<PublicUser>> {
    let mut multipart = multipart?;
    let users = UserRepository::new(state.pool());

    if id != user.id {
        return Err(match users.get_by_id(id).await? {
            Some(_) => AppError::Forbidden("Cannot change another user's avatar".to_string()),
            None => AppError::NotFound("User not found".to_string()),
        });
    }

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }

        let content_type = field
            .content_type()
            .filter(|ct| ct.starts_with("image/"))
            .map(String::from)
            .ok_or_else(|| AppError::BadRequest("Avatar must be an image".to_string()))?;
        let file_name = field
            .file_name()
            .map_or_else(|| "avatar".to_string(), String::from);
        let bytes = field.bytes().await?;

        if bytes.is_empty() {
            return Err(AppError::BadRequest("Avatar file is empty".to_string()));
        }
        if bytes.len() > MAX_AVATAR_BYTES {
            return Err(AppError::PayloadTooLarge(format!(
                "Avatar must be at most {} MiB",
                MAX_AVATAR_BYTES / (1024 * 1024)
            )));
        }

        upload = Some((bytes, file_name, content_type));
        break;
    }

    let (bytes, file_name, content_type) = upload
        .ok_or_else(|| AppError::BadRequest(format!("Missing '{AVATAR_FIELD}' file")))?;

    let url = state
        .cloudinary()
        .upload_avatar(user.id, bytes.to_vec(), file_name, &content_type)
        .await?;

    let updated = users.update_avatar(user.id, &url).await?;
    Ok(Json(PublicUser::from(updated)))
}
