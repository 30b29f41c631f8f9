//! Bearer token authentication extractor.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use chrono::Utc;

use rolodex_core::Email;

use crate::db::UserRepository;
use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::state::AppState;

/// Extractor that requires a valid access token.
///
/// The token's subject is resolved to a stored account. Any failure, whether
/// a missing header, a bad signature, an expired token or a deleted account,
/// is rejected with the same 401 response.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub User);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .ok_or_else(AppError::invalid_token)?;

        let claims = state
            .tokens()
            .validate(bearer.token(), Utc::now())
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected access token");
                AppError::invalid_token()
            })?;

        let email = Email::parse(&claims.sub).map_err(|_| AppError::invalid_token())?;

        let user = UserRepository::new(state.pool())
            .get_by_email(&email)
            .await?
            .ok_or_else(AppError::invalid_token)?;

        tracing::Span::current().record("user_id", user.id.as_i32());
        set_sentry_user(&user.id, Some(user.email.as_str()));

        Ok(Self(user))
    }
}
