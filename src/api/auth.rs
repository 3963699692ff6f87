use axum::{ extract::FromRequestParts, http::{ header::AUTHORIZATION, request::Parts } };

use crate::error::AppError;
use crate::users::User;

use super::AppState;

/// The user behind the request's bearer token.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts.headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(AppError::Unauthorized)?;

        let user = state.users.find_by_token(token).await.map_err(|e| {
            tracing::warn!("Token validation failed: {}", e);
            AppError::Unauthorized
        })?;

        Ok(CurrentUser(user))
    }
}
