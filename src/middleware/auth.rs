//! Auth extractor: verified user ID from the access token in `Authorization`.

use axum::http::header::AUTHORIZATION;
use tracing::debug;
use uuid::Uuid;

use crate::error::AppError;
use crate::handlers::http::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Extractor: authenticated user ID. Accepts the raw token or `Bearer <token>`.
#[derive(Clone, Copy, Debug)]
pub struct AuthUser(pub Uuid);

#[axum::async_trait]
impl axum::extract::FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.strip_prefix(BEARER_PREFIX).unwrap_or(s).trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Access token is required".to_string()))?;
        let user_id = state.credentials().authenticate(token).map_err(|e| {
            debug!(error = %e, "rejected access token");
            e
        })?;
        Ok(AuthUser(user_id))
    }
}
