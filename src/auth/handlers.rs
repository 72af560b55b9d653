//! Auth HTTP handlers: register, login, profile, get-token.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use crate::handlers::http::{AppJson, AppQuery, AppState};
use crate::middleware::AuthUser;
use crate::models::PublicUser;
use crate::services::IssuedTokens;

#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
    pub chat_token: String,
}

impl From<IssuedTokens> for TokenResponse {
    fn from(t: IssuedTokens) -> Self {
        Self {
            user_id: t.user.id,
            email: t.user.email,
            access_token: t.access_token,
            chat_token: t.chat_token,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTokenQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GetTokenResponse {
    pub token: String,
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    AppJson(body): AppJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let user = state
        .credentials()
        .register(&body.email, &body.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created successfully".to_string(),
            user,
        }),
    ))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<CredentialsRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let tokens = state.credentials().login(&body.email, &body.password).await?;
    Ok(Json(tokens.into()))
}

/// GET /profile
pub async fn profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<TokenResponse>, AppError> {
    let tokens = state.credentials().issue_profile_token(user_id).await?;
    Ok(Json(tokens.into()))
}

/// GET /get-token?userId=<id>
pub async fn get_token(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<GetTokenQuery>,
) -> Result<Json<GetTokenResponse>, AppError> {
    let user_id = query
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("userId is required".to_string()))?;
    let token = state.credentials().issue_chat_token(&user_id).await?;
    Ok(Json(GetTokenResponse { token }))
}
