//! Shared HTTP state, request extractors and service-level routes.

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::error::AppError;
use crate::services::CredentialService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub credentials: CredentialService,
    /// Mount `GET /get-token`, which mints chat tokens without authentication.
    pub expose_get_token: bool,
}

impl AppState {
    pub fn new(credentials: CredentialService) -> Self {
        Self {
            credentials,
            expose_get_token: false,
        }
    }

    pub fn with_get_token(mut self, expose: bool) -> Self {
        self.expose_get_token = expose;
        self
    }

    pub fn credentials(&self) -> &CredentialService {
        &self.credentials
    }
}

/// JSON body extractor whose rejection renders as an [`AppError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Query string extractor whose rejection renders as an [`AppError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// GET / — plain greeting.
pub async fn root() -> &'static str {
    "Hello World"
}

/// GET /health — liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "chatauth" })),
    )
}
