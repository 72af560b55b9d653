//! Credential service for a chat backend, built with Rust.
//!
//! Registers and logs in users, mirrors them into the chat platform and
//! hands out chat tokens plus short-lived self-signed access tokens.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;
pub use services::{ChatTokenIssuer, CredentialService};

use axum::routing::{get, post};
use handlers::http;

/// Build the API router. Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    let mut router = axum::Router::new()
        .route("/", get(http::root))
        .route("/health", get(http::health))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/profile", get(auth::profile));

    if state.expose_get_token {
        router = router.route("/get-token", get(auth::get_token));
    }

    router.with_state(state)
}
