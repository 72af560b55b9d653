//! Entry point: load config, wire dependencies, and run the server.

use chatauth::auth::JwtSecret;
use chatauth::config::Config;
use chatauth::db::{self, MemoryUserStore, PgUserStore, UserStore};
use chatauth::services::{ChatTokenIssuer, CredentialService, StreamChatClient};
use chatauth::{create_app, AppState};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let users: Arc<dyn UserStore> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            db::run_migrations(&pool).await?;
            tracing::info!("database connected");
            Arc::new(PgUserStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; users are kept in memory");
            Arc::new(MemoryUserStore::new())
        }
    };
    let chat: Arc<dyn ChatTokenIssuer> = Arc::new(
        StreamChatClient::new(&config.stream).map_err(|e| anyhow::anyhow!("chat client: {}", e))?,
    );
    let jwt_secret = JwtSecret::new(config.jwt_secret.clone(), config.access_token_ttl);

    let credentials = CredentialService::new(
        users.clone(),
        chat,
        jwt_secret,
        config.password_min_length,
    );

    if config.expose_get_token {
        tracing::warn!("GET /get-token is enabled and issues chat tokens without authentication");
    }
    let state = AppState::new(credentials).with_get_token(config.expose_get_token);

    let app = create_app(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!(addr = %config.server_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    users.close().await;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
