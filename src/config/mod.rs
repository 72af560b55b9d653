//! Application configuration loaded from environment.

use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_STREAM_BASE_URL: &str = "https://chat.stream-io-api.com";

/// Application configuration loaded from `.env` and environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g. `0.0.0.0:3000`). `PORT` alone is also honoured.
    pub server_addr: SocketAddr,
    /// PostgreSQL connection URL. When unset, users are kept in memory.
    pub database_url: Option<String>,
    pub stream: StreamConfig,
    /// Secret for signing access tokens.
    pub jwt_secret: String,
    /// Lifetime of issued access tokens.
    pub access_token_ttl: Duration,
    /// Minimum password length accepted at registration.
    pub password_min_length: u64,
    /// Mount the unauthenticated `GET /get-token` route.
    pub expose_get_token: bool,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

/// Chat platform credentials and client settings.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_addr = match (lookup("SERVER_ADDR"), lookup("PORT")) {
            (Some(addr), _) => addr,
            (None, Some(port)) => format!("0.0.0.0:{}", port),
            (None, None) => "0.0.0.0:3000".to_string(),
        };
        let server_addr: SocketAddr = server_addr
            .parse()
            .map_err(|_| ConfigLoadError::InvalidServerAddr)?;

        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());

        let required = |key: &'static str| {
            lookup(key)
                .filter(|s| !s.is_empty())
                .ok_or(ConfigLoadError::Missing(key))
        };

        let stream = StreamConfig {
            api_key: required("STREAM_API_KEY")?,
            api_secret: required("STREAM_API_SECRET")?,
            base_url: lookup("STREAM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_STREAM_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            timeout: Duration::from_millis(parse_or(&lookup, "STREAM_TIMEOUT_MS", 3000)?),
        };

        let jwt_secret = required("JWT_SECRET")?;
        let access_token_ttl = token_ttl(parse_or(&lookup, "ACCESS_TOKEN_TTL_SECS", 3600)?)?;
        let password_min_length = parse_or(&lookup, "PASSWORD_MIN_LENGTH", 6)?;
        let expose_get_token = parse_or(&lookup, "EXPOSE_GET_TOKEN", false)?;
        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            server_addr,
            database_url,
            stream,
            jwt_secret,
            access_token_ttl,
            password_min_length,
            expose_get_token,
            log_level,
        })
    }
}

/// Token lifetime must be positive and keep `now + ttl` representable.
fn token_ttl(secs: u64) -> Result<Duration, ConfigLoadError> {
    let invalid = ConfigLoadError::Invalid("ACCESS_TOKEN_TTL_SECS");
    if secs == 0 {
        return Err(invalid);
    }
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .and_then(|ttl| chrono::Utc::now().checked_add_signed(ttl))
        .map(|_| Duration::from_secs(secs))
        .ok_or(invalid)
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigLoadError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigLoadError::Invalid(key)),
        None => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Invalid SERVER_ADDR")]
    InvalidServerAddr,
    #[error("Missing required variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {0}")]
    Invalid(&'static str),
}
