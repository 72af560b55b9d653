//! Chat platform integration: mirror users and mint user tokens (Stream Chat REST API).

use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::StreamConfig;
use crate::error::{AppError, AppResult};
use crate::models::chat::{ChatUser, UpsertUsersRequest};

const HEADER_AUTH_TYPE: &str = "stream-auth-type";

/// Issues chat-platform credentials for registered users.
#[async_trait]
pub trait ChatTokenIssuer: Send + Sync {
    /// Create or update the user on the chat platform.
    async fn upsert_user(&self, user: &ChatUser) -> AppResult<()>;

    /// Mint a token the client uses to connect to the chat platform as `user_id`.
    fn create_token(&self, user_id: &str) -> AppResult<String>;
}

#[derive(Serialize)]
struct UserTokenClaims<'a> {
    user_id: &'a str,
}

#[derive(Serialize)]
struct ServerTokenClaims {
    server: bool,
}

/// Stream Chat server-side client.
#[derive(Clone)]
pub struct StreamChatClient {
    http: Client,
    base_url: String,
    api_key: String,
    signing_key: EncodingKey,
}

impl StreamChatClient {
    pub fn new(config: &StreamConfig) -> AppResult<Self> {
        let http = Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .user_agent(format!("chatauth/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Issuer(format!("http client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            signing_key: EncodingKey::from_secret(config.api_secret.as_bytes()),
        })
    }

    /// Token authenticating this service itself against the REST API.
    fn server_token(&self) -> AppResult<String> {
        encode(
            &Header::default(),
            &ServerTokenClaims { server: true },
            &self.signing_key,
        )
        .map_err(|e| AppError::Issuer(format!("sign server token: {}", e)))
    }
}

#[async_trait]
impl ChatTokenIssuer for StreamChatClient {
    async fn upsert_user(&self, user: &ChatUser) -> AppResult<()> {
        let url = format!("{}/users", self.base_url);
        let response = self
            .http
            .post(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .header(reqwest::header::AUTHORIZATION, self.server_token()?)
            .header(HEADER_AUTH_TYPE, "jwt")
            .json(&UpsertUsersRequest::single(user))
            .send()
            .await
            .map_err(|e| AppError::Issuer(format!("upsert users: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Issuer(format!(
                "upsert users failed ({}): {}",
                status, body
            )));
        }

        info!(user_id = %user.id, "chat user upserted");
        Ok(())
    }

    fn create_token(&self, user_id: &str) -> AppResult<String> {
        let token = encode(
            &Header::default(),
            &UserTokenClaims { user_id },
            &self.signing_key,
        )
        .map_err(|e| AppError::Issuer(format!("sign user token: {}", e)))?;
        debug!(user_id = %user_id, "chat token created");
        Ok(token)
    }
}
