//! Credential verification and token issuance: register, login, profile token.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::auth::{JwtSecret, CredentialChecks};
use crate::db::UserStore;
use crate::error::{AppError, AppResult};
use crate::models::{normalize_email, ChatUser, NewUser, PublicUser, UserRecord};
use crate::services::chat::ChatTokenIssuer;

const USER_NOT_FOUND: &str = "User not found";

/// Identity plus the tokens handed to a signed-in user.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub user: PublicUser,
    /// Self-signed, short-lived token for this service's protected routes.
    pub access_token: String,
    /// Chat-platform token.
    pub chat_token: String,
}

#[derive(Clone)]
pub struct CredentialService {
    users: Arc<dyn UserStore>,
    chat: Arc<dyn ChatTokenIssuer>,
    jwt: JwtSecret,
    password_min_length: u64,
}

impl CredentialService {
    pub fn new(
        users: Arc<dyn UserStore>,
        chat: Arc<dyn ChatTokenIssuer>,
        jwt: JwtSecret,
        password_min_length: u64,
    ) -> Self {
        Self {
            users,
            chat,
            jwt,
            password_min_length,
        }
    }

    /// Create a user and mirror it into the chat platform.
    ///
    /// If the chat platform rejects the user, the stored record is removed
    /// again so a retry with the same email can succeed.
    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> AppResult<PublicUser> {
        let email = normalize_email(email);
        CredentialChecks::validate_email(&email)?;
        CredentialChecks::validate_password(password, self.password_min_length)?;

        if self.users.find_by_email(&email).await?.is_some() {
            warn!(email = %email, "email already registered");
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let password_hash = CredentialChecks::hash_blocking(password.to_string()).await?;
        let user = self.users.insert(NewUser::new(email, password_hash)).await?;

        if let Err(e) = self.chat.upsert_user(&ChatUser::from_record(&user)).await {
            error!(error = %e, user_id = %user.id, "chat upsert failed; rolling back user");
            if let Err(undo) = self.users.remove(user.id).await {
                error!(error = %undo, user_id = %user.id, "rollback of user failed");
            }
            return Err(e);
        }

        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(user.public())
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> AppResult<IssuedTokens> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let user = self.users.find_by_email(&email).await?.ok_or_else(|| {
            warn!(email = %email, "login unknown email");
            AppError::NotFound(USER_NOT_FOUND.to_string())
        })?;

        if !CredentialChecks::verify_blocking(password.to_string(), user.password_hash.clone()).await? {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AppError::Unauthorized("Invalid password".to_string()));
        }

        let tokens = self.tokens_for(&user)?;
        info!(user_id = %user.id, "user logged in");
        Ok(tokens)
    }

    /// Fresh tokens for an already authenticated user.
    #[instrument(skip(self))]
    pub async fn issue_profile_token(&self, user_id: Uuid) -> AppResult<IssuedTokens> {
        let user = self.require_user(user_id).await?;
        self.tokens_for(&user)
    }

    /// Chat token for a raw user id, without authenticating the caller.
    #[instrument(skip(self))]
    pub async fn issue_chat_token(&self, user_id: &str) -> AppResult<String> {
        let id = Uuid::parse_str(user_id.trim())
            .map_err(|_| AppError::NotFound(USER_NOT_FOUND.to_string()))?;
        let user = self.require_user(id).await?;
        self.chat.create_token(&user.id.to_string())
    }

    /// Resolve a presented access token to the user id it was minted for.
    pub fn authenticate(&self, token: &str) -> AppResult<Uuid> {
        self.jwt.validate(token)
    }

    async fn require_user(&self, id: Uuid) -> AppResult<UserRecord> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_string()))
    }

    fn tokens_for(&self, user: &UserRecord) -> AppResult<IssuedTokens> {
        Ok(IssuedTokens {
            user: user.public(),
            access_token: self.jwt.issue(user.id)?,
            chat_token: self.chat.create_token(&user.id.to_string())?,
        })
    }
}
