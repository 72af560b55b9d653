//! Identities mirrored into the chat platform.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::user::UserRecord;

/// Role given to every self-registered user.
pub const DEFAULT_CHAT_ROLE: &str = "user";

/// User object as the chat platform stores it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatUser {
    pub id: String,
    pub role: String,
    pub name: String,
}

impl ChatUser {
    /// Mirror a registered user, using the email as display name.
    pub fn from_record(user: &UserRecord) -> Self {
        Self {
            id: user.id.to_string(),
            role: DEFAULT_CHAT_ROLE.to_string(),
            name: user.email.clone(),
        }
    }
}

/// Body of the batch user upsert call, keyed by user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertUsersRequest {
    pub users: HashMap<String, ChatUser>,
}

impl UpsertUsersRequest {
    pub fn single(user: &ChatUser) -> Self {
        let mut users = HashMap::with_capacity(1);
        users.insert(user.id.clone(), user.clone());
        Self { users }
    }
}
