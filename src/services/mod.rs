//! Business logic: credential checks and chat-platform token issuance.

pub mod chat;
pub mod credentials;

pub use chat::{ChatTokenIssuer, StreamChatClient};
pub use credentials::{CredentialService, IssuedTokens};
