//! Authentication: register, login, access tokens, password hashing.

mod handlers;
mod jwt;
mod service;

pub use handlers::{get_token, login, profile, register, TokenResponse};
pub use jwt::{Claims, JwtSecret};
pub use service::CredentialChecks;
