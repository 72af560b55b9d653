//! Access-token issue and validation.

use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Clone)]
pub struct JwtSecret {
    secret: String,
    ttl: std::time::Duration,
}

impl JwtSecret {
    pub fn new(secret: String, ttl: std::time::Duration) -> Self {
        Self { secret, ttl }
    }

    pub fn issue(&self, user_id: Uuid) -> AppResult<String> {
        let now = Utc::now();
        let exp = Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| AppError::Jwt("access token lifetime out of range".to_string()))?;
        let claims = Claims {
            user_id: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Jwt(e.to_string()))?;
        debug!(user_id = %user_id, "access token issued");
        Ok(token)
    }

    pub fn validate(&self, token: &str) -> AppResult<Uuid> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AppError::Jwt(e.to_string()))?;
        let id = Uuid::parse_str(&data.claims.user_id).map_err(|e| AppError::Jwt(e.to_string()))?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> JwtSecret {
        JwtSecret::new("test-secret".into(), std::time::Duration::from_secs(3600))
    }

    #[test]
    fn issue_and_validate() {
        let user_id = Uuid::new_v4();
        let token = secret().issue(user_id).unwrap();
        assert_eq!(secret().validate(&token).unwrap(), user_id);
    }

    #[test]
    fn claims_use_user_id_key_and_one_hour_expiry() {
        let token = secret().issue(Uuid::new_v4()).unwrap();
        let mut validation = Validation::default();
        validation.validate_exp = false;
        let raw = decode::<serde_json::Value>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &validation,
        )
        .unwrap()
        .claims;
        assert!(raw.get("userId").is_some());
        let exp = raw["exp"].as_i64().unwrap();
        let iat = raw["iat"].as_i64().unwrap();
        assert_eq!(exp - iat, 3600);
    }

    #[test]
    fn rejects_expired_token() {
        let now = Utc::now();
        let claims = Claims {
            user_id: Uuid::new_v4().to_string(),
            exp: (now - Duration::seconds(5)).timestamp(),
            iat: (now - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(matches!(secret().validate(&token), Err(AppError::Jwt(_))));
    }

    #[test]
    fn out_of_range_lifetime_is_an_error() {
        for secs in [10_000_000_000_000, u64::MAX] {
            let jwt = JwtSecret::new("s".into(), std::time::Duration::from_secs(secs));
            assert!(matches!(jwt.issue(Uuid::new_v4()), Err(AppError::Jwt(_))));
        }
    }

    #[test]
    fn rejects_wrong_secret_and_garbage() {
        let other = JwtSecret::new("other".into(), std::time::Duration::from_secs(3600));
        let token = other.issue(Uuid::new_v4()).unwrap();
        assert!(secret().validate(&token).is_err());
        assert!(secret().validate("not.a.jwt").is_err());
    }

    #[test]
    fn rejects_tampered_payload() {
        let forged = secret().issue(Uuid::new_v4()).unwrap();
        let forged_payload = forged.split('.').nth(1).unwrap().to_string();
        let token = secret().issue(Uuid::new_v4()).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = &forged_payload;
        let tampered = parts.join(".");
        // Signature of the first token does not cover the second payload.
        assert!(secret().validate(&tampered).is_err());
    }
}
