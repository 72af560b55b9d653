//! Password hashing and credential input checks.

use crate::error::{AppError, AppResult};
use validator::ValidateEmail;

/// Work factor for stored password hashes.
pub const PASSWORD_HASH_COST: u32 = 10;

/// Credential input checks and password hashing.
pub struct CredentialChecks;

impl CredentialChecks {
    /// Salted bcrypt hash (`$2b$10$...`). A fresh salt is drawn per call.
    pub fn hash(password: &str) -> AppResult<String> {
        Ok(bcrypt::hash(password, PASSWORD_HASH_COST)?)
    }

    pub fn verify(password: &str, hash: &str) -> AppResult<bool> {
        Ok(bcrypt::verify(password, hash)?)
    }

    /// Hashing is CPU-bound; keep it off the async workers.
    pub async fn hash_blocking(password: String) -> AppResult<String> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("hash task: {}", e)))?
    }

    pub async fn verify_blocking(password: String, hash: String) -> AppResult<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("verify task: {}", e)))?
    }

    pub fn validate_email(email: &str) -> AppResult<()> {
        if email.is_empty() {
            return Err(AppError::Validation("Email is required".to_string()));
        }
        if !email.validate_email() {
            return Err(AppError::Validation("Invalid email".to_string()));
        }
        Ok(())
    }

    pub fn validate_password(password: &str, min_length: u64) -> AppResult<()> {
        if password.is_empty() {
            return Err(AppError::Validation("Password is required".to_string()));
        }
        if (password.chars().count() as u64) < min_length {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                min_length
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn hash_and_verify_password() {
        let hash = CredentialChecks::hash("mypassword").unwrap();
        assert!(CredentialChecks::verify("mypassword", &hash).unwrap());
        assert!(!CredentialChecks::verify("wrong", &hash).unwrap());
    }

    #[test]
    fn hash_is_bcrypt_cost_ten() {
        let hash = CredentialChecks::hash("mypassword").unwrap();
        assert!(hash.starts_with("$2b$10$"), "{}", hash);
        assert_eq!(hash.len(), 60);
    }

    #[test]
    fn verifies_existing_cost_ten_hash() {
        let stored = bcrypt::hash("secret1", 10).unwrap();
        assert!(CredentialChecks::verify("secret1", &stored).unwrap());
    }

    #[test]
    fn salts_differ_per_call() {
        let a = CredentialChecks::hash("same").unwrap();
        let b = CredentialChecks::hash("same").unwrap();
        assert_ne!(a, b);
        assert!(!a.contains("same"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        assert_err!(CredentialChecks::verify("anything", "not-a-valid-hash"));
    }

    #[tokio::test]
    async fn blocking_variants_agree() {
        let hash = CredentialChecks::hash_blocking("secret1".into()).await.unwrap();
        assert!(CredentialChecks::verify_blocking("secret1".into(), hash.clone())
            .await
            .unwrap());
        assert!(!CredentialChecks::verify_blocking("secret2".into(), hash)
            .await
            .unwrap());
    }

    #[test]
    fn validate_email_accepts_valid() {
        assert_ok!(CredentialChecks::validate_email("user@example.com"));
        assert_ok!(CredentialChecks::validate_email("a@b.co"));
    }

    #[test]
    fn validate_email_rejects_invalid() {
        assert_err!(CredentialChecks::validate_email("invalid"));
        assert_err!(CredentialChecks::validate_email("@nodomain"));
        assert_err!(CredentialChecks::validate_email(""));
    }

    #[test]
    fn validate_password_enforces_minimum() {
        assert_err!(CredentialChecks::validate_password("", 6));
        assert_err!(CredentialChecks::validate_password("12345", 6));
        assert_ok!(CredentialChecks::validate_password("123456", 6));
    }
}
