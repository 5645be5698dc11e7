//! Authentication and profile management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::profile::{Profile, ProfileSummary, UpdateProfile, UserClaims},
    repository::Repository,
};

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[1-9][0-9]{7,14}$").unwrap());

/// Normalize a phone number to E.164: strip separators, require +country code.
fn normalize_phone(input: &str) -> AppResult<String> {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    if PHONE_RE.is_match(&cleaned) {
        Ok(cleaned)
    } else {
        Err(AppError::Validation(format!(
            "Invalid phone number: {}",
            input
        )))
    }
}

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
    redis: crate::services::redis::RedisService,
}

impl UsersService {
    pub fn new(
        repository: Repository,
        config: AuthConfig,
        redis: crate::services::redis::RedisService,
    ) -> Self {
        Self {
            repository,
            config,
            redis,
        }
    }

    /// Register a new account with email and password
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        username: Option<&str>,
    ) -> AppResult<(String, Profile)> {
        if self.repository.profiles.find_by_email(email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let hash = self.hash_password(password)?;
        let profile = self
            .repository
            .profiles
            .create_with_email(email, &hash, username)
            .await?;

        let token = self.create_token(&profile)?;
        Ok((token, profile))
    }

    /// Authenticate with email and password, returning a JWT token
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, Profile)> {
        let profile = self
            .repository
            .profiles
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !self.verify_password(&profile, password)? {
            return Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        let token = self.create_token(&profile)?;
        Ok((token, profile))
    }

    /// Issue a one-time sign-in code for a phone number.
    ///
    /// Delivery is out-of-band; the code only leaves the process through
    /// the SMS gateway boundary (logged at debug level in development).
    pub async fn send_otp(&self, phone_number: &str) -> AppResult<()> {
        let phone = normalize_phone(phone_number)?;

        let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));
        self.redis
            .store_otp_code(&phone, &code, self.config.otp_ttl_seconds)
            .await?;

        tracing::info!(phone = %phone, "OTP code issued");
        tracing::debug!(phone = %phone, code = %code, "OTP code (development delivery)");

        Ok(())
    }

    /// Verify a one-time code and sign in, creating the profile on first use
    pub async fn verify_otp(&self, phone_number: &str, code: &str) -> AppResult<(String, Profile)> {
        let phone = normalize_phone(phone_number)?;

        if !self.redis.verify_otp_code(&phone, code).await? {
            return Err(AppError::Authentication(
                "Invalid or expired code".to_string(),
            ));
        }

        let profile = match self.repository.profiles.find_by_phone(&phone).await? {
            Some(profile) => profile,
            None => self.repository.profiles.create_with_phone(&phone).await?,
        };

        let token = self.create_token(&profile)?;
        Ok((token, profile))
    }

    /// Revoke the presented token until it would have expired
    pub async fn logout(&self, token: &str, claims: &UserClaims) -> AppResult<()> {
        let remaining = (claims.exp - Utc::now().timestamp()).max(1) as u64;
        self.redis
            .revoke_token(&Self::token_digest(token), remaining)
            .await
    }

    /// Check whether a presented token has been signed out
    pub async fn is_token_revoked(&self, token: &str) -> AppResult<bool> {
        self.redis
            .is_token_revoked(&Self::token_digest(token))
            .await
    }

    /// Get a full profile
    pub async fn get_profile(&self, id: Uuid) -> AppResult<Profile> {
        self.repository.profiles.get_by_id(id).await
    }

    /// Get a short public profile
    pub async fn get_public_profile(&self, id: Uuid) -> AppResult<ProfileSummary> {
        self.repository.profiles.get_summary(id).await
    }

    /// Update the caller's own profile
    pub async fn update_profile(&self, id: Uuid, update: &UpdateProfile) -> AppResult<Profile> {
        self.repository.profiles.update(id, update).await
    }

    /// Set the caller's avatar after an upload
    pub async fn set_avatar(&self, id: Uuid, avatar_url: &str) -> AppResult<Profile> {
        self.repository.profiles.set_avatar(id, avatar_url).await
    }

    /// Create a JWT token for a profile
    fn create_token(&self, profile: &Profile) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: profile
                .email
                .clone()
                .or_else(|| profile.phone_number.clone())
                .unwrap_or_default(),
            user_id: profile.id,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn verify_password(&self, profile: &Profile, password: &str) -> AppResult<bool> {
        if let Some(ref hash) = profile.password_hash {
            let parsed_hash = PasswordHash::new(hash)
                .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
            return Ok(Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok());
        }

        Ok(false)
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    fn token_digest(token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_spaced_numbers() {
        assert_eq!(normalize_phone("+1 555 123 4567").unwrap(), "+15551234567");
        assert_eq!(
            normalize_phone("+33 (6) 12-34-56-78").unwrap(),
            "+33612345678"
        );
    }

    #[test]
    fn rejects_numbers_without_country_code() {
        assert!(normalize_phone("5551234567").is_err());
        assert!(normalize_phone("0612345678").is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(normalize_phone("").is_err());
        assert!(normalize_phone("not-a-number").is_err());
        assert!(normalize_phone("+12").is_err());
    }

    #[test]
    fn token_digest_is_stable() {
        assert_eq!(
            UsersService::token_digest("abc"),
            UsersService::token_digest("abc")
        );
        assert_ne!(
            UsersService::token_digest("abc"),
            UsersService::token_digest("abd")
        );
    }
}
