//! Profile model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Profile model from database.
///
/// One row per user. Created on signup or on first phone sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Profile {
    pub id: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub address_street: Option<String>,
    pub address_city: Option<String>,
    pub address_state: Option<String>,
    pub address_zip: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Short profile representation embedded in items and requests
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ProfileSummary {
    pub id: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfileSummary {
    /// Display name for UI purposes only. Authorization always compares ids.
    pub fn display_name(&self) -> String {
        if let Some(ref username) = self.username {
            if !username.is_empty() {
                return username.clone();
            }
        }
        self.email
            .as_deref()
            .and_then(|e| e.split('@').next())
            .filter(|p| !p.is_empty())
            .unwrap_or("Anonymous")
            .to_string()
    }
}

/// Update own profile request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfile {
    #[validate(length(min = 1, max = 50))]
    pub username: Option<String>,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub address_street: Option<String>,
    pub address_city: Option<String>,
    pub address_state: Option<String>,
    #[validate(length(max = 16))]
    pub address_zip: Option<String>,
}

/// JWT claims for an authenticated user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// Login identifier (email or phone number)
    pub sub: String,
    pub user_id: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(username: Option<&str>, email: Option<&str>) -> ProfileSummary {
        ProfileSummary {
            id: Uuid::new_v4(),
            username: username.map(String::from),
            email: email.map(String::from),
            avatar_url: None,
        }
    }

    #[test]
    fn display_name_prefers_username() {
        let p = summary(Some("alice"), Some("alice@example.com"));
        assert_eq!(p.display_name(), "alice");
    }

    #[test]
    fn display_name_falls_back_to_email_prefix() {
        let p = summary(None, Some("bob@example.com"));
        assert_eq!(p.display_name(), "bob");
    }

    #[test]
    fn display_name_anonymous_without_identity() {
        let p = summary(None, None);
        assert_eq!(p.display_name(), "Anonymous");
    }

    #[test]
    fn claims_round_trip() {
        let claims = UserClaims {
            sub: "alice@example.com".to_string(),
            user_id: Uuid::new_v4(),
            exp: chrono::Utc::now().timestamp() + 3600,
            iat: chrono::Utc::now().timestamp(),
        };
        let token = claims.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, claims.user_id);
        assert_eq!(parsed.sub, claims.sub);
    }

    #[test]
    fn claims_reject_wrong_secret() {
        let claims = UserClaims {
            sub: "alice@example.com".to_string(),
            user_id: Uuid::new_v4(),
            exp: chrono::Utc::now().timestamp() + 3600,
            iat: chrono::Utc::now().timestamp(),
        };
        let token = claims.create_token("secret").unwrap();
        assert!(UserClaims::from_token(&token, "other").is_err());
    }
}
