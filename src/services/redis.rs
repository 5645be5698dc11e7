//! Redis service for one-time OTP codes and revoked tokens

use redis::{AsyncCommands, Client};

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct RedisService {
    client: Client,
}

impl RedisService {
    /// Create a new Redis service
    pub async fn new(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        // Test connection
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { client })
    }

    /// Store an OTP code for a phone number with expiration (in seconds)
    pub async fn store_otp_code(
        &self,
        phone_number: &str,
        code: &str,
        expiration_seconds: u64,
    ) -> AppResult<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))?;

        let key = format!("otp:phone:{}", phone_number);
        conn.set_ex::<_, _, ()>(&key, code, expiration_seconds)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store OTP code in Redis: {}", e)))?;

        Ok(())
    }

    /// Verify and consume an OTP code for a phone number (one-time use)
    pub async fn verify_otp_code(&self, phone_number: &str, code: &str) -> AppResult<bool> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))?;

        let key = format!("otp:phone:{}", phone_number);

        let stored_code: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get OTP code from Redis: {}", e)))?;

        match stored_code {
            Some(stored) if stored == code => {
                let _: () = conn.del(&key).await.map_err(|e| {
                    AppError::Internal(format!("Failed to delete OTP code from Redis: {}", e))
                })?;
                Ok(true)
            }
            Some(_) => Ok(false),  // Code doesn't match
            None => Ok(false),     // Code not found or expired
        }
    }

    /// Revoke a token until its natural expiry (sign-out)
    pub async fn revoke_token(&self, token_digest: &str, expiration_seconds: u64) -> AppResult<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))?;

        let key = format!("revoked:token:{}", token_digest);
        conn.set_ex::<_, _, ()>(&key, "1", expiration_seconds.max(1))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store revoked token in Redis: {}", e)))?;

        Ok(())
    }

    /// Check whether a token has been revoked
    pub async fn is_token_revoked(&self, token_digest: &str) -> AppResult<bool> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))?;

        let key = format!("revoked:token:{}", token_digest);
        let exists: bool = conn
            .exists(&key)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to check revoked token in Redis: {}", e)))?;

        Ok(exists)
    }
}
