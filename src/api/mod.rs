//! API handlers for ToolShare REST endpoints

pub mod auth;
pub mod health;
pub mod items;
pub mod openapi;
pub mod requests;
pub mod users;

use axum::{
    async_trait,
    extract::{FromRequestParts, Multipart},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{error::AppError, models::profile::UserClaims, AppState};

/// Read the first file field from a multipart upload
pub(crate) async fn read_upload(mut multipart: Multipart) -> Result<(String, Vec<u8>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.file_name().is_some() {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;
            return Ok((filename, bytes.to_vec()));
        }
    }
    Err(AppError::BadRequest("Missing file field".to_string()))
}

fn bearer_token(parts: &Parts) -> Result<String, AppError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

    if !auth_header.starts_with("Bearer ") {
        return Err(AppError::Authentication(
            "Invalid authorization header format".to_string(),
        ));
    }

    Ok(auth_header[7..].to_string())
}

/// Extractor for an authenticated user from a JWT bearer token.
///
/// Rejects tokens that fail validation and tokens revoked by sign-out.
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let claims = UserClaims::from_token(&token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        if state.services.users.is_token_revoked(&token).await? {
            return Err(AppError::Authentication("Token has been revoked".to_string()));
        }

        Ok(AuthenticatedUser(claims))
    }
}

/// Extractor for the raw bearer token, for handlers that act on the token
/// itself (sign-out).
pub struct BearerToken(pub String);

#[async_trait]
impl FromRequestParts<AppState> for BearerToken {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(BearerToken(bearer_token(parts)?))
    }
}
