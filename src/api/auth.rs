//! Authentication and own-profile endpoints

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::profile::{Profile, UpdateProfile},
    services::storage::AVATARS_BUCKET,
};

use super::{AuthenticatedUser, BearerToken};

/// Signup request
#[derive(Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    /// Email address
    #[validate(email)]
    pub email: String,
    /// Password (at least 8 characters)
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    /// Optional display name
    #[validate(length(min = 1, max = 50))]
    pub username: Option<String>,
}

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Email address
    pub email: String,
    /// Password
    pub password: String,
}

/// Send a one-time sign-in code
#[derive(Deserialize, ToSchema)]
pub struct SendOtpRequest {
    /// Phone number with country code
    pub phone_number: String,
}

/// Verify a one-time sign-in code
#[derive(Deserialize, ToSchema)]
pub struct VerifyOtpRequest {
    /// Phone number with country code
    pub phone_number: String,
    /// 6-digit code
    pub code: String,
}

/// Successful authentication response
#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    /// JWT bearer token
    pub token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// The signed-in profile
    pub profile: Profile,
}

/// Status-only response
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    /// Status message
    pub message: String,
}

impl AuthResponse {
    fn new(token: String, profile: Profile) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            profile,
        }
    }
}

/// Register with email and password
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid email or password"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn signup(
    State(state): State<crate::AppState>,
    Json(request): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (token, profile) = state
        .services
        .users
        .signup(&request.email, &request.password, request.username.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse::new(token, profile))))
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (token, profile) = state
        .services
        .users
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(AuthResponse::new(token, profile)))
}

/// Request a one-time sign-in code by SMS
#[utoipa::path(
    post,
    path = "/auth/otp/send",
    tag = "auth",
    request_body = SendOtpRequest,
    responses(
        (status = 200, description = "Code sent", body = MessageResponse),
        (status = 400, description = "Invalid phone number")
    )
)]
pub async fn send_otp(
    State(state): State<crate::AppState>,
    Json(request): Json<SendOtpRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.services.users.send_otp(&request.phone_number).await?;

    Ok(Json(MessageResponse {
        message: "Verification code sent".to_string(),
    }))
}

/// Verify a one-time code and sign in
#[utoipa::path(
    post,
    path = "/auth/otp/verify",
    tag = "auth",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid or expired code")
    )
)]
pub async fn verify_otp(
    State(state): State<crate::AppState>,
    Json(request): Json<VerifyOtpRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (token, profile) = state
        .services
        .users
        .verify_otp(&request.phone_number, &request.code)
        .await?;

    Ok(Json(AuthResponse::new(token, profile)))
}

/// Sign out, revoking the presented token
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Signed out"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn logout(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    BearerToken(token): BearerToken,
) -> AppResult<StatusCode> {
    state.services.users.logout(&token, &claims).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get the signed-in profile
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current profile", body = Profile),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Profile>> {
    let profile = state.services.users.get_profile(claims.user_id).await?;
    Ok(Json(profile))
}

/// Update the signed-in profile
#[utoipa::path(
    put,
    path = "/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = Profile),
        (status = 401, description = "Not authenticated"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn update_my_profile(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(update): Json<UpdateProfile>,
) -> AppResult<Json<Profile>> {
    update
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let profile = state
        .services
        .users
        .update_profile(claims.user_id, &update)
        .await?;
    Ok(Json(profile))
}

/// Upload an avatar image (multipart field `file`)
#[utoipa::path(
    post,
    path = "/auth/profile/avatar",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Avatar updated", body = Profile),
        (status = 400, description = "Unsupported or oversized file"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn upload_avatar(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    multipart: Multipart,
) -> AppResult<Json<Profile>> {
    let (filename, bytes) = super::read_upload(multipart).await?;

    let url = state
        .services
        .storage
        .store(AVATARS_BUCKET, &filename, &bytes)
        .await?;

    let profile = state.services.users.set_avatar(claims.user_id, &url).await?;
    Ok(Json(profile))
}
