//! Public profile endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::profile::ProfileSummary,
    services::stats::ProfileStats,
};

/// Get a user's public profile
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = Uuid, Path, description = "Profile ID")
    ),
    responses(
        (status = 200, description = "Public profile", body = ProfileSummary),
        (status = 404, description = "Profile not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ProfileSummary>> {
    let profile = state.services.users.get_public_profile(id).await?;
    Ok(Json(profile))
}

/// Get a user's lending activity counters
#[utoipa::path(
    get,
    path = "/users/{id}/stats",
    tag = "users",
    params(
        ("id" = Uuid, Path, description = "Profile ID")
    ),
    responses(
        (status = 200, description = "Lending and borrowing counts", body = ProfileStats),
        (status = 404, description = "Profile not found")
    )
)]
pub async fn get_user_stats(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ProfileStats>> {
    let stats = state.services.stats.profile_stats(id).await?;
    Ok(Json(stats))
}
