//! Borrow-request lifecycle endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::request::{BorrowRequest, RequestDetails, RequestWithItem},
};

use super::AuthenticatedUser;

/// The item's current checkout, if any
#[derive(Serialize, ToSchema)]
pub struct CheckoutResponse {
    /// The approved request currently holding the item
    pub checkout: Option<RequestDetails>,
}

/// Request to borrow an item
#[utoipa::path(
    post,
    path = "/items/{id}/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 201, description = "Request created", body = BorrowRequest),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Own item, already requested, or already borrowed")
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(item_id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<BorrowRequest>)> {
    let request = state
        .services
        .lending
        .request_item(item_id, claims.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// List requests for an item
///
/// The owner sees every request; any other caller sees only their own.
#[utoipa::path(
    get,
    path = "/items/{id}/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Requests for the item", body = Vec<RequestDetails>),
        (status = 404, description = "Item not found")
    )
)]
pub async fn list_item_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<Vec<RequestDetails>>> {
    let requests = state
        .services
        .lending
        .list_item_requests(item_id, claims.user_id)
        .await?;
    Ok(Json(requests))
}

/// Get the item's active checkout, if any
#[utoipa::path(
    get,
    path = "/items/{id}/checkout",
    tag = "requests",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Active checkout (null when available)", body = CheckoutResponse),
        (status = 404, description = "Item not found")
    )
)]
pub async fn active_checkout(
    State(state): State<crate::AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<CheckoutResponse>> {
    let checkout = state.services.lending.active_checkout(item_id).await?;
    Ok(Json(CheckoutResponse { checkout }))
}

/// List the caller's own requests across all items
#[utoipa::path(
    get,
    path = "/requests/mine",
    tag = "requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller's requests", body = Vec<RequestWithItem>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_my_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<RequestWithItem>>> {
    let requests = state.services.lending.list_user_requests(claims.user_id).await?;
    Ok(Json(requests))
}

/// Approve a pending request (item owner only)
#[utoipa::path(
    post,
    path = "/requests/{id}/approve",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request approved with due date", body = BorrowRequest),
        (status = 403, description = "Not the item's owner"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Not pending, or item already checked out")
    )
)]
pub async fn approve_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BorrowRequest>> {
    let request = state.services.lending.approve(id, claims.user_id).await?;
    Ok(Json(request))
}

/// Reject a pending request (item owner only)
#[utoipa::path(
    post,
    path = "/requests/{id}/reject",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request rejected", body = BorrowRequest),
        (status = 403, description = "Not the item's owner"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not pending")
    )
)]
pub async fn reject_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BorrowRequest>> {
    let request = state.services.lending.reject(id, claims.user_id).await?;
    Ok(Json(request))
}

/// Mark an approved request as returned (item owner only)
#[utoipa::path(
    post,
    path = "/requests/{id}/return",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Item returned", body = BorrowRequest),
        (status = 403, description = "Not the item's owner"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not an active checkout")
    )
)]
pub async fn return_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BorrowRequest>> {
    let request = state.services.lending.mark_returned(id, claims.user_id).await?;
    Ok(Json(request))
}

/// Cancel a pending request (requester only)
#[utoipa::path(
    delete,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    responses(
        (status = 204, description = "Request cancelled"),
        (status = 403, description = "Not the requester"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not pending")
    )
)]
pub async fn cancel_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.lending.cancel(id, claims.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
