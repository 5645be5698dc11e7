//! Item (listing) endpoints

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::item::{CreateItem, Item, ItemDetails, ItemQuery, UpdateItem},
    services::storage::ITEM_IMAGES_BUCKET,
};

use super::AuthenticatedUser;

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// List of items
    pub items: Vec<T>,
    /// Total number of items
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Items per page
    pub per_page: i64,
}

/// List items with search and pagination
#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    params(ItemQuery),
    responses(
        (status = 200, description = "List of items", body = PaginatedResponse<ItemDetails>)
    )
)]
pub async fn list_items(
    State(state): State<crate::AppState>,
    Query(query): Query<ItemQuery>,
) -> AppResult<Json<PaginatedResponse<ItemDetails>>> {
    let (items, total) = state.services.catalog.list_items(&query).await?;

    Ok(Json(PaginatedResponse {
        items,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Get item details by ID
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "items",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item details", body = ItemDetails),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_item(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ItemDetails>> {
    let item = state.services.catalog.get_item(id).await?;
    Ok(Json(item))
}

/// List a new item owned by the caller
#[utoipa::path(
    post,
    path = "/items",
    tag = "items",
    security(("bearer_auth" = [])),
    request_body = CreateItem,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_item(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(item): Json<CreateItem>,
) -> AppResult<(StatusCode, Json<Item>)> {
    let created = state
        .services
        .catalog
        .create_item(claims.user_id, item)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an existing item (owner only)
#[utoipa::path(
    put,
    path = "/items/{id}",
    tag = "items",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    request_body = UpdateItem,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn update_item(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(update): Json<UpdateItem>,
) -> AppResult<Json<Item>> {
    let updated = state
        .services
        .catalog
        .update_item(id, claims.user_id, update)
        .await?;
    Ok(Json(updated))
}

#[derive(Deserialize)]
pub struct DeleteItemParams {
    pub force: Option<bool>,
}

/// Delete an item (owner only)
///
/// Refused while the item has pending or approved requests unless
/// `force=true`, which removes the requests together with the item.
#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "items",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Item ID"),
        ("force" = Option<bool>, Query, description = "Delete even with active requests")
    ),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Item has active requests")
    )
)]
pub async fn delete_item(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteItemParams>,
) -> AppResult<StatusCode> {
    state
        .services
        .catalog
        .delete_item(id, claims.user_id, params.force.unwrap_or(false))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Upload an item photo (owner only, multipart field `file`)
#[utoipa::path(
    post,
    path = "/items/{id}/image",
    tag = "items",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Image attached", body = Item),
        (status = 400, description = "Unsupported or oversized file"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn upload_item_image(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<Item>> {
    let (filename, bytes) = super::read_upload(multipart).await?;

    let url = state
        .services
        .storage
        .store(ITEM_IMAGES_BUCKET, &filename, &bytes)
        .await?;

    let item = state
        .services
        .catalog
        .set_item_image(id, claims.user_id, &url)
        .await?;
    Ok(Json(item))
}
