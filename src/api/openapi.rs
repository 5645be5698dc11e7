//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, health, items, requests, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ToolShare API",
        version = "0.3.0",
        description = "Community tool lending REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::signup,
        auth::login,
        auth::send_otp,
        auth::verify_otp,
        auth::logout,
        auth::me,
        auth::update_my_profile,
        auth::upload_avatar,
        // Users
        users::get_user,
        users::get_user_stats,
        // Items
        items::list_items,
        items::get_item,
        items::create_item,
        items::update_item,
        items::delete_item,
        items::upload_item_image,
        // Requests
        requests::create_request,
        requests::list_item_requests,
        requests::active_checkout,
        requests::list_my_requests,
        requests::approve_request,
        requests::reject_request,
        requests::return_request,
        requests::cancel_request,
    ),
    components(
        schemas(
            // Auth
            auth::SignupRequest,
            auth::LoginRequest,
            auth::SendOtpRequest,
            auth::VerifyOtpRequest,
            auth::AuthResponse,
            auth::MessageResponse,
            // Profiles
            crate::models::profile::Profile,
            crate::models::profile::ProfileSummary,
            crate::models::profile::UpdateProfile,
            crate::services::stats::ProfileStats,
            // Items
            crate::models::item::Item,
            crate::models::item::ItemDetails,
            crate::models::item::ItemStatus,
            crate::models::item::Category,
            crate::models::item::CreateItem,
            crate::models::item::UpdateItem,
            // Requests
            crate::models::request::BorrowRequest,
            crate::models::request::RequestStatus,
            crate::models::request::RequestDetails,
            crate::models::request::RequestedItem,
            crate::models::request::RequestWithItem,
            requests::CheckoutResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication and own profile"),
        (name = "users", description = "Public profiles"),
        (name = "items", description = "Item listings"),
        (name = "requests", description = "Borrow request lifecycle")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
