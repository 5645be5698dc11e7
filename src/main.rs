//! ToolShare Server - Community Lending Library
//!
//! A REST API server for listing, browsing and borrowing neighborhood items.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use toolshare_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("toolshare_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting ToolShare Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Initialize Redis connection
    let redis_service = toolshare_server::services::redis::RedisService::new(&config.redis.url)
        .await
        .expect("Failed to connect to Redis");

    tracing::info!("Connected to Redis");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(
        repository,
        config.auth.clone(),
        config.lending.clone(),
        &config.storage,
        redis_service,
    );

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Uploaded images are served statically from the storage root
    let uploads_root = state.services.storage.root().to_path_buf();
    let upload_limit = state.config.storage.max_upload_bytes;

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/signup", post(api::auth::signup))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/otp/send", post(api::auth::send_otp))
        .route("/auth/otp/verify", post(api::auth::verify_otp))
        .route("/auth/logout", post(api::auth::logout))
        .route("/auth/me", get(api::auth::me))
        .route("/auth/profile", put(api::auth::update_my_profile))
        .route("/auth/profile/avatar", post(api::auth::upload_avatar))
        // Public profiles
        .route("/users/:id", get(api::users::get_user))
        .route("/users/:id/stats", get(api::users::get_user_stats))
        // Items
        .route("/items", get(api::items::list_items))
        .route("/items", post(api::items::create_item))
        .route("/items/:id", get(api::items::get_item))
        .route("/items/:id", put(api::items::update_item))
        .route("/items/:id", delete(api::items::delete_item))
        .route("/items/:id/image", post(api::items::upload_item_image))
        // Borrow requests
        .route("/items/:id/requests", post(api::requests::create_request))
        .route("/items/:id/requests", get(api::requests::list_item_requests))
        .route("/items/:id/checkout", get(api::requests::active_checkout))
        .route("/requests/mine", get(api::requests::list_my_requests))
        .route("/requests/:id/approve", post(api::requests::approve_request))
        .route("/requests/:id/reject", post(api::requests::reject_request))
        .route("/requests/:id/return", post(api::requests::return_request))
        .route("/requests/:id", delete(api::requests::cancel_request))
        .layer(DefaultBodyLimit::max(upload_limit + 64 * 1024))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .nest_service("/uploads", ServeDir::new(uploads_root))
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
