//! ToolShare Community Lending Server
//!
//! A REST JSON API for a neighborhood lending library: users list physical
//! items, browse other people's listings, request to borrow, and owners
//! approve, reject and track returns.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
