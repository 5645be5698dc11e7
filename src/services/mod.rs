//! Business logic services

pub mod catalog;
pub mod lending;
pub mod redis;
pub mod stats;
pub mod storage;
pub mod users;

use crate::{
    config::{AuthConfig, LendingConfig, StorageConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub lending: lending::LendingService,
    pub stats: stats::StatsService,
    pub storage: storage::StorageService,
    pub redis: redis::RedisService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        lending_config: LendingConfig,
        storage_config: &StorageConfig,
        redis_service: redis::RedisService,
    ) -> Self {
        Self {
            users: users::UsersService::new(
                repository.clone(),
                auth_config,
                redis_service.clone(),
            ),
            catalog: catalog::CatalogService::new(repository.clone()),
            lending: lending::LendingService::new(repository.clone(), lending_config),
            stats: stats::StatsService::new(repository.clone()),
            storage: storage::StorageService::new(storage_config),
            redis: redis_service,
            repository,
        }
    }

    /// Database pool, for readiness probes
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.repository.pool
    }
}
