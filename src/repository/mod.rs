//! Repository layer for database operations

pub mod items;
pub mod profiles;
pub mod requests;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub profiles: profiles::ProfilesRepository,
    pub items: items::ItemsRepository,
    pub requests: requests::RequestsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            profiles: profiles::ProfilesRepository::new(pool.clone()),
            items: items::ItemsRepository::new(pool.clone()),
            requests: requests::RequestsRepository::new(pool.clone()),
            pool,
        }
    }
}
