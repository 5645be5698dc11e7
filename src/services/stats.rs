//! Profile lending statistics service

use uuid::Uuid;

use crate::{error::AppResult, repository::Repository};

/// Lending activity counters shown on a profile page
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct ProfileStats {
    /// Times the user handed one of their items to a borrower
    pub lending_count: i64,
    /// Times the user borrowed someone else's item
    pub borrowing_count: i64,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get lending/borrowing counters for a profile
    pub async fn profile_stats(&self, user_id: Uuid) -> AppResult<ProfileStats> {
        // Verify the profile exists
        self.repository.profiles.get_summary(user_id).await?;

        let lending_count = self.repository.requests.lending_count(user_id).await?;
        let borrowing_count = self.repository.requests.borrowing_count(user_id).await?;

        Ok(ProfileStats {
            lending_count,
            borrowing_count,
        })
    }
}
