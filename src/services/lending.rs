//! Borrow-request lifecycle service.
//!
//! The single authority for every transition a request can make:
//! create, approve, reject, mark returned, cancel. All call sites go
//! through here; authorization compares profile ids, never names.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult, LendingViolation},
    models::request::{BorrowRequest, RequestDetails, RequestStatus, RequestWithItem},
    repository::Repository,
};

#[derive(Clone)]
pub struct LendingService {
    repository: Repository,
    config: LendingConfig,
}

impl LendingService {
    pub fn new(repository: Repository, config: LendingConfig) -> Self {
        Self { repository, config }
    }

    /// Request to borrow an item.
    ///
    /// Owners cannot request their own items, and a requester can hold at
    /// most one active (pending or approved) request per item. The two
    /// duplicate cases report distinct violations so the caller can tell
    /// "already asked" from "already holding it".
    pub async fn request_item(&self, item_id: Uuid, requester_id: Uuid) -> AppResult<BorrowRequest> {
        let item = self.repository.items.get_by_id(item_id).await?;

        if item.item.owner_id == requester_id {
            return Err(LendingViolation::OwnItemRequest.into());
        }

        if let Some(existing) = self
            .repository
            .requests
            .find_active_for_requester(item_id, requester_id)
            .await?
        {
            return Err(match existing.status {
                RequestStatus::Approved => LendingViolation::AlreadyBorrowed.into(),
                _ => LendingViolation::AlreadyRequested.into(),
            });
        }

        let request = self
            .repository
            .requests
            .insert_pending(item_id, requester_id)
            .await?;

        tracing::info!(request_id = %request.id, item_id = %item_id, "borrow request created");
        Ok(request)
    }

    /// Approve a pending request. Owner only.
    ///
    /// Sets the due date one loan period from now. Fails if the item is
    /// already checked out through another request.
    pub async fn approve(&self, request_id: Uuid, caller_id: Uuid) -> AppResult<BorrowRequest> {
        let (request, owner_id) = self
            .repository
            .requests
            .get_with_item_owner(request_id)
            .await?;

        if owner_id != caller_id {
            return Err(AppError::Authorization(
                "Only the item's owner can approve requests".to_string(),
            ));
        }
        if request.status != RequestStatus::Pending {
            return Err(LendingViolation::RequestNotPending.into());
        }

        let due_date = Utc::now() + Duration::days(self.config.loan_period_days);
        let approved = self.repository.requests.approve(request_id, due_date).await?;

        tracing::info!(request_id = %request_id, due_date = %due_date, "borrow request approved");
        Ok(approved)
    }

    /// Reject a pending request. Owner only. Terminal.
    pub async fn reject(&self, request_id: Uuid, caller_id: Uuid) -> AppResult<BorrowRequest> {
        let (request, owner_id) = self
            .repository
            .requests
            .get_with_item_owner(request_id)
            .await?;

        if owner_id != caller_id {
            return Err(AppError::Authorization(
                "Only the item's owner can reject requests".to_string(),
            ));
        }
        if request.status != RequestStatus::Pending {
            return Err(LendingViolation::RequestNotPending.into());
        }

        let rejected = self.repository.requests.reject(request_id).await?;

        tracing::info!(request_id = %request_id, "borrow request rejected");
        Ok(rejected)
    }

    /// Mark an approved request as returned. Owner only.
    pub async fn mark_returned(&self, request_id: Uuid, caller_id: Uuid) -> AppResult<BorrowRequest> {
        let (request, owner_id) = self
            .repository
            .requests
            .get_with_item_owner(request_id)
            .await?;

        if owner_id != caller_id {
            return Err(AppError::Authorization(
                "Only the item's owner can mark a return".to_string(),
            ));
        }
        match request.status {
            RequestStatus::Approved => {}
            RequestStatus::Returned => return Err(LendingViolation::AlreadyReturned.into()),
            _ => return Err(LendingViolation::RequestNotApproved.into()),
        }

        let returned = self
            .repository
            .requests
            .mark_returned(request_id, Utc::now())
            .await?;

        tracing::info!(request_id = %request_id, "item marked returned");
        Ok(returned)
    }

    /// Cancel a pending request by deleting it. Requester only.
    pub async fn cancel(&self, request_id: Uuid, caller_id: Uuid) -> AppResult<()> {
        let request = self.repository.requests.get_by_id(request_id).await?;

        if request.requester_id != caller_id {
            return Err(AppError::Authorization(
                "Only the requester can cancel a request".to_string(),
            ));
        }
        if request.status != RequestStatus::Pending {
            return Err(LendingViolation::RequestNotPending.into());
        }

        self.repository.requests.delete_pending(request_id).await?;

        tracing::info!(request_id = %request_id, "borrow request cancelled");
        Ok(())
    }

    /// List requests on an item. The owner sees every request; anyone else
    /// sees only their own.
    pub async fn list_item_requests(
        &self,
        item_id: Uuid,
        caller_id: Uuid,
    ) -> AppResult<Vec<RequestDetails>> {
        let item = self.repository.items.get_by_id(item_id).await?;

        let filter = if item.item.owner_id == caller_id {
            None
        } else {
            Some(caller_id)
        };
        self.repository.requests.list_for_item(item_id, filter).await
    }

    /// The item's current approved checkout with borrower details, if any
    pub async fn active_checkout(&self, item_id: Uuid) -> AppResult<Option<RequestDetails>> {
        // Ensure the item exists so a bad id is a 404, not an empty result
        self.repository.items.get_by_id(item_id).await?;
        self.repository.requests.active_checkout(item_id).await
    }

    /// The caller's own requests across all items
    pub async fn list_user_requests(&self, caller_id: Uuid) -> AppResult<Vec<RequestWithItem>> {
        self.repository.requests.list_for_requester(caller_id).await
    }
}
