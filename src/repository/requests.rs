//! Borrow requests repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, LendingViolation},
    models::{
        profile::ProfileSummary,
        request::{BorrowRequest, RequestDetails, RequestStatus, RequestWithItem, RequestedItem},
    },
};

fn request_from_row(row: &sqlx::postgres::PgRow) -> Result<BorrowRequest, sqlx::Error> {
    Ok(BorrowRequest {
        id: row.try_get("id")?,
        item_id: row.try_get("item_id")?,
        requester_id: row.try_get("requester_id")?,
        status: row.try_get("status")?,
        due_date: row.try_get("due_date")?,
        return_date: row.try_get("return_date")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn requester_from_row(row: &sqlx::postgres::PgRow) -> Option<ProfileSummary> {
    Some(ProfileSummary {
        id: row.try_get("requester_id").ok()?,
        username: row.try_get("requester_username").ok()?,
        email: row.try_get("requester_email").ok()?,
        avatar_url: row.try_get("requester_avatar_url").ok()?,
    })
}

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get request by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BorrowRequest> {
        sqlx::query_as::<_, BorrowRequest>("SELECT * FROM borrow_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request with id {} not found", id)))
    }

    /// Get request by ID together with the owner of the requested item
    pub async fn get_with_item_owner(&self, id: Uuid) -> AppResult<(BorrowRequest, Uuid)> {
        let row = sqlx::query(
            r#"
            SELECT r.*, i.owner_id AS item_owner_id
            FROM borrow_requests r
            JOIN items i ON i.id = r.item_id
            WHERE r.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Request with id {} not found", id)))?;

        let request = request_from_row(&row)?;
        let owner_id: Uuid = row.try_get("item_owner_id")?;
        Ok((request, owner_id))
    }

    /// Find the requester's active (pending or approved) request for an item
    pub async fn find_active_for_requester(
        &self,
        item_id: Uuid,
        requester_id: Uuid,
    ) -> AppResult<Option<BorrowRequest>> {
        let request = sqlx::query_as::<_, BorrowRequest>(
            r#"
            SELECT * FROM borrow_requests
            WHERE item_id = $1 AND requester_id = $2
              AND status IN ('pending', 'approved')
            "#,
        )
        .bind(item_id)
        .bind(requester_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    /// Insert a new pending request.
    ///
    /// The partial unique index on active requests turns a concurrent
    /// duplicate insert into the same typed conflict the precheck reports.
    pub async fn insert_pending(
        &self,
        item_id: Uuid,
        requester_id: Uuid,
    ) -> AppResult<BorrowRequest> {
        sqlx::query_as::<_, BorrowRequest>(
            r#"
            INSERT INTO borrow_requests (id, item_id, requester_id, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(item_id)
        .bind(requester_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Lending(LendingViolation::AlreadyRequested)
            }
            other => AppError::Database(other),
        })
    }

    /// Approve a pending request, guarding against a concurrent checkout.
    ///
    /// The row is locked, re-checked for pending status, and the item is
    /// re-checked for another approved request, all in one transaction.
    pub async fn approve(&self, id: Uuid, due_date: DateTime<Utc>) -> AppResult<BorrowRequest> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, BorrowRequest>(
            "SELECT * FROM borrow_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Request with id {} not found", id)))?;

        if request.status != RequestStatus::Pending {
            return Err(LendingViolation::RequestNotPending.into());
        }

        let item_checked_out: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM borrow_requests
                WHERE item_id = $1 AND status = 'approved' AND id != $2
            )
            "#,
        )
        .bind(request.item_id)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if item_checked_out {
            return Err(LendingViolation::ItemCheckedOut.into());
        }

        // The partial unique index on approved requests backstops a race
        // between two concurrent approvals for the same item.
        let approved = sqlx::query_as::<_, BorrowRequest>(
            r#"
            UPDATE borrow_requests
            SET status = 'approved', due_date = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Lending(LendingViolation::ItemCheckedOut)
            }
            other => AppError::Database(other),
        })?;

        tx.commit().await?;
        Ok(approved)
    }

    /// Reject a pending request
    pub async fn reject(&self, id: Uuid) -> AppResult<BorrowRequest> {
        sqlx::query_as::<_, BorrowRequest>(
            r#"
            UPDATE borrow_requests
            SET status = 'rejected', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| LendingViolation::RequestNotPending.into())
    }

    /// Mark an approved request as returned
    pub async fn mark_returned(
        &self,
        id: Uuid,
        return_date: DateTime<Utc>,
    ) -> AppResult<BorrowRequest> {
        sqlx::query_as::<_, BorrowRequest>(
            r#"
            UPDATE borrow_requests
            SET status = 'returned', return_date = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'approved'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(return_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| LendingViolation::RequestNotApproved.into())
    }

    /// Delete a pending request (cancellation)
    pub async fn delete_pending(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM borrow_requests WHERE id = $1 AND status = 'pending'")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(LendingViolation::RequestNotPending.into());
        }
        Ok(())
    }

    /// List requests for an item, newest first, with requester summaries
    pub async fn list_for_item(
        &self,
        item_id: Uuid,
        requester_id: Option<Uuid>,
    ) -> AppResult<Vec<RequestDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT r.*, p.username AS requester_username, p.email AS requester_email,
                   p.avatar_url AS requester_avatar_url
            FROM borrow_requests r
            JOIN profiles p ON p.id = r.requester_id
            WHERE r.item_id = $1
              AND ($2::uuid IS NULL OR r.requester_id = $2)
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(item_id)
        .bind(requester_id)
        .fetch_all(&self.pool)
        .await?;

        let mut requests = Vec::with_capacity(rows.len());
        for row in &rows {
            requests.push(RequestDetails {
                request: request_from_row(row)?,
                requester: requester_from_row(row),
            });
        }
        Ok(requests)
    }

    /// The item's single approved request with borrower summary, if any
    pub async fn active_checkout(&self, item_id: Uuid) -> AppResult<Option<RequestDetails>> {
        let row = sqlx::query(
            r#"
            SELECT r.*, p.username AS requester_username, p.email AS requester_email,
                   p.avatar_url AS requester_avatar_url
            FROM borrow_requests r
            JOIN profiles p ON p.id = r.requester_id
            WHERE r.item_id = $1 AND r.status = 'approved'
            "#,
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(RequestDetails {
                request: request_from_row(&row)?,
                requester: requester_from_row(&row),
            })),
            None => Ok(None),
        }
    }

    /// List a user's own requests across all items, newest first
    pub async fn list_for_requester(&self, requester_id: Uuid) -> AppResult<Vec<RequestWithItem>> {
        let rows = sqlx::query(
            r#"
            SELECT r.*, i.name AS item_name, i.image_url AS item_image_url,
                   i.owner_id AS item_owner_id,
                   p.username AS owner_username, p.email AS owner_email,
                   p.avatar_url AS owner_avatar_url
            FROM borrow_requests r
            JOIN items i ON i.id = r.item_id
            JOIN profiles p ON p.id = i.owner_id
            WHERE r.requester_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(requester_id)
        .fetch_all(&self.pool)
        .await?;

        let mut requests = Vec::with_capacity(rows.len());
        for row in &rows {
            let request = request_from_row(row)?;
            let item = Some(RequestedItem {
                id: request.item_id,
                name: row.try_get("item_name")?,
                image_url: row.try_get("item_image_url")?,
                owner: Some(ProfileSummary {
                    id: row.try_get("item_owner_id")?,
                    username: row.try_get("owner_username")?,
                    email: row.try_get("owner_email")?,
                    avatar_url: row.try_get("owner_avatar_url")?,
                }),
            });
            requests.push(RequestWithItem { request, item });
        }
        Ok(requests)
    }

    /// True if the item has any pending or approved request
    pub async fn has_active_for_item(&self, item_id: Uuid) -> AppResult<bool> {
        let active: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM borrow_requests
                WHERE item_id = $1 AND status IN ('pending', 'approved')
            )
            "#,
        )
        .bind(item_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(active)
    }

    /// Times the user handed an item of theirs to a borrower
    pub async fn lending_count(&self, user_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT get_user_lending_count($1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Times the user borrowed someone else's item
    pub async fn borrowing_count(&self, user_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT get_user_borrowing_count($1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

}
