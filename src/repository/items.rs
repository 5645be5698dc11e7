//! Items repository for database operations.
//!
//! Every read path computes the displayed status with the same CASE
//! expression over the item's borrow requests; nothing reads a stored
//! status column (there is none).

use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        item::{CreateItem, Item, ItemDetails, ItemQuery, UpdateItem},
        profile::ProfileSummary,
    },
};

/// Derived status of item `i`, mirroring `ItemStatus::derive`:
/// a pending request wins over an approved one.
const STATUS_CASE: &str = r#"
    CASE
        WHEN EXISTS (SELECT 1 FROM borrow_requests r
                     WHERE r.item_id = i.id AND r.status = 'pending') THEN 'requested'
        WHEN EXISTS (SELECT 1 FROM borrow_requests r
                     WHERE r.item_id = i.id AND r.status = 'approved') THEN 'checked_out'
        ELSE 'available'
    END
"#;

fn details_from_row(row: &sqlx::postgres::PgRow) -> Result<ItemDetails, sqlx::Error> {
    Ok(ItemDetails {
        item: Item {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            image_url: row.try_get("image_url")?,
            owner_id: row.try_get("owner_id")?,
            brand: row.try_get("brand")?,
            model: row.try_get("model")?,
            condition: row.try_get("condition")?,
            category: row.try_get("category")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        },
        status: row.try_get("status")?,
        owner: row
            .try_get::<Option<String>, _>("owner_username")
            .map(|username| ProfileSummary {
                id: row.try_get("owner_id").unwrap_or_default(),
                username,
                email: row.try_get("owner_email").unwrap_or(None),
                avatar_url: row.try_get("owner_avatar_url").unwrap_or(None),
            })
            .ok(),
    })
}

#[derive(Clone)]
pub struct ItemsRepository {
    pool: Pool<Postgres>,
}

impl ItemsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get item by ID with owner summary and derived status
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<ItemDetails> {
        let query = format!(
            r#"
            SELECT i.*, {status} AS status,
                   p.username AS owner_username, p.email AS owner_email,
                   p.avatar_url AS owner_avatar_url
            FROM items i
            JOIN profiles p ON p.id = i.owner_id
            WHERE i.id = $1
            "#,
            status = STATUS_CASE
        );

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))?;

        Ok(details_from_row(&row)?)
    }

    /// Search items with optional filters and pagination
    pub async fn search(&self, query: &ItemQuery, search_term: Option<&str>) -> AppResult<(Vec<ItemDetails>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let category = query.category.map(|c| c.as_str().to_string());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM items i
            WHERE ($1::text IS NULL OR i.name ILIKE '%' || $1 || '%'
                                    OR i.description ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR i.category = $2)
              AND ($3::uuid IS NULL OR i.owner_id = $3)
            "#,
        )
        .bind(search_term)
        .bind(&category)
        .bind(query.owner_id)
        .fetch_one(&self.pool)
        .await?;

        let select_query = format!(
            r#"
            SELECT i.*, {status} AS status,
                   p.username AS owner_username, p.email AS owner_email,
                   p.avatar_url AS owner_avatar_url
            FROM items i
            JOIN profiles p ON p.id = i.owner_id
            WHERE ($1::text IS NULL OR i.name ILIKE '%' || $1 || '%'
                                    OR i.description ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR i.category = $2)
              AND ($3::uuid IS NULL OR i.owner_id = $3)
            ORDER BY i.created_at DESC
            LIMIT $4 OFFSET $5
            "#,
            status = STATUS_CASE
        );

        let rows = sqlx::query(&select_query)
            .bind(search_term)
            .bind(&category)
            .bind(query.owner_id)
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            items.push(details_from_row(row)?);
        }

        Ok((items, total))
    }

    /// Create a new item
    pub async fn create(&self, owner_id: Uuid, item: &CreateItem) -> AppResult<Item> {
        let created = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (id, name, description, image_url, owner_id,
                               brand, model, condition, category)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.image_url)
        .bind(owner_id)
        .bind(&item.brand)
        .bind(&item.model)
        .bind(&item.condition)
        .bind(item.category)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update item fields; omitted fields are left unchanged
    pub async fn update(&self, id: Uuid, update: &UpdateItem) -> AppResult<Item> {
        sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                image_url = COALESCE($4, image_url),
                brand = COALESCE($5, brand),
                model = COALESCE($6, model),
                condition = COALESCE($7, condition),
                category = COALESCE($8, category),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.image_url)
        .bind(&update.brand)
        .bind(&update.model)
        .bind(&update.condition)
        .bind(update.category)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))
    }

    /// Set the image URL after an upload
    pub async fn set_image(&self, id: Uuid, image_url: &str) -> AppResult<Item> {
        sqlx::query_as::<_, Item>(
            "UPDATE items SET image_url = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(image_url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))
    }

    /// Delete an item and all its requests in one transaction.
    ///
    /// The caller decides whether active requests block the deletion;
    /// here the cascade is atomic so a failure leaves no orphaned rows.
    pub async fn delete_cascade(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM borrow_requests WHERE item_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Item with id {} not found", id)));
        }

        tx.commit().await?;
        Ok(())
    }

}
