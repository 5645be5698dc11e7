//! Profiles repository for database operations

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::profile::{Profile, ProfileSummary, UpdateProfile},
};

/// Map a unique-constraint violation to a conflict with the given message.
fn map_unique(e: sqlx::Error, conflict: &str) -> AppError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            AppError::Conflict(conflict.to_string())
        }
        other => AppError::Database(other),
    }
}

#[derive(Clone)]
pub struct ProfilesRepository {
    pool: Pool<Postgres>,
}

impl ProfilesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get profile by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Profile> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile with id {} not found", id)))
    }

    /// Get short profile by ID
    pub async fn get_summary(&self, id: Uuid) -> AppResult<ProfileSummary> {
        sqlx::query_as::<_, ProfileSummary>(
            "SELECT id, username, email, avatar_url FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile with id {} not found", id)))
    }

    /// Find profile by email
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    /// Find profile by phone number
    pub async fn find_by_phone(&self, phone_number: &str) -> AppResult<Option<Profile>> {
        let profile =
            sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE phone_number = $1")
                .bind(phone_number)
                .fetch_optional(&self.pool)
                .await?;
        Ok(profile)
    }

    /// Create a profile for an email signup
    pub async fn create_with_email(
        &self,
        email: &str,
        password_hash: &str,
        username: Option<&str>,
    ) -> AppResult<Profile> {
        sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, email, password_hash, username)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique(e, "Email or username already registered"))
    }

    /// Create a profile on first phone sign-in
    pub async fn create_with_phone(&self, phone_number: &str) -> AppResult<Profile> {
        sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, phone_number)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(phone_number)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique(e, "Phone number already registered"))
    }

    /// Update profile fields; omitted fields are left unchanged
    pub async fn update(&self, id: Uuid, update: &UpdateProfile) -> AppResult<Profile> {
        sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET username = COALESCE($2, username),
                bio = COALESCE($3, bio),
                avatar_url = COALESCE($4, avatar_url),
                address_street = COALESCE($5, address_street),
                address_city = COALESCE($6, address_city),
                address_state = COALESCE($7, address_state),
                address_zip = COALESCE($8, address_zip),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.username)
        .bind(&update.bio)
        .bind(&update.avatar_url)
        .bind(&update.address_street)
        .bind(&update.address_city)
        .bind(&update.address_state)
        .bind(&update.address_zip)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique(e, "Username already taken"))?
        .ok_or_else(|| AppError::NotFound(format!("Profile with id {} not found", id)))
    }

    /// Set the avatar URL after an upload
    pub async fn set_avatar(&self, id: Uuid, avatar_url: &str) -> AppResult<Profile> {
        sqlx::query_as::<_, Profile>(
            "UPDATE profiles SET avatar_url = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(avatar_url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile with id {} not found", id)))
    }
}
