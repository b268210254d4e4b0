use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::{IdentityId, ProfileId};

/// Profile model - SQL persistence layer.
///
/// A profile is the social identity other users see, distinct from the
/// login identity. Usernames are unique and non-empty; each identity owns
/// at most one profile.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Profile {
    pub id: ProfileId,
    pub identity_id: IdentityId,
    pub username: String,
    pub status: Option<String>,
    pub bio: String,
    pub profile_pic: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Find profile by ID
    pub async fn find_by_id(id: ProfileId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Find the profile owned by an identity
    pub async fn find_by_identity(identity_id: IdentityId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM profiles WHERE identity_id = $1")
            .bind(identity_id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Find profile by exact username (case-insensitive)
    pub async fn find_by_username(username: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM profiles WHERE lower(username) = lower($1)")
            .bind(username)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Search profiles by username substring (case-insensitive, distinct).
    ///
    /// A `None` filter lists everything, newest first.
    pub async fn search(username: Option<&str>, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT DISTINCT * FROM profiles
             WHERE $1::text IS NULL OR username ILIKE '%' || $1 || '%'
             ORDER BY created_at DESC",
        )
        .bind(username)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Insert new profile
    pub async fn insert(&self, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO profiles (id, identity_id, username, status, bio, profile_pic)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(self.id)
        .bind(self.identity_id)
        .bind(&self.username)
        .bind(&self.status)
        .bind(&self.bio)
        .bind(&self.profile_pic)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Update mutable fields, returning the stored row
    pub async fn update_fields(
        id: ProfileId,
        username: &str,
        status: Option<&str>,
        bio: &str,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "UPDATE profiles SET username = $2, status = $3, bio = $4 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(username)
        .bind(status)
        .bind(bio)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Set the profile picture reference
    pub async fn set_profile_pic(id: ProfileId, reference: &str, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "UPDATE profiles SET profile_pic = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(reference)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Delete a profile. Posts, comments, likes and follow edges cascade.
    pub async fn delete(id: ProfileId, pool: &PgPool) -> Result<()> {
        sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
