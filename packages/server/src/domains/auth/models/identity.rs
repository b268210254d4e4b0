use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::IdentityId;

/// Login identity - SQL persistence layer.
///
/// Identities are distinct from profiles: an identity authenticates a
/// caller, a profile is the social entity other users see. Exactly one
/// profile may exist per identity.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Identity {
    pub id: IdentityId,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Find identity by ID
    pub async fn find_by_id(id: IdentityId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM identities WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Find identity by email (case-insensitive)
    pub async fn find_by_email(email: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM identities WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Insert new identity
    pub async fn insert(id: IdentityId, email: &str, password_hash: &str, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO identities (id, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(id)
        .bind(email)
        .bind(password_hash)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
