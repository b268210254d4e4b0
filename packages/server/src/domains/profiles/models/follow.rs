//! The follow graph as an explicit edge set.
//!
//! A `FollowEdge` is a directed `(follower, followee)` pair; the table's
//! primary key makes the set membership atomic, so concurrent inserts or
//! removes of the same edge serialize in the database and can never
//! duplicate or corrupt an edge. Counts are computed live from the set,
//! never cached.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::ProfileId;

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct FollowEdge {
    pub follower_id: ProfileId,
    pub followee_id: ProfileId,
    pub created_at: DateTime<Utc>,
}

impl FollowEdge {
    /// Insert an edge. Returns `false` if it already existed.
    pub async fn insert(follower: ProfileId, followee: ProfileId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO follow_edges (follower_id, followee_id)
             VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(follower)
        .bind(followee)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove an edge. Returns `false` if it did not exist.
    pub async fn remove(follower: ProfileId, followee: ProfileId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM follow_edges WHERE follower_id = $1 AND followee_id = $2",
        )
        .bind(follower)
        .bind(followee)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Membership test
    pub async fn contains(follower: ProfileId, followee: ProfileId, pool: &PgPool) -> Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM follow_edges WHERE follower_id = $1 AND followee_id = $2)",
        )
        .bind(follower)
        .bind(followee)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Number of profiles following `profile` (live cardinality)
    pub async fn follower_count(profile: ProfileId, pool: &PgPool) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM follow_edges WHERE followee_id = $1")
                .bind(profile)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Number of profiles `profile` follows (live cardinality)
    pub async fn following_count(profile: ProfileId, pool: &PgPool) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM follow_edges WHERE follower_id = $1")
                .bind(profile)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Usernames of the profiles following `profile`
    pub async fn follower_usernames(profile: ProfileId, pool: &PgPool) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT p.username
             FROM follow_edges e
             JOIN profiles p ON p.id = e.follower_id
             WHERE e.followee_id = $1
             ORDER BY p.username",
        )
        .bind(profile)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(username,)| username).collect())
    }

    /// Usernames of the profiles `profile` follows
    pub async fn following_usernames(profile: ProfileId, pool: &PgPool) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT p.username
             FROM follow_edges e
             JOIN profiles p ON p.id = e.followee_id
             WHERE e.follower_id = $1
             ORDER BY p.username",
        )
        .bind(profile)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(username,)| username).collect())
    }
}
