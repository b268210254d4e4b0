//! The like graph as an explicit edge set.
//!
//! A `LikeEdge` is set membership of `(profile, post)`. The table's primary
//! key serializes concurrent toggles on the same pair; a toggle is one set
//! mutation and its outcome always names the state it landed in.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::{PostId, ProfileId};

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct LikeEdge {
    pub profile_id: ProfileId,
    pub post_id: PostId,
    pub created_at: DateTime<Utc>,
}

/// Which state a toggle landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Liked,
    Unliked,
}

impl ToggleOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToggleOutcome::Liked => "liked",
            ToggleOutcome::Unliked => "unliked",
        }
    }
}

impl LikeEdge {
    /// Toggle membership of `(profile, post)`.
    ///
    /// Inserts the edge if absent (`Liked`), removes it if present
    /// (`Unliked`). Repeated calls strictly alternate.
    pub async fn toggle(
        profile: ProfileId,
        post: PostId,
        pool: &PgPool,
    ) -> Result<ToggleOutcome> {
        let inserted = sqlx::query(
            "INSERT INTO like_edges (profile_id, post_id)
             VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(profile)
        .bind(post)
        .execute(pool)
        .await?;

        if inserted.rows_affected() > 0 {
            return Ok(ToggleOutcome::Liked);
        }

        sqlx::query("DELETE FROM like_edges WHERE profile_id = $1 AND post_id = $2")
            .bind(profile)
            .bind(post)
            .execute(pool)
            .await?;

        Ok(ToggleOutcome::Unliked)
    }

    /// Membership test
    pub async fn contains(profile: ProfileId, post: PostId, pool: &PgPool) -> Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM like_edges WHERE profile_id = $1 AND post_id = $2)",
        )
        .bind(profile)
        .bind(post)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Number of likes on a post (live)
    pub async fn count_for_post(post: PostId, pool: &PgPool) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM like_edges WHERE post_id = $1")
                .bind(post)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Usernames of profiles that liked a post
    pub async fn liker_usernames(post: PostId, pool: &PgPool) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT p.username
             FROM like_edges l
             JOIN profiles p ON p.id = l.profile_id
             WHERE l.post_id = $1
             ORDER BY p.username",
        )
        .bind(post)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(username,)| username).collect())
    }
}
