use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::{CommentId, PostId, ProfileId};

/// Comment model - append-only engagement sub-entity of a post.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: ProfileId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A comment joined with its author's username (detail projections)
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct CommentWithAuthor {
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Insert a new comment. The author is always the authenticated caller.
    pub async fn insert(
        post_id: PostId,
        author_id: ProfileId,
        content: &str,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO comments (id, post_id, author_id, content)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(CommentId::new())
        .bind(post_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Number of comments on a post (live)
    pub async fn count_for_post(post_id: PostId, pool: &PgPool) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM comments WHERE post_id = $1")
                .bind(post_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Comments on a post with author usernames, oldest first
    pub async fn for_post(post_id: PostId, pool: &PgPool) -> Result<Vec<CommentWithAuthor>> {
        sqlx::query_as::<_, CommentWithAuthor>(
            "SELECT a.username AS author, c.content, c.created_at
             FROM comments c
             JOIN profiles a ON a.id = c.author_id
             WHERE c.post_id = $1
             ORDER BY c.created_at ASC",
        )
        .bind(post_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
