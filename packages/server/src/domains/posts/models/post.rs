use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::{PostId, ProfileId};

/// Post model - SQL persistence layer.
///
/// `created_at` is supplied by the caller rather than defaulted by the
/// database: scheduled posts materialize with their requested publish time
/// so the feed stays chronologically ordered.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Post {
    pub id: PostId,
    pub author_id: ProfileId,
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Insert a post with an explicit `created_at`
    pub async fn create(
        author_id: ProfileId,
        title: &str,
        content: &str,
        image: Option<&str>,
        created_at: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO posts (id, author_id, title, content, image, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(PostId::new())
        .bind(author_id)
        .bind(title)
        .bind(content)
        .bind(image)
        .bind(created_at)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Insert a post with a caller-supplied id.
    ///
    /// Returns `None` when a row with that id already exists. Publication
    /// jobs are delivered at least once; inserting onto a fixed id collapses
    /// redeliveries instead of duplicating the post.
    pub async fn materialize(
        id: PostId,
        author_id: ProfileId,
        title: &str,
        content: &str,
        image: Option<&str>,
        created_at: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO posts (id, author_id, title, content, image, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (id) DO NOTHING
             RETURNING *",
        )
        .bind(id)
        .bind(author_id)
        .bind(title)
        .bind(content)
        .bind(image)
        .bind(created_at)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Find post by ID
    pub async fn find_by_id(id: PostId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Feed listing for a viewer.
    ///
    /// Access control fused with query shaping: the allowed-author set is
    /// `{viewer} ∪ followees(viewer)`, optional author/title filters are
    /// case-insensitive substring matches ANDed together, results are
    /// distinct by id and ordered by `created_at` descending. A post from a
    /// non-followed author is simply absent, not an authorization error.
    pub async fn visible_to(
        viewer: ProfileId,
        author: Option<&str>,
        title: Option<&str>,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT DISTINCT p.*
             FROM posts p
             JOIN profiles a ON a.id = p.author_id
             WHERE (p.author_id = $1
                    OR p.author_id IN (SELECT followee_id FROM follow_edges WHERE follower_id = $1))
               AND ($2::text IS NULL OR a.username ILIKE '%' || $2 || '%')
               AND ($3::text IS NULL OR p.title ILIKE '%' || $3 || '%')
             ORDER BY p.created_at DESC",
        )
        .bind(viewer)
        .bind(author)
        .bind(title)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Same graph predicate as `visible_to`, for single-post retrieval
    pub async fn is_visible_to(id: PostId, viewer: ProfileId, pool: &PgPool) -> Result<bool> {
        let (visible,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(
                 SELECT 1 FROM posts p
                 WHERE p.id = $1
                   AND (p.author_id = $2
                        OR p.author_id IN (SELECT followee_id FROM follow_edges WHERE follower_id = $2))
             )",
        )
        .bind(id)
        .bind(viewer)
        .fetch_one(pool)
        .await?;

        Ok(visible)
    }

    /// Posts the viewer has liked, newest first
    pub async fn liked_by(viewer: ProfileId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT p.*
             FROM posts p
             JOIN like_edges l ON l.post_id = p.id
             WHERE l.profile_id = $1
             ORDER BY p.created_at DESC",
        )
        .bind(viewer)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Update title and content, returning the stored row
    pub async fn update_fields(
        id: PostId,
        title: &str,
        content: &str,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "UPDATE posts SET title = $2, content = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(title)
        .bind(content)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Set the image reference
    pub async fn set_image(id: PostId, reference: &str, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>("UPDATE posts SET image = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(reference)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    /// Delete a post. Comments and likes cascade.
    pub async fn delete(id: PostId, pool: &PgPool) -> Result<()> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
