//! API projections of a post.
//!
//! Fixed per endpoint: list endpoints return `PostSummaryData` (author
//! username plus live engagement counts), retrieval returns
//! `PostDetailData` (full comment and liker lists).

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::domains::posts::models::{Comment, CommentWithAuthor, LikeEdge, Post};
use crate::domains::profiles::models::Profile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummaryData {
    pub id: String,
    pub author: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub image: Option<String>,
    pub comments: i64,
    pub likes: i64,
}

impl PostSummaryData {
    pub async fn load(post: Post, pool: &PgPool) -> Result<Self> {
        let author = Profile::find_by_id(post.author_id, pool)
            .await?
            .ok_or_else(|| anyhow!("author {} missing for post {}", post.author_id, post.id))?;
        let comments = Comment::count_for_post(post.id, pool).await?;
        let likes = LikeEdge::count_for_post(post.id, pool).await?;

        Ok(Self {
            id: post.id.to_string(),
            author: author.username,
            title: post.title,
            content: post.content,
            created_at: post.created_at,
            image: post.image,
            comments,
            likes,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentData {
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<CommentWithAuthor> for CommentData {
    fn from(comment: CommentWithAuthor) -> Self {
        Self {
            author: comment.author,
            content: comment.content,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailData {
    pub id: String,
    pub author: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub image: Option<String>,
    pub comments: Vec<CommentData>,
    pub likes: Vec<String>,
}

impl PostDetailData {
    pub async fn load(post: Post, pool: &PgPool) -> Result<Self> {
        let author = Profile::find_by_id(post.author_id, pool)
            .await?
            .ok_or_else(|| anyhow!("author {} missing for post {}", post.author_id, post.id))?;
        let comments = Comment::for_post(post.id, pool)
            .await?
            .into_iter()
            .map(CommentData::from)
            .collect();
        let likes = LikeEdge::liker_usernames(post.id, pool).await?;

        Ok(Self {
            id: post.id.to_string(),
            author: author.username,
            title: post.title,
            content: post.content,
            created_at: post.created_at,
            image: post.image,
            comments,
            likes,
        })
    }
}

/// Image-upload projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostImageData {
    pub id: String,
    pub image: Option<String>,
}

impl From<Post> for PostImageData {
    fn from(post: Post) -> Self {
        Self {
            id: post.id.to_string(),
            image: post.image,
        }
    }
}
