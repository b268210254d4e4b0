//! Post operations - feed listing, creation (immediate or deferred),
//! engagement, and owner-gated mutation.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;

use crate::common::{ApiError, ApiResult, IdentityId, PostId};
use crate::domains::posts::commands::PublishScheduledPost;
use crate::domains::posts::data::{PostDetailData, PostSummaryData};
use crate::domains::posts::models::{Comment, CommentWithAuthor, LikeEdge, Post, ToggleOutcome};
use crate::domains::profiles::actions::require_caller_profile;
use crate::domains::profiles::models::Profile;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostInput {
    pub title: String,
    pub content: String,
    /// Optional media reference from an earlier upload
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub scheduled_time: Option<DateTime<Utc>>,
}

/// Partial update; absent fields keep their stored values.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdatePostInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Outcome of a create request.
///
/// Scheduling acknowledges immediately; the post id does not exist until
/// the job materializes it.
#[derive(Debug, Clone)]
pub enum CreatePostOutcome {
    Created(Post),
    Scheduled { scheduled_time: DateTime<Utc> },
}

/// List posts visible to the caller: their own plus their followees',
/// optionally narrowed by author/title substring filters.
pub async fn list_posts(
    caller: IdentityId,
    author: Option<&str>,
    title: Option<&str>,
    pool: &PgPool,
) -> ApiResult<Vec<PostSummaryData>> {
    let viewer = require_caller_profile(caller, pool).await?;
    let posts = Post::visible_to(viewer.id, author, title, pool).await?;

    let mut out = Vec::with_capacity(posts.len());
    for post in posts {
        out.push(PostSummaryData::load(post, pool).await?);
    }
    Ok(out)
}

/// Create a post, immediately or deferred.
///
/// A `scheduled_time` in the past or at now materializes synchronously with
/// `created_at = now`; a future one enqueues a publication job and returns
/// an acknowledgment without a post id.
pub async fn create_post(
    caller: IdentityId,
    input: CreatePostInput,
    deps: &ServerDeps,
) -> ApiResult<CreatePostOutcome> {
    let author = require_caller_profile(caller, &deps.db_pool).await?;

    let title = input.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::Validation("Title must not be empty.".to_string()));
    }

    let now = Utc::now();
    match input.scheduled_time {
        Some(scheduled_time) if scheduled_time > now => {
            let enqueued = deps
                .job_queue
                .schedule(
                    PublishScheduledPost {
                        post_id: PostId::new(),
                        author_id: author.id,
                        title,
                        content: input.content,
                        image: input.image,
                        scheduled_time,
                    },
                    scheduled_time,
                )
                .await?;

            tracing::info!(
                job_id = %enqueued.job_id(),
                author_id = %author.id,
                scheduled_time = %scheduled_time,
                "post publication scheduled"
            );
            Ok(CreatePostOutcome::Scheduled { scheduled_time })
        }
        _ => {
            let post = Post::create(
                author.id,
                &title,
                &input.content,
                input.image.as_deref(),
                now,
                &deps.db_pool,
            )
            .await?;
            Ok(CreatePostOutcome::Created(post))
        }
    }
}

/// Retrieve a single post, gated by the same graph predicate as listing.
///
/// A post outside the caller's graph reads as absent, not forbidden.
pub async fn get_post(
    caller: IdentityId,
    post_id: PostId,
    pool: &PgPool,
) -> ApiResult<PostDetailData> {
    let post = require_visible_post(caller, post_id, pool).await?.0;
    let detail = PostDetailData::load(post, pool).await?;
    Ok(detail)
}

/// Update a post. Author-only.
pub async fn update_post(
    caller: IdentityId,
    post_id: PostId,
    patch: UpdatePostInput,
    pool: &PgPool,
) -> ApiResult<Post> {
    let (post, viewer) = require_visible_post(caller, post_id, pool).await?;
    require_author(&post, &viewer, "You are not authorized to update this post.")?;

    let title = match patch.title {
        Some(title) => {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(ApiError::Validation("Title must not be empty.".to_string()));
            }
            title
        }
        None => post.title.clone(),
    };
    let content = patch.content.unwrap_or(post.content);

    let updated = Post::update_fields(post_id, &title, &content, pool).await?;
    Ok(updated)
}

/// Delete a post. Author-only; comments and likes cascade.
pub async fn delete_post(caller: IdentityId, post_id: PostId, pool: &PgPool) -> ApiResult<()> {
    let (post, viewer) = require_visible_post(caller, post_id, pool).await?;
    require_author(&post, &viewer, "You are not authorized to delete this post.")?;

    Post::delete(post_id, pool).await?;
    tracing::info!(post_id = %post_id, "post deleted");
    Ok(())
}

/// Comment on a post.
///
/// The author is always the authenticated caller; payload-supplied author
/// or post fields are ignored by construction. The returned comment carries
/// the caller's username, already resolved for the visibility check.
pub async fn comment_on_post(
    caller: IdentityId,
    post_id: PostId,
    content: &str,
    pool: &PgPool,
) -> ApiResult<CommentWithAuthor> {
    let (post, viewer) = require_visible_post(caller, post_id, pool).await?;

    let content = content.trim();
    if content.is_empty() {
        return Err(ApiError::Validation(
            "Comment content must not be empty.".to_string(),
        ));
    }

    let comment = Comment::insert(post.id, viewer.id, content, pool).await?;
    Ok(CommentWithAuthor {
        author: viewer.username,
        content: comment.content,
        created_at: comment.created_at,
    })
}

/// Toggle the caller's like on a post.
pub async fn like_unlike(
    caller: IdentityId,
    post_id: PostId,
    pool: &PgPool,
) -> ApiResult<ToggleOutcome> {
    let (post, viewer) = require_visible_post(caller, post_id, pool).await?;
    let outcome = LikeEdge::toggle(viewer.id, post.id, pool).await?;
    Ok(outcome)
}

/// The caller's own liked set, newest first.
pub async fn liked_posts(caller: IdentityId, pool: &PgPool) -> ApiResult<Vec<PostSummaryData>> {
    let viewer = require_caller_profile(caller, pool).await?;
    let posts = Post::liked_by(viewer.id, pool).await?;

    let mut out = Vec::with_capacity(posts.len());
    for post in posts {
        out.push(PostSummaryData::load(post, pool).await?);
    }
    Ok(out)
}

/// Attach an uploaded image to a post. Author-only.
pub async fn upload_post_image(
    caller: IdentityId,
    post_id: PostId,
    bytes: &[u8],
    content_type: &str,
    deps: &ServerDeps,
) -> ApiResult<Post> {
    let (post, viewer) = require_visible_post(caller, post_id, &deps.db_pool).await?;
    require_author(&post, &viewer, "You are not authorized to update this post.")?;

    let reference = deps.media_store.store(bytes, content_type).await?;
    let updated = Post::set_image(post_id, &reference, &deps.db_pool).await?;
    Ok(updated)
}

/// Resolve a post the caller may see. Posts outside the caller's graph are
/// indistinguishable from missing ones.
async fn require_visible_post(
    caller: IdentityId,
    post_id: PostId,
    pool: &PgPool,
) -> ApiResult<(Post, Profile)> {
    let viewer = require_caller_profile(caller, pool).await?;
    let post = Post::find_by_id(post_id, pool)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;

    if !Post::is_visible_to(post.id, viewer.id, pool).await? {
        return Err(ApiError::NotFound("Post"));
    }

    Ok((post, viewer))
}

fn require_author(post: &Post, viewer: &Profile, detail: &str) -> ApiResult<()> {
    if post.author_id != viewer.id {
        return Err(ApiError::Forbidden(detail.to_string()));
    }
    Ok(())
}
