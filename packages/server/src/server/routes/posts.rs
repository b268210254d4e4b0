use axum::extract::{Extension, Multipart, Path, Query};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::common::{ApiResult, PostId};
use crate::domains::posts::actions;
use crate::domains::posts::actions::{CreatePostInput, CreatePostOutcome, UpdatePostInput};
use crate::domains::posts::data::{CommentData, PostDetailData, PostImageData, PostSummaryData};
use crate::server::app::AppState;
use crate::server::middleware::CurrentIdentity;
use crate::server::routes::read_upload_field;

#[derive(Deserialize)]
pub struct PostListQuery {
    pub author: Option<String>,
    pub title: Option<String>,
}

/// GET /posts
pub async fn list_posts_handler(
    Extension(state): Extension<AppState>,
    CurrentIdentity(caller): CurrentIdentity,
    Query(query): Query<PostListQuery>,
) -> ApiResult<Json<Vec<PostSummaryData>>> {
    let posts = actions::list_posts(
        caller,
        query.author.as_deref(),
        query.title.as_deref(),
        &state.db_pool,
    )
    .await?;
    Ok(Json(posts))
}

/// POST /posts
///
/// A future `scheduled_time` defers publication; the response acknowledges
/// the schedule instead of returning a post body.
pub async fn create_post_handler(
    Extension(state): Extension<AppState>,
    CurrentIdentity(caller): CurrentIdentity,
    Json(input): Json<CreatePostInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let outcome = actions::create_post(caller, input, &state.server_deps).await?;

    let body = match outcome {
        CreatePostOutcome::Created(post) => {
            let summary = PostSummaryData::load(post, &state.db_pool).await?;
            serde_json::to_value(summary).map_err(anyhow::Error::from)?
        }
        CreatePostOutcome::Scheduled { scheduled_time } => json!({
            "detail": "Post scheduled.",
            "scheduled_time": scheduled_time,
        }),
    };

    Ok((StatusCode::CREATED, Json(body)))
}

/// GET /posts/liked
pub async fn liked_posts_handler(
    Extension(state): Extension<AppState>,
    CurrentIdentity(caller): CurrentIdentity,
) -> ApiResult<Json<Vec<PostSummaryData>>> {
    let posts = actions::liked_posts(caller, &state.db_pool).await?;
    Ok(Json(posts))
}

/// GET /posts/:id
pub async fn get_post_handler(
    Extension(state): Extension<AppState>,
    CurrentIdentity(caller): CurrentIdentity,
    Path(post_id): Path<PostId>,
) -> ApiResult<Json<PostDetailData>> {
    let detail = actions::get_post(caller, post_id, &state.db_pool).await?;
    Ok(Json(detail))
}

/// PATCH /posts/:id
pub async fn update_post_handler(
    Extension(state): Extension<AppState>,
    CurrentIdentity(caller): CurrentIdentity,
    Path(post_id): Path<PostId>,
    Json(patch): Json<UpdatePostInput>,
) -> ApiResult<Json<PostSummaryData>> {
    let post = actions::update_post(caller, post_id, patch, &state.db_pool).await?;
    let summary = PostSummaryData::load(post, &state.db_pool).await?;
    Ok(Json(summary))
}

/// DELETE /posts/:id
pub async fn delete_post_handler(
    Extension(state): Extension<AppState>,
    CurrentIdentity(caller): CurrentIdentity,
    Path(post_id): Path<PostId>,
) -> ApiResult<StatusCode> {
    actions::delete_post(caller, post_id, &state.db_pool).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

/// POST /posts/:id/comment
pub async fn comment_handler(
    Extension(state): Extension<AppState>,
    CurrentIdentity(caller): CurrentIdentity,
    Path(post_id): Path<PostId>,
    Json(body): Json<CommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentData>)> {
    let comment =
        actions::comment_on_post(caller, post_id, &body.content, &state.db_pool).await?;

    Ok((StatusCode::CREATED, Json(CommentData::from(comment))))
}

/// POST /posts/:id/like-unlike
pub async fn like_unlike_handler(
    Extension(state): Extension<AppState>,
    CurrentIdentity(caller): CurrentIdentity,
    Path(post_id): Path<PostId>,
) -> ApiResult<Json<Value>> {
    let outcome = actions::like_unlike(caller, post_id, &state.db_pool).await?;
    Ok(Json(json!({ "detail": outcome.as_str() })))
}

/// POST /posts/:id/upload-image (multipart, field "image")
pub async fn upload_post_image_handler(
    Extension(state): Extension<AppState>,
    CurrentIdentity(caller): CurrentIdentity,
    Path(post_id): Path<PostId>,
    multipart: Multipart,
) -> ApiResult<Json<PostImageData>> {
    let (bytes, content_type) = read_upload_field(multipart, "image").await?;
    let post =
        actions::upload_post_image(caller, post_id, &bytes, &content_type, &state.server_deps)
            .await?;

    Ok(Json(PostImageData::from(post)))
}
