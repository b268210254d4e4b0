use axum::extract::{Extension, Multipart, Path, Query};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::common::{ApiResult, ProfileId};
use crate::domains::profiles::actions;
use crate::domains::profiles::actions::{CreateProfileInput, UpdateProfileInput};
use crate::domains::profiles::data::{ProfileData, ProfileDetailData, ProfileImageData, ProfileSummaryData};
use crate::server::app::AppState;
use crate::server::middleware::CurrentIdentity;
use crate::server::routes::read_upload_field;

#[derive(Deserialize)]
pub struct ProfileListQuery {
    pub username: Option<String>,
}

/// GET /profiles
pub async fn list_profiles_handler(
    Extension(state): Extension<AppState>,
    CurrentIdentity(_caller): CurrentIdentity,
    Query(query): Query<ProfileListQuery>,
) -> ApiResult<Json<Vec<ProfileSummaryData>>> {
    let profiles = actions::list_profiles(query.username.as_deref(), &state.db_pool).await?;
    Ok(Json(profiles))
}

/// POST /profiles
pub async fn create_profile_handler(
    Extension(state): Extension<AppState>,
    CurrentIdentity(caller): CurrentIdentity,
    Json(input): Json<CreateProfileInput>,
) -> ApiResult<(StatusCode, Json<ProfileData>)> {
    let profile = actions::create_profile(caller, input, &state.db_pool).await?;
    Ok((StatusCode::CREATED, Json(ProfileData::from(profile))))
}

/// GET /profiles/:id
pub async fn get_profile_handler(
    Extension(state): Extension<AppState>,
    CurrentIdentity(_caller): CurrentIdentity,
    Path(profile_id): Path<ProfileId>,
) -> ApiResult<Json<ProfileDetailData>> {
    let detail = actions::get_profile(profile_id, &state.db_pool).await?;
    Ok(Json(detail))
}

/// PATCH /profiles/:id
pub async fn update_profile_handler(
    Extension(state): Extension<AppState>,
    CurrentIdentity(caller): CurrentIdentity,
    Path(profile_id): Path<ProfileId>,
    Json(patch): Json<UpdateProfileInput>,
) -> ApiResult<Json<ProfileData>> {
    let profile = actions::update_profile(profile_id, caller, patch, &state.db_pool).await?;
    Ok(Json(ProfileData::from(profile)))
}

/// DELETE /profiles/:id
pub async fn delete_profile_handler(
    Extension(state): Extension<AppState>,
    CurrentIdentity(caller): CurrentIdentity,
    Path(profile_id): Path<ProfileId>,
) -> ApiResult<StatusCode> {
    actions::delete_profile(profile_id, caller, &state.db_pool).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /profiles/:id/follow
pub async fn follow_handler(
    Extension(state): Extension<AppState>,
    CurrentIdentity(caller): CurrentIdentity,
    Path(profile_id): Path<ProfileId>,
) -> ApiResult<Json<Value>> {
    actions::follow(caller, profile_id, &state.db_pool).await?;
    Ok(Json(json!({ "detail": "Following the profile." })))
}

/// POST /profiles/:id/unfollow
pub async fn unfollow_handler(
    Extension(state): Extension<AppState>,
    CurrentIdentity(caller): CurrentIdentity,
    Path(profile_id): Path<ProfileId>,
) -> ApiResult<Json<Value>> {
    actions::unfollow(caller, profile_id, &state.db_pool).await?;
    Ok(Json(json!({ "detail": "Unfollowed the profile." })))
}

/// POST /profiles/:id/upload-image (multipart, field "profile_pic")
pub async fn upload_profile_image_handler(
    Extension(state): Extension<AppState>,
    CurrentIdentity(caller): CurrentIdentity,
    Path(profile_id): Path<ProfileId>,
    multipart: Multipart,
) -> ApiResult<Json<ProfileImageData>> {
    let (bytes, content_type) = read_upload_field(multipart, "profile_pic").await?;
    let profile = actions::upload_profile_image(
        profile_id,
        caller,
        &bytes,
        &content_type,
        &state.server_deps,
    )
    .await?;

    Ok(Json(ProfileImageData::from(profile)))
}
