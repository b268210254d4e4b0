//! Profile directory operations.
//!
//! The caller's identity is threaded explicitly into every operation; reads
//! are open to any authenticated caller, mutations are owner-only.

use serde::Deserialize;
use sqlx::PgPool;

use crate::common::{ApiError, ApiResult, IdentityId, ProfileId};
use crate::domains::profiles::data::{ProfileDetailData, ProfileSummaryData};
use crate::domains::profiles::models::{FollowEdge, Profile};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProfileInput {
    pub username: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Partial update; absent fields keep their stored values.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateProfileInput {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Create the caller's profile.
///
/// Fails with `Conflict` if the username is taken or the identity already
/// has a profile.
pub async fn create_profile(
    caller: IdentityId,
    input: CreateProfileInput,
    pool: &PgPool,
) -> ApiResult<Profile> {
    let username = input.username.trim().to_string();
    if username.is_empty() {
        return Err(ApiError::Validation("Username must not be empty.".to_string()));
    }

    if Profile::find_by_identity(caller, pool).await?.is_some() {
        return Err(ApiError::Conflict(
            "This identity already has a profile.".to_string(),
        ));
    }
    if Profile::find_by_username(&username, pool).await?.is_some() {
        return Err(ApiError::Conflict("This username is already taken.".to_string()));
    }

    let profile = Profile {
        id: ProfileId::new(),
        identity_id: caller,
        username,
        status: input.status,
        bio: input.bio.unwrap_or_default(),
        profile_pic: None,
        created_at: chrono::Utc::now(),
    };
    let profile = profile.insert(pool).await?;

    tracing::info!(profile_id = %profile.id, username = %profile.username, "profile created");
    Ok(profile)
}

/// Update a profile. Owner-only.
pub async fn update_profile(
    profile_id: ProfileId,
    caller: IdentityId,
    patch: UpdateProfileInput,
    pool: &PgPool,
) -> ApiResult<Profile> {
    let profile = require_profile(profile_id, pool).await?;
    require_owner(&profile, caller, "You are not authorized to update this profile.")?;

    let username = match patch.username {
        Some(username) => {
            let username = username.trim().to_string();
            if username.is_empty() {
                return Err(ApiError::Validation("Username must not be empty.".to_string()));
            }
            if let Some(existing) = Profile::find_by_username(&username, pool).await? {
                if existing.id != profile.id {
                    return Err(ApiError::Conflict(
                        "This username is already taken.".to_string(),
                    ));
                }
            }
            username
        }
        None => profile.username.clone(),
    };
    let status = patch.status.or(profile.status);
    let bio = patch.bio.unwrap_or(profile.bio);

    let updated = Profile::update_fields(profile_id, &username, status.as_deref(), &bio, pool).await?;
    Ok(updated)
}

/// Delete a profile. Owner-only; owned posts, comments, likes and follow
/// edges cascade.
pub async fn delete_profile(
    profile_id: ProfileId,
    caller: IdentityId,
    pool: &PgPool,
) -> ApiResult<()> {
    let profile = require_profile(profile_id, pool).await?;
    require_owner(&profile, caller, "You are not authorized to delete this profile.")?;

    Profile::delete(profile_id, pool).await?;
    tracing::info!(profile_id = %profile_id, "profile deleted");
    Ok(())
}

/// Follow a profile.
///
/// Self-follow and duplicate follow fail with `InvalidOperation` so the
/// caller always learns whether an edge was inserted.
pub async fn follow(caller: IdentityId, target: ProfileId, pool: &PgPool) -> ApiResult<()> {
    let caller_profile = require_caller_profile(caller, pool).await?;
    let target_profile = require_profile(target, pool).await?;

    if caller_profile.id == target_profile.id {
        return Err(ApiError::InvalidOperation(
            "Unable to follow the profile.".to_string(),
        ));
    }

    let inserted = FollowEdge::insert(caller_profile.id, target_profile.id, pool).await?;
    if !inserted {
        return Err(ApiError::InvalidOperation(
            "Unable to follow the profile.".to_string(),
        ));
    }

    Ok(())
}

/// Unfollow a profile.
///
/// Fails with `InvalidOperation` if the edge does not exist (or the target
/// is the caller itself, which never has an edge).
pub async fn unfollow(caller: IdentityId, target: ProfileId, pool: &PgPool) -> ApiResult<()> {
    let caller_profile = require_caller_profile(caller, pool).await?;
    let target_profile = require_profile(target, pool).await?;

    let removed = FollowEdge::remove(caller_profile.id, target_profile.id, pool).await?;
    if !removed {
        return Err(ApiError::InvalidOperation(
            "Unable to unfollow the profile.".to_string(),
        ));
    }

    Ok(())
}

/// List profiles, optionally filtered by username substring.
pub async fn list_profiles(
    username: Option<&str>,
    pool: &PgPool,
) -> ApiResult<Vec<ProfileSummaryData>> {
    let profiles = Profile::search(username, pool).await?;

    let mut out = Vec::with_capacity(profiles.len());
    for profile in profiles {
        out.push(ProfileSummaryData::load(profile, pool).await?);
    }
    Ok(out)
}

/// Retrieve a single profile with follower/following username lists.
pub async fn get_profile(profile_id: ProfileId, pool: &PgPool) -> ApiResult<ProfileDetailData> {
    let profile = require_profile(profile_id, pool).await?;
    let detail = ProfileDetailData::load(profile, pool).await?;
    Ok(detail)
}

/// Attach an uploaded image to a profile. Owner-only.
pub async fn upload_profile_image(
    profile_id: ProfileId,
    caller: IdentityId,
    bytes: &[u8],
    content_type: &str,
    deps: &ServerDeps,
) -> ApiResult<Profile> {
    let profile = require_profile(profile_id, &deps.db_pool).await?;
    require_owner(&profile, caller, "You are not authorized to update this profile.")?;

    let reference = deps.media_store.store(bytes, content_type).await?;
    let updated = Profile::set_profile_pic(profile_id, &reference, &deps.db_pool).await?;
    Ok(updated)
}

/// Resolve the caller's own profile; social operations require one.
pub async fn require_caller_profile(caller: IdentityId, pool: &PgPool) -> ApiResult<Profile> {
    Profile::find_by_identity(caller, pool)
        .await?
        .ok_or_else(|| ApiError::Validation("You must create a profile first.".to_string()))
}

async fn require_profile(profile_id: ProfileId, pool: &PgPool) -> ApiResult<Profile> {
    Profile::find_by_id(profile_id, pool)
        .await?
        .ok_or(ApiError::NotFound("Profile"))
}

fn require_owner(profile: &Profile, caller: IdentityId, detail: &str) -> ApiResult<()> {
    if profile.identity_id != caller {
        return Err(ApiError::Forbidden(detail.to_string()));
    }
    Ok(())
}
