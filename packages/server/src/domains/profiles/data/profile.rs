//! API projections of a profile.
//!
//! Each endpoint uses one fixed projection, chosen by the router: list
//! endpoints return `ProfileSummaryData` (live follower/following counts),
//! retrieval returns `ProfileDetailData` (follower/following username
//! lists), image upload returns `ProfileImageData`.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::domains::profiles::models::{FollowEdge, Profile};

/// Base representation (create/update responses)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileData {
    pub id: String,
    pub username: String,
    pub status: Option<String>,
    pub bio: String,
    pub profile_pic: Option<String>,
}

impl From<Profile> for ProfileData {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id.to_string(),
            username: profile.username,
            status: profile.status,
            bio: profile.bio,
            profile_pic: profile.profile_pic,
        }
    }
}

/// List projection with live edge-set cardinalities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSummaryData {
    #[serde(flatten)]
    pub profile: ProfileData,
    pub followers: i64,
    pub following: i64,
}

impl ProfileSummaryData {
    pub async fn load(profile: Profile, pool: &PgPool) -> Result<Self> {
        let followers = FollowEdge::follower_count(profile.id, pool).await?;
        let following = FollowEdge::following_count(profile.id, pool).await?;

        Ok(Self {
            profile: profile.into(),
            followers,
            following,
        })
    }
}

/// Detail projection with follower/following username lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDetailData {
    #[serde(flatten)]
    pub profile: ProfileData,
    pub followers: Vec<String>,
    pub following: Vec<String>,
}

impl ProfileDetailData {
    pub async fn load(profile: Profile, pool: &PgPool) -> Result<Self> {
        let followers = FollowEdge::follower_usernames(profile.id, pool).await?;
        let following = FollowEdge::following_usernames(profile.id, pool).await?;

        Ok(Self {
            profile: profile.into(),
            followers,
            following,
        })
    }
}

/// Image-upload projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileImageData {
    pub id: String,
    pub profile_pic: Option<String>,
}

impl From<Profile> for ProfileImageData {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id.to_string(),
            profile_pic: profile.profile_pic,
        }
    }
}
