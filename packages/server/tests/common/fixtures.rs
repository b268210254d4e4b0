//! Test fixtures for creating test data.
//!
//! Fixtures go through the real actions so test data carries the same
//! invariants as production data. The database container is shared across
//! tests, so every fixture salts names with a unique suffix.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use social_core::common::IdentityId;
use social_core::domains::auth::actions as auth_actions;
use social_core::domains::posts::models::Post;
use social_core::domains::profiles::actions::{self as profile_actions, CreateProfileInput};
use social_core::domains::profiles::models::Profile;

/// Short unique suffix for names that must not collide across tests.
pub fn unique(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &suffix[..12])
}

/// Register an identity with a valid password.
pub async fn create_identity(pool: &PgPool, label: &str) -> Result<IdentityId> {
    let email = format!("{}@example.com", unique(label));
    let identity = auth_actions::register(&email, "password123", pool).await?;
    Ok(identity.id)
}

/// Register an identity and give it a profile.
pub async fn create_user(pool: &PgPool, label: &str) -> Result<(IdentityId, Profile)> {
    let identity_id = create_identity(pool, label).await?;
    let profile = profile_actions::create_profile(
        identity_id,
        CreateProfileInput {
            username: unique(label),
            status: None,
            bio: Some(format!("{} bio", label)),
        },
        pool,
    )
    .await?;

    Ok((identity_id, profile))
}

/// Create a published post directly via the model (no scheduling involved).
pub async fn create_post_by(
    pool: &PgPool,
    author: &Profile,
    title: &str,
    content: &str,
) -> Result<Post> {
    create_post_at(pool, author, title, content, chrono::Utc::now()).await
}

/// Create a published post with an explicit creation time, for tests that
/// assert ordering and cannot rely on back-to-back clock reads differing.
pub async fn create_post_at(
    pool: &PgPool,
    author: &Profile,
    title: &str,
    content: &str,
    created_at: chrono::DateTime<chrono::Utc>,
) -> Result<Post> {
    let post = Post::create(author.id, title, content, None, created_at, pool).await?;
    Ok(post)
}
