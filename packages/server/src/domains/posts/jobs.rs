//! Background job handlers for the posts domain.

use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::domains::posts::commands::{PublishScheduledPost, PUBLISH_SCHEDULED_POST};
use crate::domains::posts::models::Post;
use crate::domains::profiles::models::Profile;
use crate::kernel::jobs::JobRegistry;
use crate::kernel::ServerDeps;

/// Register posts job handlers on the shared registry.
pub fn register_post_jobs(registry: &mut JobRegistry) {
    registry.register::<PublishScheduledPost, _, _>(
        PUBLISH_SCHEDULED_POST,
        |command, deps| async move { publish_scheduled_post(command, &deps).await },
    );
}

/// Materialize a scheduled post.
///
/// The author is re-resolved by id; if the profile was deleted before fire
/// time the job fails without retry ("not found" classifies non-retryable).
/// The post id is fixed in the command, so a redelivered job finds the row
/// already present and does nothing.
pub async fn publish_scheduled_post(
    command: PublishScheduledPost,
    deps: &Arc<ServerDeps>,
) -> Result<()> {
    let author = Profile::find_by_id(command.author_id, &deps.db_pool)
        .await?
        .ok_or_else(|| anyhow!("author profile {} not found", command.author_id))?;

    let inserted = Post::materialize(
        command.post_id,
        author.id,
        &command.title,
        &command.content,
        command.image.as_deref(),
        command.scheduled_time,
        &deps.db_pool,
    )
    .await?;

    match inserted {
        Some(post) => tracing::info!(
            post_id = %post.id,
            author_id = %author.id,
            scheduled_time = %command.scheduled_time,
            "scheduled post materialized"
        ),
        None => tracing::info!(
            post_id = %command.post_id,
            "post already materialized, skipping"
        ),
    }

    Ok(())
}
