//! Posts domain commands - payloads handed across the async boundary.
//!
//! Payloads carry ids only; entities are re-resolved inside the handler at
//! fire time so a deleted author is observed, not a stale snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{PostId, ProfileId};
use crate::kernel::jobs::CommandMeta;

/// Job type string for deferred post publication.
pub const PUBLISH_SCHEDULED_POST: &str = "publish_scheduled_post";

/// Materialize a scheduled post at (or after) `scheduled_time`.
///
/// The created post's `created_at` is `scheduled_time`, not the fire time,
/// so the feed keeps its chronological ordering. `post_id` is fixed at
/// enqueue time: a redelivered job inserts onto the same id, so at-least-once
/// execution still materializes at most one post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishScheduledPost {
    pub post_id: PostId,
    pub author_id: ProfileId,
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub scheduled_time: DateTime<Utc>,
}

impl CommandMeta for PublishScheduledPost {
    fn command_type(&self) -> &'static str {
        PUBLISH_SCHEDULED_POST
    }

    fn max_retries(&self) -> i32 {
        3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_meta() {
        let command = PublishScheduledPost {
            post_id: PostId::new(),
            author_id: ProfileId::new(),
            title: "Future".to_string(),
            content: "later".to_string(),
            image: None,
            scheduled_time: Utc::now(),
        };

        assert_eq!(command.command_type(), "publish_scheduled_post");
        assert_eq!(command.max_retries(), 3);
        assert!(command.idempotency_key().is_none());
    }

    #[test]
    fn serde_roundtrip() {
        let command = PublishScheduledPost {
            post_id: PostId::new(),
            author_id: ProfileId::new(),
            title: "Future".to_string(),
            content: "later".to_string(),
            image: Some("abc.jpg".to_string()),
            scheduled_time: Utc::now(),
        };

        let value = serde_json::to_value(&command).unwrap();
        let back: PublishScheduledPost = serde_json::from_value(value).unwrap();
        assert_eq!(back.post_id, command.post_id);
        assert_eq!(back.author_id, command.author_id);
        assert_eq!(back.scheduled_time, command.scheduled_time);
    }
}
