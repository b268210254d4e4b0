//! Posts domain - posts, engagement edges, the visibility/feed engine, and
//! deferred publication.

pub mod actions;
pub mod commands;
pub mod data;
pub mod jobs;
pub mod models;

pub use commands::{PublishScheduledPost, PUBLISH_SCHEDULED_POST};
pub use data::{CommentData, PostDetailData, PostImageData, PostSummaryData};
pub use jobs::register_post_jobs;
pub use models::{Comment, LikeEdge, Post, ToggleOutcome};
