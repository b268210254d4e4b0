pub mod comment;
pub mod like;
pub mod post;

pub use comment::{Comment, CommentWithAuthor};
pub use like::{LikeEdge, ToggleOutcome};
pub use post::Post;
