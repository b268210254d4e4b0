pub mod post;

pub use post::{CommentData, PostDetailData, PostImageData, PostSummaryData};
