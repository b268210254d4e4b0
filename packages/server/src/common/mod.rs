// Common types and utilities shared across the application

pub mod entity_ids;
pub mod error;
pub mod id;

pub use entity_ids::*;
pub use error::{ApiError, ApiResult};
pub use id::Id;
