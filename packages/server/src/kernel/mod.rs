pub mod deps;
pub mod jobs;
pub mod media;

pub use deps::ServerDeps;
pub use media::{FsMediaStore, MediaStore};
