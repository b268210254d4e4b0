pub mod follow;
pub mod profile;

pub use follow::FollowEdge;
pub use profile::Profile;
