//! Profiles domain - the profile directory and the follow graph.

pub mod actions;
pub mod data;
pub mod models;

pub use data::{ProfileData, ProfileDetailData, ProfileImageData, ProfileSummaryData};
pub use models::{FollowEdge, Profile};
