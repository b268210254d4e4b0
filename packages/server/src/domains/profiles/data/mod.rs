pub mod profile;

pub use profile::{ProfileData, ProfileDetailData, ProfileImageData, ProfileSummaryData};
