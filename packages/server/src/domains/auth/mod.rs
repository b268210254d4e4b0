//! Auth domain - identity provider collaborator.
//!
//! Responsibilities:
//! - Identity registration (email + password)
//! - Bearer token issuance and verification (JWT)

pub mod actions;
pub mod jwt;
pub mod models;

pub use jwt::{Claims, JwtService};
pub use models::Identity;
