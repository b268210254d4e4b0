// Social Media API - core
//
// Backend for profiles, the follow graph, posts with media attachments,
// likes, comments, and deferred post publication. Feed listings are scoped
// to the viewer's social graph; scheduled posts materialize through a
// Postgres-backed job queue.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
