//! Server dependencies (using traits for testability)
//!
//! Central dependency container shared by route handlers, actions and job
//! handlers. External services sit behind trait objects so tests can swap
//! them out.

use std::sync::Arc;

use sqlx::PgPool;

use crate::domains::auth::JwtService;
use crate::kernel::jobs::JobQueue;
use crate::kernel::media::MediaStore;

/// Dependencies accessible to actions and job handlers.
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    /// Storage backend for uploaded images
    pub media_store: Arc<dyn MediaStore>,
    /// Queue for deferred command execution
    pub job_queue: Arc<dyn JobQueue>,
    /// JWT service for token creation and verification
    pub jwt_service: Arc<JwtService>,
}

impl ServerDeps {
    pub fn new(
        db_pool: PgPool,
        media_store: Arc<dyn MediaStore>,
        job_queue: Arc<dyn JobQueue>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            db_pool,
            media_store,
            job_queue,
            jwt_service,
        }
    }
}
