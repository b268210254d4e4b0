//! Application setup and server configuration.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::auth::JwtService;
use crate::domains::posts::jobs::register_post_jobs;
use crate::kernel::jobs::{JobQueue, JobRegistry, JobRunner, PostgresJobQueue};
use crate::kernel::{FsMediaStore, ServerDeps};
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{
    comment_handler, create_post_handler, create_profile_handler, delete_post_handler,
    delete_profile_handler, follow_handler, get_post_handler, get_profile_handler,
    health_handler, like_unlike_handler, liked_posts_handler, list_posts_handler,
    list_profiles_handler, register_handler, serve_media_handler, token_handler,
    unfollow_handler, update_post_handler, update_profile_handler, upload_post_image_handler,
    upload_profile_image_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub server_deps: Arc<ServerDeps>,
    pub jwt_service: Arc<JwtService>,
}

/// Build the Axum application router.
///
/// Also spawns the background job runner that publishes scheduled posts.
pub fn build_app(
    pool: PgPool,
    jwt_secret: &str,
    jwt_issuer: String,
    media_root: PathBuf,
) -> Router {
    let jwt_service = Arc::new(JwtService::new(jwt_secret, jwt_issuer));
    let media_store = Arc::new(FsMediaStore::new(media_root));

    let job_queue: Arc<dyn JobQueue> = Arc::new(PostgresJobQueue::new(pool.clone()));
    let job_queue_for_runner = job_queue.clone();

    let server_deps = Arc::new(ServerDeps::new(
        pool.clone(),
        media_store,
        job_queue,
        jwt_service.clone(),
    ));

    // Register all job handlers
    let mut job_registry = JobRegistry::new();
    register_post_jobs(&mut job_registry);
    let job_registry = Arc::new(job_registry);

    // Spawn the job runner as a background task
    let runner = JobRunner::new(job_queue_for_runner, job_registry, server_deps.clone());
    tokio::spawn(async move {
        if let Err(e) = runner.run().await {
            tracing::error!(error = %e, "Job runner exited with error");
        }
    });

    let app_state = AppState {
        db_pool: pool,
        server_deps,
        jwt_service: jwt_service.clone(),
    };

    // CORS configuration - allow any origin for development
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let jwt_service_for_middleware = jwt_service.clone();

    Router::new()
        // Auth
        .route("/auth/register", post(register_handler))
        .route("/auth/token", post(token_handler))
        // Profiles
        .route("/profiles", get(list_profiles_handler).post(create_profile_handler))
        .route(
            "/profiles/:id",
            get(get_profile_handler)
                .patch(update_profile_handler)
                .delete(delete_profile_handler),
        )
        .route("/profiles/:id/follow", post(follow_handler))
        .route("/profiles/:id/unfollow", post(unfollow_handler))
        .route("/profiles/:id/upload-image", post(upload_profile_image_handler))
        // Posts
        .route("/posts", get(list_posts_handler).post(create_post_handler))
        .route("/posts/liked", get(liked_posts_handler))
        .route(
            "/posts/:id",
            get(get_post_handler)
                .patch(update_post_handler)
                .delete(delete_post_handler),
        )
        .route("/posts/:id/comment", post(comment_handler))
        .route("/posts/:id/like-unlike", post(like_unlike_handler))
        .route("/posts/:id/upload-image", post(upload_post_image_handler))
        // Media
        .route("/media/:reference", get(serve_media_handler))
        // Health check (no auth)
        .route("/health", get(health_handler))
        // 10 MiB cap for image uploads
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service_for_middleware.clone(), req, next)
        }))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
