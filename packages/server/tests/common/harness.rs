//! Test harness with testcontainers for integration testing.
//!
//! Uses a shared container across all tests for dramatically improved
//! performance. The container and migrations are initialized once on first
//! test, then reused; fixtures keep tests isolated by using unique data.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use social_core::domains::auth::JwtService;
use social_core::kernel::jobs::{JobQueue, JobRegistry, PostgresJobQueue, SharedJobRegistry};
use social_core::kernel::{FsMediaStore, ServerDeps};

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run (None when an
    // external database is supplied via TEST_DATABASE_URL)
    _postgres: Option<ContainerAsync<Postgres>>,
}

/// Global shared infrastructure - initialized once, reused by all tests.
static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    /// Initialize shared infrastructure (container + migrations).
    async fn init() -> Result<Self> {
        // Respect RUST_LOG; try_init avoids panicking if already set up.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let (db_url, postgres) = match std::env::var("TEST_DATABASE_URL") {
            Ok(url) => (url, None),
            Err(_) => {
                let postgres = Postgres::default()
                    .with_tag("16")
                    .with_cmd(["-c", "max_connections=200"])
                    .start()
                    .await
                    .context("Failed to start Postgres container")?;

                let pg_host = postgres.get_host().await?;
                let pg_port = postgres.get_host_port_ipv4(5432).await?;
                let db_url = format!(
                    "postgresql://postgres:postgres@{}:{}/postgres",
                    pg_host, pg_port
                );
                (db_url, Some(postgres))
            }
        };

        // Run migrations once on the shared database
        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Test harness that manages test infrastructure.
///
/// Each test gets a fresh pool and dependency container but reuses the same
/// database container.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    /// Database pool - use this for test fixtures.
    pub db_pool: PgPool,
    /// Full dependency container, wired like the server builds it.
    pub deps: Arc<ServerDeps>,
    /// The queue backing `deps.job_queue`.
    pub job_queue: Arc<dyn JobQueue>,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        // Database pool is automatically dropped
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let db_pool = PgPool::connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        let media_root =
            std::env::temp_dir().join(format!("media-test-{}", uuid::Uuid::new_v4()));
        let media_store = Arc::new(FsMediaStore::new(media_root));

        let job_queue: Arc<dyn JobQueue> = Arc::new(PostgresJobQueue::new(db_pool.clone()));
        let jwt_service = Arc::new(JwtService::new("test_secret", "test_issuer".to_string()));

        let deps = Arc::new(ServerDeps::new(
            db_pool.clone(),
            media_store,
            job_queue.clone(),
            jwt_service,
        ));

        Ok(Self {
            db_pool,
            deps,
            job_queue,
        })
    }

    /// A registry with all domain job handlers registered, as at startup.
    pub fn job_registry(&self) -> SharedJobRegistry {
        let mut registry = JobRegistry::new();
        social_core::domains::posts::jobs::register_post_jobs(&mut registry);
        Arc::new(registry)
    }
}
