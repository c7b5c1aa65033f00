//! Test harness with testcontainers for integration testing.
//!
//! Uses one shared Postgres container across all tests. The container and
//! migrations are initialized on the first test, then reused. Tests isolate
//! themselves by creating their own users and events.

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use ticketing_core::common::{Actor, Role};
use ticketing_core::domains::users::User;
use ticketing_core::kernel::{ServerDeps, TestDependencies};
use ticketing_core::server::build_app;
use tokio::sync::OnceCell;

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    // Keep container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

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
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let organizer = create_user(&ctx.db_pool, Role::Organizer).await;
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    /// Database pool - use this for test fixtures.
    pub db_pool: PgPool,
    /// Mock services wired into `deps`.
    pub mocks: TestDependencies,
    pub deps: ServerDeps,
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

        // Sized for the concurrency tests.
        let db_pool = PgPoolOptions::new()
            .max_connections(32)
            .connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        let mocks = TestDependencies::new();
        let deps = mocks.server_deps(db_pool.clone());

        Ok(Self {
            db_pool,
            mocks,
            deps,
        })
    }

    /// The full HTTP app over this harness's dependencies.
    pub fn router(&self) -> Router {
        build_app(self.deps.clone(), &[])
    }

    /// Bearer token for a fixture user.
    pub fn token_for(&self, user: &User) -> String {
        self.mocks
            .jwt_service
            .create_token(user.id, user.role)
            .expect("token")
    }

    pub fn actor(user: &User) -> Actor {
        Actor::new(user.id, user.role)
    }

    pub fn actor_with_role(user: &User, role: Role) -> Actor {
        Actor::new(user.id, role)
    }
}
