//! Test database helper utilities
//!
//! One PostgreSQL per `TestDatabase`: `TEST_DATABASE_URL` when set (CI),
//! otherwise a throwaway testcontainers instance that lives as long as the helper.

use sqlx::PgPool;
use std::sync::Once;
use testcontainers::{runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres as PostgresImage;
use kickabout::config::HostingConfig;
use kickabout::database::DatabaseService;

static INIT: Once = Once::new();

pub struct TestDatabase {
    pub pool: PgPool,
    pub database_url: String,
    _container: Option<ContainerAsync<PostgresImage>>,
}

impl TestDatabase {
    /// Start (or reuse) a database, apply migrations and wipe previous test data
    pub async fn new() -> Self {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_test_writer()
                .try_init();
        });

        let (database_url, container) = match std::env::var("TEST_DATABASE_URL") {
            Ok(url) => (url, None),
            Err(_) => {
                let container = PostgresImage::default()
                    .with_db_name("test_kickabout")
                    .with_user("test_user")
                    .with_password("test_password")
                    .with_tag("16-alpine")
                    .start()
                    .await
                    .expect("Failed to start postgres container");
                let host = container.get_host().await.expect("Failed to get container host");
                let port = container.get_host_port_ipv4(5432).await.expect("Failed to get port");

                let url = format!(
                    "postgresql://test_user:test_password@{}:{}/test_kickabout",
                    host, port
                );
                (url, Some(container))
            }
        };

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(20)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let db = Self {
            pool,
            database_url,
            _container: container,
        };
        db.cleanup().await.expect("Failed to clean test database");
        db
    }

    /// Repositories over this database with the given hosting quota
    pub fn service(&self, hosting: HostingConfig) -> DatabaseService {
        DatabaseService::new(self.pool.clone(), hosting)
    }

    /// Repositories with a quota generous enough to never get in the way
    pub fn unrestricted_service(&self) -> DatabaseService {
        self.service(HostingConfig {
            max_count: 1_000,
            refresh_period_minutes: 1_440,
        })
    }

    /// Clean all test data from the database
    pub async fn cleanup(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "TRUNCATE push_tokens, user_hosting_config, event_participants, events, user_profiles, users \
             RESTART IDENTITY CASCADE"
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Stored participant counter, for checking it against the participation rows
    pub async fn participant_count(&self, event_id: i64) -> (i32, i64) {
        sqlx::query_as(
            r#"
            SELECT e.participant_count, (SELECT COUNT(*) FROM event_participants ep WHERE ep.event_id = e.id)
            FROM events e WHERE e.id = $1
            "#
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await
        .expect("Failed to read participant count")
    }
}
