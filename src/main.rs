//! Kickabout
//!
//! Main application entry point

use std::time::Duration;
use anyhow::Context;
use tracing::{info, warn};

use kickabout::{
    config::Settings,
    database::{connection::{create_pool, run_migrations, DatabaseConfig}, DatabaseService},
    services::ServiceFactory,
    utils::logging,
};

const NOTIFICATION_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate().context("invalid configuration")?;

    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", kickabout::info());

    info!("Connecting to database...");
    let pool = create_pool(&DatabaseConfig::from(&settings.database)).await?;
    run_migrations(&pool).await?;

    let database_service = DatabaseService::new(pool.clone(), settings.hosting);

    info!("Initializing services...");
    let services = ServiceFactory::new(&settings, database_service).await?;
    info!(
        sports = services.catalog.sports().len(),
        max_hosting = settings.hosting.max_count,
        "Services ready"
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutdown requested");

    if !services.notification_service.shutdown(NOTIFICATION_DRAIN_TIMEOUT).await {
        warn!("Some push notifications were abandoned");
    }
    pool.close().await;

    info!("Kickabout stopped");
    Ok(())
}
