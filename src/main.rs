//! Chazu backend bootstrap.
//!
//! Opens the slot database, seeds first-run data and logs today's status.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chazu_backend::config::Config;
use chazu_backend::services::OrderLedger;
use chazu_backend::Services;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Chazu backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Poll interval: {:?}", config.poll_interval);

    let services = Services::open(&config).await?;

    let today = OrderLedger::today();
    let sheet = services.daily_operations(today).await?;
    let missing: Vec<&str> = sheet.missing().map(|loc| loc.name.as_str()).collect();
    tracing::info!(
        date = %today,
        locations = sheet.statuses.len(),
        missing = missing.len(),
        "Daily status: missing {:?}",
        missing
    );

    if let Some((alert, progress)) = services.alert_progress().await?.into_iter().next() {
        tracing::info!(
            alert_id = %alert.id,
            responded = alert.responded_count(),
            "Latest alert {:?} at {:.0}% response",
            alert.text,
            progress * 100.0
        );
    }

    let overview = services.overview().await?;
    tracing::info!(
        orders = overview.total_orders,
        locations = overview.location_count,
        "Storage ready"
    );

    Ok(())
}
