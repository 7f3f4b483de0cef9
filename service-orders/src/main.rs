// Service Orders - repair shop order management
// Entry point: renders a report of every service order in the data directory

use anyhow::Context;
use service_orders::config::{AppConfig, DEFAULT_REPORT_FILENAME};
use service_orders::database::OrderFilter;
use service_orders::AppState;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "service_orders=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting service orders");

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let config = AppConfig::load(&data_dir)
        .await
        .with_context(|| format!("failed to load configuration from {}", data_dir.display()))?;
    let state = AppState::initialize(config)
        .await
        .context("failed to initialize application")?;

    let orders = state.reports.filter(&OrderFilter::default()).await;
    let path = state
        .reports
        .render_report(orders, DEFAULT_REPORT_FILENAME)
        .await
        .context("failed to generate report")?;

    println!("{}", path.display());
    Ok(())
}
