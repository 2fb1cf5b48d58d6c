use anyhow::Result;
use tokio::sync::watch;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

mod database;
mod ebay_client;
mod models;
mod notifier;
mod poller;

use common::database::{DatabaseConfig, init_pool, run_migrations};
use common::mailer::{Mailer, MailerConfig};
use database::Database;
use ebay_client::{EbayClient, EbayConfig};
use notifier::{AlertNotifier, NotifierConfig};
use poller::Poller;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_max_level(Level::INFO)
        .init();

    info!("Starting alert service");

    // Initialize database connection
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    run_migrations(&pool).await?;
    let store = Database::new(pool);

    // Initialize outbound channels
    let mailer = Mailer::new(MailerConfig::from_env()?);
    let notifier = AlertNotifier::new(mailer, NotifierConfig::from_env()?);
    let source = EbayClient::new(EbayConfig::from_env()?);

    let poller = Poller::new(store, source, notifier);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move { poller.run(shutdown_rx).await });

    info!("Alert service started successfully");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down alert service");
    shutdown_tx.send(true)?;
    handle.await?;

    Ok(())
}
