use association_sync::adapters::in_memory::in_memory_transport::InMemoryTransport;
use association_sync::config::SyncConfig;
use association_sync::shell::workers::{WorkerStores, spawn_workers};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = SyncConfig::from_env()?;

    // In-memory deps for now
    let transport = Arc::new(InMemoryTransport::new());
    let stores = WorkerStores::in_memory();

    let workers = spawn_workers(&config, transport, &stores);
    tracing::info!(
        topics = ?workers.topics(),
        batch_limit = config.batch_limit,
        max_attempts = config.max_attempts,
        "association sync worker running"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    workers.shutdown().await;
    Ok(())
}
