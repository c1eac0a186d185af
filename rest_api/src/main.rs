use anyhow::Context;
use tokio::sync::oneshot;
use tracing::info;
use tracing_subscriber::EnvFilter;

use store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = rest_api::load_api_config()?;
    let store = Store::open(&config.database_path)
        .context("failed to open the record database")?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received ctrl-c, shutting down");
            let _ = shutdown_tx.send(());
        }
    });

    rest_api::start_server(config, store, shutdown_rx).await
}
