mod logging;

use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::Parser;
use foodstore_core::{
    catalog::{init_catalog, init_catalog_with_snapshot, services::store::StoreService},
    transport::http::{DEFAULT_HTTP_PORT, router},
};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "foodstore")]
#[command(about = "Food nutrition catalog HTTP server")]
struct FoodstoreServerArgs {
    /// Server address to bind to
    #[arg(short, long, env = "FOODSTORE_ADDRESS", default_value = "0.0.0.0")]
    address: String,

    /// Server port to bind to
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_HTTP_PORT)]
    port: u16,

    /// JSON snapshot the catalog is loaded from and saved to
    #[arg(short, long, env = "FOODSTORE_DATA_FILE", default_value = "food-nutrition-db.json")]
    data_file: PathBuf,

    /// Keep the catalog in memory only, ignoring the data file
    #[arg(long, default_value_t = false)]
    in_memory: bool,

    /// Upper bound on each storage call in milliseconds, 0 disables it
    #[arg(long, env = "FOODSTORE_STORAGE_TIMEOUT_MS", default_value_t = 5000)]
    storage_timeout_ms: u64,
}

impl FoodstoreServerArgs {
    fn storage_timeout(&self) -> Option<Duration> {
        (self.storage_timeout_ms > 0).then(|| Duration::from_millis(self.storage_timeout_ms))
    }
}

#[cfg(not(tarpaulin_include))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let args = FoodstoreServerArgs::parse();
    let timeout = args.storage_timeout();

    let (foods, store, snapshot) = if args.in_memory {
        let (foods, store) = init_catalog(timeout);
        (foods, store, false)
    } else {
        let (foods, store) = init_catalog_with_snapshot(&args.data_file, timeout)
            .await
            .with_context(|| format!("loading catalog from {}", args.data_file.display()))?;
        info!("Loaded {} food items from {}", store.len(), args.data_file.display());
        (foods, store, true)
    };

    let address = format!("{}:{}", args.address, args.port);
    let listener =
        TcpListener::bind(&address).await.with_context(|| format!("binding to {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, router(foods))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    if snapshot {
        flush(&store, &args.data_file).await?;
    }
    info!("Server stopped");
    Ok(())
}

async fn flush(store: &StoreService, data_file: &std::path::Path) -> anyhow::Result<()> {
    store
        .flush()
        .await
        .with_context(|| format!("saving catalog to {}", data_file.display()))?;
    info!("Saved {} food items to {}", store.len(), data_file.display());
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
