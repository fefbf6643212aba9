use anyhow::{Context, Result};
use clap::Parser;
use kvgate_store::StoreHandle;
use tokio::net::TcpListener;
use tracing::{info, warn};

use kvgate_api::cli::{Cli, ConnectionMode};
use kvgate_api::routes;

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

// One single-threaded cooperative scheduler; request handlers interleave at
// await points and nothing runs on OS-level parallel threads.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let store = match cli.connection_mode {
        ConnectionMode::Shared => {
            // The connection must exist before the listener accepts traffic;
            // failing here takes the process down.
            let addr = cli
                .store_addr()
                .context("shared connection mode requires --store-host and --store-port")?;
            let handle = StoreHandle::shared(&addr)
                .await
                .with_context(|| format!("failed to connect to the store at {addr}"))?;
            info!(store = %addr, "connected to the store");
            handle
        }
        ConnectionMode::PerRequest => {
            if cli.store_addr().is_none() {
                warn!("store address not configured; every request will fail until it is");
            }
            StoreHandle::per_request(cli.store_addr())
        }
    };

    let listener = TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen))?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, routes::router(store))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = ?err, "failed to install ctrl-c handler");
    }
    info!("shutting down");
}
