use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use kvgate_relay::cli::Cli;
use kvgate_relay::{publisher, subscriber};

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

// Both loops interleave on one single-threaded scheduler; they coordinate
// only through the store.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let addr = cli.store_addr();
    info!(store = %addr, period = ?cli.period(), "starting relay");

    // The subscriber ending (failed subscribe, store dropping the
    // connection) does not stop the publisher; it logs and stays quiet.
    let subscriber = tokio::spawn(subscriber::run(addr.clone()));

    let result = tokio::select! {
        result = publisher::run(addr, cli.period()) => result,
        _ = shutdown_signal() => Ok(()),
    };
    subscriber.abort();
    result
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = ?err, "failed to install ctrl-c handler");
    }
    info!("shutting down");
}
