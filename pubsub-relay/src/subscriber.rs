//! The subscribing loop.

use anyhow::Result;
use kvgate_store::{StoreAddr, Subscription};
use tracing::{error, info};

use crate::message::CHANNELS;

/// Subscribe to the full channel set and log every delivery.
///
/// A subscription failure is logged once and ends the loop; there is no
/// retry. The loop also ends when the store drops the connection.
pub async fn run(addr: StoreAddr) -> Result<()> {
    let mut subscription = match Subscription::open(&addr, &CHANNELS).await {
        Ok(subscription) => subscription,
        Err(err) => {
            error!(error = %err, "failed to subscribe");
            return Ok(());
        }
    };
    info!(
        channels = subscription.channel_count(),
        "subscribed successfully"
    );

    while let Some(delivery) = subscription.recv().await {
        info!(channel = %delivery.channel, payload = %delivery.payload, "received");
    }
    info!("subscription ended");
    Ok(())
}
