//! The publishing loop.

use std::time::Duration;

use anyhow::{Context, Result};
use kvgate_store::{Connection, StoreAddr};
use tokio::time::interval;
use tracing::info;

use crate::message::{RelayMessage, CHANNELS};

/// Publish a random payload to a random channel every `period`, forever.
///
/// Fire-and-forget: a publish with zero subscribers is success. Only a
/// transport failure ends the loop.
pub async fn run(addr: StoreAddr, period: Duration) -> Result<()> {
    let mut connection = Connection::connect(&addr)
        .await
        .with_context(|| format!("failed to connect the publisher to {addr}"))?;
    info!(store = %addr, "publisher connected");

    let mut ticker = interval(period);
    loop {
        ticker.tick().await;
        let payload = RelayMessage {
            message: rand::random::<f64>(),
        };
        let channel = pick_channel();
        let encoded = serde_json::to_string(&payload)?;
        let receivers = connection.publish(channel, &encoded).await?;
        info!(channel, payload = %encoded, receivers, "published");
    }
}

/// Uniform choice between the two channels.
fn pick_channel() -> &'static str {
    CHANNELS[usize::from(rand::random::<bool>())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_channel_only_returns_known_channels() {
        for _ in 0..100 {
            assert!(CHANNELS.contains(&pick_channel()));
        }
    }
}
