use std::time::Duration;

use anyhow::Result;
use kvgate_relay::message::{RelayMessage, CHANNELS};
use kvgate_relay::publisher;
use kvgate_store::{StoreAddr, Subscription};
use kvgate_testing::MockStore;
use tokio::time::timeout;

async fn start_store() -> Result<StoreAddr> {
    let store = MockStore::bind().await?;
    let addr = store.addr()?;
    tokio::spawn(store.run());
    Ok(addr)
}

#[tokio::test]
async fn published_messages_reach_the_subscriber_intact() -> Result<()> {
    let addr = start_store().await?;

    let mut subscription = Subscription::open(&addr, &CHANNELS).await?;
    assert_eq!(subscription.channel_count(), 2);

    let publisher = tokio::spawn(publisher::run(addr.clone(), Duration::from_millis(10)));

    for _ in 0..5 {
        let delivery = timeout(Duration::from_secs(2), subscription.recv())
            .await
            .expect("a publish lands within the window")
            .expect("subscription stays open");
        assert!(CHANNELS.contains(&delivery.channel.as_str()));
        let payload: RelayMessage = serde_json::from_str(&delivery.payload)?;
        assert!((0.0..1.0).contains(&payload.message));
    }

    publisher.abort();
    Ok(())
}

#[tokio::test]
async fn publishing_without_subscribers_is_not_an_error() -> Result<()> {
    let addr = start_store().await?;

    // Run a few ticks with nobody listening; the loop must still be alive
    // (i.e. not have returned an error) when the window closes.
    let publisher = tokio::spawn(publisher::run(addr, Duration::from_millis(10)));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!publisher.is_finished());

    publisher.abort();
    Ok(())
}
