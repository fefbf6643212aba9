use std::time::Duration;

use anyhow::Result;
use kvgate_store::resp::Frame;
use kvgate_store::{Command, Connection, StoreAddr, StoreError, StoreHandle, Subscription};
use kvgate_testing::{MockControls, MockStore};
use tokio::time::timeout;

async fn start_store() -> Result<(StoreAddr, MockControls)> {
    let store = MockStore::bind().await?;
    let addr = store.addr()?;
    let controls = store.controls();
    tokio::spawn(store.run());
    Ok((addr, controls))
}

fn set(key: &str, value: &str) -> Command {
    Command::Set {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[tokio::test]
async fn set_get_del_round_trip() -> Result<()> {
    let (addr, _) = start_store().await?;
    let mut connection = Connection::connect(&addr).await?;

    connection.set("foo", "\"bar\"").await?;
    assert_eq!(connection.get("foo").await?, Some("\"bar\"".to_string()));

    assert_eq!(connection.del("foo").await?, 1);
    assert_eq!(connection.get("foo").await?, None);
    assert_eq!(connection.del("foo").await?, 0);
    Ok(())
}

#[tokio::test]
async fn keys_and_flush_cover_the_whole_table() -> Result<()> {
    let (addr, _) = start_store().await?;
    let mut connection = Connection::connect(&addr).await?;

    for key in ["a", "b", "c"] {
        connection.set(key, "1").await?;
    }
    let mut keys = connection.keys("*").await?;
    keys.sort();
    assert_eq!(keys, ["a", "b", "c"]);

    connection.flush_all().await?;
    assert!(connection.keys("*").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn lpush_then_lrange_returns_prepend_order() -> Result<()> {
    let (addr, _) = start_store().await?;
    let mut connection = Connection::connect(&addr).await?;

    let first = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let second = vec!["d".to_string(), "e".to_string()];
    assert_eq!(connection.lpush("letters", first).await?, 3);
    assert_eq!(connection.lpush("letters", second).await?, 5);

    let items = connection.lrange("letters", 0, -1).await?;
    assert_eq!(items, ["e", "d", "c", "b", "a"]);
    Ok(())
}

#[tokio::test]
async fn pipeline_returns_one_reply_per_command_with_errors_in_place() -> Result<()> {
    let (addr, controls) = start_store().await?;
    controls.reject_writes_to("bad").await;
    let mut connection = Connection::connect(&addr).await?;

    let replies = connection
        .pipeline(&[set("ok-1", "1"), set("bad", "2"), set("ok-2", "3")])
        .await?;
    assert_eq!(replies.len(), 3);
    assert!(matches!(replies[0], Frame::Simple(_)));
    assert!(matches!(replies[1], Frame::Error(_)));
    assert!(matches!(replies[2], Frame::Simple(_)));

    // No atomicity: the commands around the failure took effect.
    assert_eq!(connection.get("ok-1").await?, Some("1".to_string()));
    assert_eq!(connection.get("ok-2").await?, Some("3".to_string()));
    Ok(())
}

#[tokio::test]
async fn transaction_applies_everything_on_success() -> Result<()> {
    let (addr, _) = start_store().await?;
    let mut connection = Connection::connect(&addr).await?;

    let replies = connection
        .transaction(&[set("t-1", "1"), set("t-2", "2")])
        .await?;
    assert_eq!(replies.len(), 2);
    assert_eq!(connection.get("t-1").await?, Some("1".to_string()));
    assert_eq!(connection.get("t-2").await?, Some("2".to_string()));
    Ok(())
}

#[tokio::test]
async fn transaction_with_a_refused_write_applies_nothing() -> Result<()> {
    let (addr, controls) = start_store().await?;
    controls.reject_writes_to("bad").await;
    let mut connection = Connection::connect(&addr).await?;

    let err = connection
        .transaction(&[set("t-1", "1"), set("bad", "2"), set("t-2", "3")])
        .await
        .expect_err("the batch must abort");
    assert!(matches!(err, StoreError::TransactionAborted(_)));

    assert_eq!(connection.get("t-1").await?, None);
    assert_eq!(connection.get("t-2").await?, None);
    Ok(())
}

#[tokio::test]
async fn empty_batches_are_noops() -> Result<()> {
    let (addr, _) = start_store().await?;
    let mut connection = Connection::connect(&addr).await?;

    assert!(connection.pipeline(&[]).await?.is_empty());
    assert!(connection.transaction(&[]).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn shared_handle_serves_interleaved_requests() -> Result<()> {
    let (addr, _) = start_store().await?;
    let handle = StoreHandle::shared(&addr).await?;

    let writer = {
        let handle = handle.clone();
        tokio::spawn(async move {
            let mut lease = handle.acquire().await?;
            lease.set("shared", "\"value\"").await
        })
    };
    writer.await.expect("writer task")?;

    let mut lease = handle.acquire().await?;
    assert_eq!(lease.get("shared").await?, Some("\"value\"".to_string()));
    Ok(())
}

#[tokio::test]
async fn subscription_delivers_only_subscribed_channels() -> Result<()> {
    let (addr, _) = start_store().await?;
    let mut subscription = Subscription::open(&addr, &["channel-1", "channel-2"]).await?;
    assert_eq!(subscription.channel_count(), 2);

    let mut publisher = Connection::connect(&addr).await?;
    publisher.publish("elsewhere", "ignored").await?;
    publisher.publish("channel-2", "{\"message\":0.25}").await?;

    let message = timeout(Duration::from_secs(1), subscription.recv())
        .await
        .expect("delivery within a second")
        .expect("subscription still open");
    assert_eq!(message.channel, "channel-2");
    assert_eq!(message.payload, "{\"message\":0.25}");
    Ok(())
}

#[tokio::test]
async fn messages_published_before_subscribing_are_not_replayed() -> Result<()> {
    let (addr, _) = start_store().await?;
    let mut publisher = Connection::connect(&addr).await?;
    assert_eq!(publisher.publish("channel-1", "early").await?, 0);

    let mut subscription = Subscription::open(&addr, &["channel-1"]).await?;
    publisher.publish("channel-1", "late").await?;

    let message = timeout(Duration::from_secs(1), subscription.recv())
        .await
        .expect("delivery within a second")
        .expect("subscription still open");
    assert_eq!(message.payload, "late");
    Ok(())
}
