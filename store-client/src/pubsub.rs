//! Channel subscriptions.
//!
//! A subscription owns a dedicated connection: once SUBSCRIBE is sent, the
//! store only delivers pushes on that socket, so it cannot be shared with
//! request/reply traffic. Deliveries are pumped by a background task into a
//! bounded single-consumer channel, and dropping the handle cancels the pump.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::addr::StoreAddr;
use crate::command::Command;
use crate::connection::Connection;
use crate::error::{Result, StoreError};
use crate::resp::Frame;

/// One message delivered on a subscribed channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMessage {
    pub channel: String,
    pub payload: String,
}

/// A live subscription over its own store connection.
pub struct Subscription {
    channel_count: i64,
    messages: mpsc::Receiver<ChannelMessage>,
    pump: JoinHandle<()>,
}

impl Subscription {
    /// Subscribe to `channels` on a fresh connection.
    ///
    /// Consumes one acknowledgement per channel before returning, so a
    /// successful open means the store has confirmed every subscription.
    pub async fn open(addr: &StoreAddr, channels: &[&str]) -> Result<Self> {
        let mut connection = Connection::connect(addr).await?;
        let command = Command::Subscribe {
            channels: channels.iter().map(|channel| channel.to_string()).collect(),
        };
        connection.send(&command).await?;

        let mut channel_count = 0;
        for _ in channels {
            let frame = connection.recv().await?.ok_or(StoreError::Disconnected)?;
            channel_count = parse_subscribe_ack(frame)?;
        }

        let (tx, messages) = mpsc::channel(64);
        let pump = tokio::spawn(pump_messages(connection, tx));
        Ok(Self {
            channel_count,
            messages,
            pump,
        })
    }

    /// Number of channels the store reported after the last acknowledgement.
    pub fn channel_count(&self) -> i64 {
        self.channel_count
    }

    /// Wait for the next delivery. `None` means the subscription ended (the
    /// store closed the connection or the pump failed).
    pub async fn recv(&mut self) -> Option<ChannelMessage> {
        self.messages.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

async fn pump_messages(mut connection: Connection, tx: mpsc::Sender<ChannelMessage>) {
    loop {
        let frame = match connection.recv().await {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(err) => {
                warn!(error = %err, "subscription stream failed");
                break;
            }
        };
        match parse_push(frame) {
            Ok(Some(message)) => {
                if tx.send(message).await.is_err() {
                    // Receiver dropped; nobody is listening anymore.
                    break;
                }
            }
            Ok(None) => continue,
            Err(err) => {
                warn!(error = %err, "dropping unreadable push from the store");
                break;
            }
        }
    }
}

/// `["subscribe", <channel>, <count>]` → count.
fn parse_subscribe_ack(frame: Frame) -> Result<i64> {
    if let Frame::Error(message) = frame {
        return Err(StoreError::Command(message));
    }
    if let Frame::Array(Some(items)) = &frame {
        if let [Frame::Bulk(Some(kind)), Frame::Bulk(Some(_channel)), Frame::Integer(count)] =
            items.as_slice()
        {
            if kind == "subscribe" {
                return Ok(*count);
            }
        }
    }
    Err(StoreError::Protocol(format!(
        "unexpected reply to SUBSCRIBE: {frame:?}"
    )))
}

/// `["message", <channel>, <payload>]` → delivery; other pushes (late acks,
/// unsubscribe notices) are skipped.
fn parse_push(frame: Frame) -> Result<Option<ChannelMessage>> {
    let Frame::Array(Some(items)) = &frame else {
        return Err(StoreError::Protocol(format!(
            "unexpected push frame: {frame:?}"
        )));
    };
    match items.as_slice() {
        [Frame::Bulk(Some(kind)), Frame::Bulk(Some(channel)), Frame::Bulk(Some(payload))]
            if kind == "message" =>
        {
            Ok(Some(ChannelMessage {
                channel: channel.clone(),
                payload: payload.clone(),
            }))
        }
        [Frame::Bulk(Some(_)), ..] => Ok(None),
        _ => Err(StoreError::Protocol(format!(
            "unexpected push frame: {frame:?}"
        ))),
    }
}
