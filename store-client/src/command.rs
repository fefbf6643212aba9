//! Commands the mediator issues against the store.
//!
//! Every command encodes as an array of bulk strings, the request form the
//! store expects regardless of reply shape.

use crate::resp::Frame;

/// A store command, covering exactly the operations the HTTP surface and the
/// relay need.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ping,
    Get { key: String },
    Set { key: String, value: String },
    Del { key: String },
    Keys { pattern: String },
    FlushAll,
    LPush { key: String, values: Vec<String> },
    LRange { key: String, start: i64, stop: i64 },
    Multi,
    Exec,
    Subscribe { channels: Vec<String> },
    Publish { channel: String, payload: String },
}

impl Command {
    /// The command word as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Ping => "PING",
            Command::Get { .. } => "GET",
            Command::Set { .. } => "SET",
            Command::Del { .. } => "DEL",
            Command::Keys { .. } => "KEYS",
            Command::FlushAll => "FLUSHALL",
            Command::LPush { .. } => "LPUSH",
            Command::LRange { .. } => "LRANGE",
            Command::Multi => "MULTI",
            Command::Exec => "EXEC",
            Command::Subscribe { .. } => "SUBSCRIBE",
            Command::Publish { .. } => "PUBLISH",
        }
    }

    /// Encode as the request frame: an array of bulk strings.
    pub fn to_frame(&self) -> Frame {
        let mut args: Vec<String> = vec![self.name().to_string()];
        match self {
            Command::Ping | Command::FlushAll | Command::Multi | Command::Exec => {}
            Command::Get { key } | Command::Del { key } => args.push(key.clone()),
            Command::Set { key, value } => {
                args.push(key.clone());
                args.push(value.clone());
            }
            Command::Keys { pattern } => args.push(pattern.clone()),
            Command::LPush { key, values } => {
                args.push(key.clone());
                args.extend(values.iter().cloned());
            }
            Command::LRange { key, start, stop } => {
                args.push(key.clone());
                args.push(start.to_string());
                args.push(stop.to_string());
            }
            Command::Subscribe { channels } => args.extend(channels.iter().cloned()),
            Command::Publish { channel, payload } => {
                args.push(channel.clone());
                args.push(payload.clone());
            }
        }
        Frame::Array(Some(
            args.into_iter().map(|arg| Frame::Bulk(Some(arg))).collect(),
        ))
    }
}
