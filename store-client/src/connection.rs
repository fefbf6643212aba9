//! A single connection to the store.
//!
//! The socket is split so the buffered read half and the write half can be
//! driven independently; within one connection, commands and replies pair up
//! strictly in order, which is what pipelining and MULTI/EXEC rely on.

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::addr::StoreAddr;
use crate::command::Command;
use crate::error::{Result, StoreError};
use crate::resp::{encode_frame, read_frame, write_frame, Frame};

pub struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Connection {
    /// Open a TCP connection to the store.
    pub async fn connect(addr: &StoreAddr) -> Result<Self> {
        let stream = TcpStream::connect((addr.host.as_str(), addr.port)).await?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(reader),
            writer,
        })
    }

    /// Write one command frame and flush.
    pub async fn send(&mut self, command: &Command) -> Result<()> {
        write_frame(&mut self.writer, &command.to_frame()).await
    }

    /// Read one reply frame; `None` means the store closed the connection at
    /// a frame boundary.
    pub async fn recv(&mut self) -> Result<Option<Frame>> {
        read_frame(&mut self.reader).await
    }

    /// Send one command and wait for its reply. An error frame becomes
    /// [`StoreError::Command`]; a closed connection becomes
    /// [`StoreError::Disconnected`].
    pub async fn round_trip(&mut self, command: &Command) -> Result<Frame> {
        self.send(command).await?;
        match self.recv().await?.ok_or(StoreError::Disconnected)? {
            Frame::Error(message) => Err(StoreError::Command(message)),
            frame => Ok(frame),
        }
    }

    // -- batched execution ---------------------------------------------------

    /// Send every command in one buffer, then collect one reply per command
    /// in submitted order. Error replies are returned in place; earlier
    /// commands may already have taken effect when a later one fails.
    pub async fn pipeline(&mut self, commands: &[Command]) -> Result<Vec<Frame>> {
        if commands.is_empty() {
            return Ok(Vec::new());
        }
        let mut buf = Vec::new();
        for command in commands {
            encode_frame(&command.to_frame(), &mut buf);
        }
        self.writer.write_all(&buf).await?;
        self.writer.flush().await?;

        let mut replies = Vec::with_capacity(commands.len());
        for _ in commands {
            replies.push(self.recv().await?.ok_or(StoreError::Disconnected)?);
        }
        Ok(replies)
    }

    /// Run the commands atomically inside MULTI/EXEC.
    ///
    /// The whole conversation goes out as one pipeline, and the outcome is
    /// decided solely by the EXEC reply: an error or nil reply means the
    /// store discarded the batch, and an error element inside the reply
    /// array is also treated as a failed transaction.
    pub async fn transaction(&mut self, commands: &[Command]) -> Result<Vec<Frame>> {
        if commands.is_empty() {
            return Ok(Vec::new());
        }
        let mut batch = Vec::with_capacity(commands.len() + 2);
        batch.push(Command::Multi);
        batch.extend(commands.iter().cloned());
        batch.push(Command::Exec);

        let mut replies = self.pipeline(&batch).await?;
        let exec_reply = replies
            .pop()
            .ok_or_else(|| StoreError::Protocol("missing EXEC reply".to_string()))?;
        match exec_reply {
            Frame::Error(message) => Err(StoreError::TransactionAborted(message)),
            Frame::Array(None) => Err(StoreError::TransactionAborted(
                "transaction discarded by the store".to_string(),
            )),
            Frame::Array(Some(results)) => {
                for result in &results {
                    if let Frame::Error(message) = result {
                        return Err(StoreError::TransactionAborted(message.clone()));
                    }
                }
                Ok(results)
            }
            other => Err(unexpected("EXEC", &other)),
        }
    }

    // -- typed helpers -------------------------------------------------------

    pub async fn ping(&mut self) -> Result<()> {
        match self.round_trip(&Command::Ping).await? {
            Frame::Simple(_) => Ok(()),
            other => Err(unexpected("PING", &other)),
        }
    }

    /// Read one key. A missing key is `Ok(None)`, never an error.
    pub async fn get(&mut self, key: &str) -> Result<Option<String>> {
        let command = Command::Get {
            key: key.to_string(),
        };
        match self.round_trip(&command).await? {
            Frame::Bulk(value) => Ok(value),
            other => Err(unexpected("GET", &other)),
        }
    }

    pub async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let command = Command::Set {
            key: key.to_string(),
            value: value.to_string(),
        };
        match self.round_trip(&command).await? {
            Frame::Simple(_) => Ok(()),
            other => Err(unexpected("SET", &other)),
        }
    }

    /// Delete one key, returning how many entries were removed (0 or 1).
    pub async fn del(&mut self, key: &str) -> Result<i64> {
        let command = Command::Del {
            key: key.to_string(),
        };
        match self.round_trip(&command).await? {
            Frame::Integer(removed) => Ok(removed),
            other => Err(unexpected("DEL", &other)),
        }
    }

    pub async fn keys(&mut self, pattern: &str) -> Result<Vec<String>> {
        let command = Command::Keys {
            pattern: pattern.to_string(),
        };
        match self.round_trip(&command).await? {
            Frame::Array(items) => collect_strings("KEYS", items),
            other => Err(unexpected("KEYS", &other)),
        }
    }

    pub async fn flush_all(&mut self) -> Result<()> {
        match self.round_trip(&Command::FlushAll).await? {
            Frame::Simple(_) => Ok(()),
            other => Err(unexpected("FLUSHALL", &other)),
        }
    }

    /// Prepend values to a list, returning the new list length.
    pub async fn lpush(&mut self, key: &str, values: Vec<String>) -> Result<i64> {
        let command = Command::LPush {
            key: key.to_string(),
            values,
        };
        match self.round_trip(&command).await? {
            Frame::Integer(len) => Ok(len),
            other => Err(unexpected("LPUSH", &other)),
        }
    }

    pub async fn lrange(&mut self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        let command = Command::LRange {
            key: key.to_string(),
            start,
            stop,
        };
        match self.round_trip(&command).await? {
            Frame::Array(items) => collect_strings("LRANGE", items),
            other => Err(unexpected("LRANGE", &other)),
        }
    }

    /// Publish a payload, returning how many subscribers received it.
    /// Zero receivers is not an error.
    pub async fn publish(&mut self, channel: &str, payload: &str) -> Result<i64> {
        let command = Command::Publish {
            channel: channel.to_string(),
            payload: payload.to_string(),
        };
        match self.round_trip(&command).await? {
            Frame::Integer(receivers) => Ok(receivers),
            other => Err(unexpected("PUBLISH", &other)),
        }
    }
}

fn collect_strings(command: &str, items: Option<Vec<Frame>>) -> Result<Vec<String>> {
    let Some(items) = items else {
        return Ok(Vec::new());
    };
    items
        .into_iter()
        .map(|item| match item {
            Frame::Bulk(Some(text)) => Ok(text),
            other => Err(unexpected(command, &other)),
        })
        .collect()
}

fn unexpected(command: &str, frame: &Frame) -> StoreError {
    StoreError::Protocol(format!("unexpected reply to {command}: {frame:?}"))
}
