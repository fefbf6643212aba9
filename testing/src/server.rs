//! The mock server itself: accept loop, per-connection tasks, MULTI/EXEC
//! queueing, and subscriber mode.

use std::net::SocketAddr;
use std::sync::Arc;

use kvgate_store::resp::{read_frame, write_frame, Frame};
use kvgate_store::{Result, StoreAddr};
use tokio::io::BufReader;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::select;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::request::Request;
use crate::state::MockState;

/// An in-memory store server bound to an ephemeral local port.
pub struct MockStore {
    listener: TcpListener,
    state: Arc<MockState>,
}

/// Handle for poking the server from a test while it runs.
#[derive(Clone)]
pub struct MockControls {
    state: Arc<MockState>,
}

impl MockStore {
    /// Bind to `127.0.0.1:0`.
    pub async fn bind() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Ok(Self {
            listener,
            state: Arc::new(MockState::new()),
        })
    }

    /// The address clients should connect to.
    pub fn addr(&self) -> std::io::Result<StoreAddr> {
        let addr: SocketAddr = self.listener.local_addr()?;
        Ok(StoreAddr::new(addr.ip().to_string(), addr.port()))
    }

    /// Grab a controls handle before handing the server to [`MockStore::run`].
    pub fn controls(&self) -> MockControls {
        MockControls {
            state: Arc::clone(&self.state),
        }
    }

    /// Accept and serve connections until the task is dropped or aborted.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(err) = serve_connection(stream, state).await {
                            debug!(peer = %peer, error = %err, "mock store connection ended");
                        }
                    });
                }
                Err(err) => warn!(error = %err, "mock store failed to accept a connection"),
            }
        }
    }
}

impl MockControls {
    /// Refuse all future writes (SET, LPUSH) to `key`.
    pub async fn reject_writes_to(&self, key: &str) {
        self.state.reject_writes_to(key).await;
    }
}

async fn serve_connection(stream: TcpStream, state: Arc<MockState>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    // Some(queue) while the connection is inside MULTI.
    let mut queued: Option<Vec<Request>> = None;

    loop {
        let Some(frame) = read_frame(&mut reader).await? else {
            return Ok(());
        };
        let request = match Request::from_frame(frame) {
            Ok(request) => request,
            Err(message) => {
                write_frame(&mut writer, &Frame::Error(message)).await?;
                continue;
            }
        };

        match request {
            Request::Subscribe { channels } => {
                return serve_subscriber(reader, writer, state, channels).await;
            }
            Request::Multi => {
                let reply = if queued.is_some() {
                    Frame::Error("ERR MULTI calls can not be nested".to_string())
                } else {
                    queued = Some(Vec::new());
                    Frame::Simple("OK".to_string())
                };
                write_frame(&mut writer, &reply).await?;
            }
            Request::Exec => {
                let reply = match queued.take() {
                    None => Frame::Error("ERR EXEC without MULTI".to_string()),
                    Some(commands) => exec_queued(&state, commands).await,
                };
                write_frame(&mut writer, &reply).await?;
            }
            request => {
                let reply = match queued.as_mut() {
                    Some(queue) => {
                        queue.push(request);
                        Frame::Simple("QUEUED".to_string())
                    }
                    None => state.apply_checked(request).await,
                };
                write_frame(&mut writer, &reply).await?;
            }
        }
    }
}

/// All-or-nothing: if any queued write targets a refused key, the whole
/// batch aborts and the entry table is untouched.
async fn exec_queued(state: &MockState, commands: Vec<Request>) -> Frame {
    for command in &commands {
        if let Some(message) = state.write_rejection(command).await {
            return Frame::Error(format!("EXECABORT Transaction discarded: {message}"));
        }
    }
    let mut replies = Vec::with_capacity(commands.len());
    for command in commands {
        replies.push(state.apply(command).await);
    }
    Frame::Array(Some(replies))
}

async fn serve_subscriber(
    mut reader: BufReader<OwnedReadHalf>,
    mut writer: OwnedWriteHalf,
    state: Arc<MockState>,
    channels: Vec<String>,
) -> Result<()> {
    let mut events = state.subscribe_events();
    for (index, channel) in channels.iter().enumerate() {
        let ack = Frame::Array(Some(vec![
            Frame::Bulk(Some("subscribe".to_string())),
            Frame::Bulk(Some(channel.clone())),
            Frame::Integer(index as i64 + 1),
        ]));
        write_frame(&mut writer, &ack).await?;
    }

    loop {
        select! {
            event = events.recv() => {
                match event {
                    Ok(event) if channels.contains(&event.channel) => {
                        let push = Frame::Array(Some(vec![
                            Frame::Bulk(Some("message".to_string())),
                            Frame::Bulk(Some(event.channel)),
                            Frame::Bulk(Some(event.payload)),
                        ]));
                        write_frame(&mut writer, &push).await?;
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "mock subscriber lagged behind the fan-out");
                    }
                    Err(RecvError::Closed) => return Ok(()),
                }
            }
            frame = read_frame(&mut reader) => {
                // Further commands in subscriber mode are not modeled; a
                // closed socket ends the subscription.
                if frame?.is_none() {
                    return Ok(());
                }
            }
        }
    }
}
