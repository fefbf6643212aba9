//! Shared server state: the entry table, the pub/sub fan-out, and the set of
//! keys whose writes are refused.

use std::collections::{HashMap, HashSet, VecDeque};

use kvgate_store::resp::Frame;
use tokio::sync::{broadcast, Mutex};

use crate::request::Request;

const WRONGTYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

#[derive(Debug, Clone)]
pub(crate) struct PubSubEvent {
    pub channel: String,
    pub payload: String,
}

pub(crate) enum Entry {
    Text(String),
    List(VecDeque<String>),
}

pub(crate) struct MockState {
    entries: Mutex<HashMap<String, Entry>>,
    rejected_keys: Mutex<HashSet<String>>,
    events: broadcast::Sender<PubSubEvent>,
}

impl MockState {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            entries: Mutex::new(HashMap::new()),
            rejected_keys: Mutex::new(HashSet::new()),
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PubSubEvent> {
        self.events.subscribe()
    }

    pub async fn reject_writes_to(&self, key: &str) {
        self.rejected_keys.lock().await.insert(key.to_string());
    }

    /// The refusal message for a write to a marked key, if any.
    pub async fn write_rejection(&self, request: &Request) -> Option<String> {
        let key = request.write_key()?;
        let rejected = self.rejected_keys.lock().await;
        rejected
            .contains(key)
            .then(|| format!("ERR write to '{key}' refused"))
    }

    /// Check the rejection list, then apply. Used outside MULTI/EXEC, where
    /// each command succeeds or fails on its own.
    pub async fn apply_checked(&self, request: Request) -> Frame {
        if let Some(message) = self.write_rejection(&request).await {
            return Frame::Error(message);
        }
        self.apply(request).await
    }

    /// Apply one command to the entry table and build its reply.
    pub async fn apply(&self, request: Request) -> Frame {
        match request {
            Request::Ping => Frame::Simple("PONG".to_string()),
            Request::Get { key } => {
                let entries = self.entries.lock().await;
                match entries.get(&key) {
                    Some(Entry::Text(value)) => Frame::Bulk(Some(value.clone())),
                    Some(Entry::List(_)) => Frame::Error(WRONGTYPE.to_string()),
                    None => Frame::Bulk(None),
                }
            }
            Request::Set { key, value } => {
                self.entries.lock().await.insert(key, Entry::Text(value));
                Frame::Simple("OK".to_string())
            }
            Request::Del { key } => {
                let removed = self.entries.lock().await.remove(&key).is_some();
                Frame::Integer(removed as i64)
            }
            Request::Keys { pattern } => {
                let entries = self.entries.lock().await;
                let keys = entries
                    .keys()
                    .filter(|key| pattern == "*" || **key == pattern)
                    .map(|key| Frame::Bulk(Some(key.clone())))
                    .collect();
                Frame::Array(Some(keys))
            }
            Request::FlushAll => {
                self.entries.lock().await.clear();
                Frame::Simple("OK".to_string())
            }
            Request::LPush { key, values } => {
                let mut entries = self.entries.lock().await;
                let entry = entries
                    .entry(key)
                    .or_insert_with(|| Entry::List(VecDeque::new()));
                match entry {
                    Entry::List(list) => {
                        for value in values {
                            list.push_front(value);
                        }
                        Frame::Integer(list.len() as i64)
                    }
                    Entry::Text(_) => Frame::Error(WRONGTYPE.to_string()),
                }
            }
            Request::LRange { key, start, stop } => {
                let entries = self.entries.lock().await;
                match entries.get(&key) {
                    None => Frame::Array(Some(Vec::new())),
                    Some(Entry::Text(_)) => Frame::Error(WRONGTYPE.to_string()),
                    Some(Entry::List(list)) => Frame::Array(Some(range_of(list, start, stop))),
                }
            }
            Request::Publish { channel, payload } => {
                let delivered = self
                    .events
                    .send(PubSubEvent { channel, payload })
                    .map(|receivers| receivers as i64)
                    .unwrap_or(0);
                Frame::Integer(delivered)
            }
            // Connection-level commands never reach the state table.
            Request::Multi | Request::Exec | Request::Subscribe { .. } => {
                Frame::Error("ERR command not valid here".to_string())
            }
        }
    }
}

/// LRANGE index semantics: negative indices count from the tail, the range is
/// inclusive, and out-of-bounds ranges clamp to an empty reply.
fn range_of(list: &VecDeque<String>, start: i64, stop: i64) -> Vec<Frame> {
    let len = list.len() as i64;
    let normalize = |index: i64| if index < 0 { index + len } else { index };
    let start = normalize(start).max(0);
    let stop = normalize(stop).min(len - 1);
    if len == 0 || start > stop {
        return Vec::new();
    }
    list.iter()
        .skip(start as usize)
        .take((stop - start + 1) as usize)
        .map(|value| Frame::Bulk(Some(value.clone())))
        .collect()
}
