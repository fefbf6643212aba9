//! Async client for the backing key-value store.
//!
//! The HTTP mediator and the pub/sub relay both talk to the store through
//! this crate. Each module covers one concrete responsibility:
//!
//! - [`resp`] encodes and decodes the store's wire frames.
//! - [`command`] is the command set the mediator issues.
//! - [`connection`] drives one socket: single round trips, pipelines, and
//!   MULTI/EXEC transactions.
//! - [`pubsub`] opens channel subscriptions on dedicated connections and
//!   delivers messages through a bounded channel handle.
//! - [`pool`] hides the connection lifecycle (one shared connection vs. one
//!   per request) behind an acquire/release handle.
//! - [`value`] maps arbitrary JSON values to stored strings and back.
//!
//! Integration tests exercise this crate against the in-memory mock store in
//! `kvgate-testing` over real sockets.

pub mod addr;
pub mod command;
pub mod connection;
pub mod error;
pub mod pool;
pub mod pubsub;
pub mod resp;
pub mod value;

pub use addr::StoreAddr;
pub use command::Command;
pub use connection::Connection;
pub use error::{Result, StoreError};
pub use pool::{Lease, StoreHandle};
pub use pubsub::{ChannelMessage, Subscription};
