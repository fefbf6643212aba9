//! Periodic publisher and logging subscriber over the store's channels.
//!
//! The two loops share nothing in-process; they coordinate only through the
//! store's channel delivery, so either can be pointed at a different store
//! instance without touching the other.
//!
//! - [`message`] defines the channel set and the payload shape.
//! - [`publisher`] emits a random payload to a random channel on a fixed
//!   period.
//! - [`subscriber`] subscribes to the full channel set and logs every
//!   delivery.
//! - [`cli`] parses the store address and publish period.

pub mod cli;
pub mod message;
pub mod publisher;
pub mod subscriber;
