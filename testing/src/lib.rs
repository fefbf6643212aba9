//! In-memory stand-in for the real store.
//!
//! Speaks the same wire subset the client issues (strings, lists, KEYS,
//! FLUSHALL, MULTI/EXEC, SUBSCRIBE/PUBLISH) over real sockets, so every crate
//! in the workspace can run its integration tests without a store process.
//! The frame codec is reused from `kvgate-store` — one codec, both
//! directions.
//!
//! Fault injection: [`MockControls::reject_writes_to`] marks keys whose
//! writes the server refuses. A refused write inside a pipeline errors at its
//! reply position while earlier commands stay applied; inside MULTI/EXEC it
//! aborts the whole batch with nothing applied.

mod request;
mod server;
mod state;

pub use server::{MockControls, MockStore};
