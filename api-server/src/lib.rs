//! HTTP mediator between JSON clients and the backing key-value store.
//!
//! Each module focuses on a concrete responsibility:
//!
//! - [`cli`] parses the command-line/environment configuration, including
//!   which connection lifecycle the process runs with.
//! - [`routes`] wires the endpoint table to handlers.
//! - [`handlers`] maps one HTTP call to one store command and shapes the
//!   JSON reply.
//! - [`batch`] applies bulk writes under the pipelined or transactional
//!   policy.
//! - [`error`] converts failures into 400/500 JSON responses.
//!
//! Integration tests drive the router in-process against the mock store in
//! `kvgate-testing`.

pub mod batch;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod routes;
