use std::net::SocketAddr;

use clap::{Parser, ValueEnum};
use kvgate_store::StoreAddr;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Socket address the HTTP listener binds to.
    #[arg(long, env = "KVGATE_LISTEN", default_value = "127.0.0.1:3000")]
    pub listen: SocketAddr,

    /// Hostname of the backing store.
    #[arg(long, env = "KVGATE_STORE_HOST")]
    pub store_host: Option<String>,

    /// Port of the backing store.
    #[arg(long, env = "KVGATE_STORE_PORT")]
    pub store_port: Option<u16>,

    /// Connection lifecycle: one shared connection for the process, or a
    /// fresh connection per request.
    #[arg(long, env = "KVGATE_CONNECTION_MODE", value_enum, default_value_t = ConnectionMode::Shared)]
    pub connection_mode: ConnectionMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConnectionMode {
    Shared,
    PerRequest,
}

impl Cli {
    /// The store address, if both halves are configured.
    pub fn store_addr(&self) -> Option<StoreAddr> {
        match (&self.store_host, self.store_port) {
            (Some(host), Some(port)) => Some(StoreAddr::new(host.clone(), port)),
            _ => None,
        }
    }
}
