use std::fmt;

/// Host and port of the backing store.
///
/// Kept as a hostname rather than a resolved `SocketAddr` so container DNS
/// names work the same way they do in the deployment environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreAddr {
    pub host: String,
    pub port: u16,
}

impl StoreAddr {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for StoreAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
