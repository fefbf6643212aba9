//! Connection lifecycle behind one handle.
//!
//! Handler code only ever calls [`StoreHandle::acquire`]; whether that hands
//! back a lease on one long-lived connection or opens a fresh one per call is
//! a startup-time configuration choice. The shared variant serializes round
//! trips through an async mutex so command/reply pairing stays correct while
//! many request tasks are in flight; the per-request variant shares nothing
//! and pays the connect latency on every call.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::addr::StoreAddr;
use crate::connection::Connection;
use crate::error::{Result, StoreError};

#[derive(Clone)]
pub struct StoreHandle {
    inner: Inner,
}

#[derive(Clone)]
enum Inner {
    Shared(Arc<Mutex<Connection>>),
    PerRequest(Option<StoreAddr>),
}

impl StoreHandle {
    /// Connect once and share the connection across all future leases.
    ///
    /// The connection is verified with a PING, so a handle that comes back
    /// `Ok` is known-good; callers treat failure here as fatal startup.
    pub async fn shared(addr: &StoreAddr) -> Result<Self> {
        let mut connection = Connection::connect(addr).await?;
        connection.ping().await?;
        Ok(Self {
            inner: Inner::Shared(Arc::new(Mutex::new(connection))),
        })
    }

    /// Open a fresh connection on every acquire.
    ///
    /// The address may be absent (unconfigured environment); each acquire
    /// then fails with [`StoreError::AddressMissing`] instead of the process
    /// refusing to start.
    pub fn per_request(addr: Option<StoreAddr>) -> Self {
        Self {
            inner: Inner::PerRequest(addr),
        }
    }

    /// Lease a connection. Release is dropping the lease: the shared mutex
    /// unlocks, or the per-request connection closes.
    pub async fn acquire(&self) -> Result<Lease> {
        match &self.inner {
            Inner::Shared(connection) => {
                Ok(Lease::Shared(Arc::clone(connection).lock_owned().await))
            }
            Inner::PerRequest(Some(addr)) => Ok(Lease::Owned(Connection::connect(addr).await?)),
            Inner::PerRequest(None) => Err(StoreError::AddressMissing),
        }
    }
}

/// A held connection, shared or owned.
pub enum Lease {
    Shared(OwnedMutexGuard<Connection>),
    Owned(Connection),
}

impl Deref for Lease {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        match self {
            Lease::Shared(guard) => guard,
            Lease::Owned(connection) => connection,
        }
    }
}

impl DerefMut for Lease {
    fn deref_mut(&mut self) -> &mut Connection {
        match self {
            Lease::Shared(guard) => guard,
            Lease::Owned(connection) => connection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn per_request_without_address_fails_on_acquire() {
        let handle = StoreHandle::per_request(None);
        let err = handle.acquire().await.expect_err("no address configured");
        assert!(matches!(err, StoreError::AddressMissing));
    }
}
