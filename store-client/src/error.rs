//! Error types for talking to the store.

use thiserror::Error;

/// Result type alias using [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached, or the transport failed mid-operation.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store closed the connection while a reply was still expected.
    #[error("store closed the connection")]
    Disconnected,

    /// Per-request connections were selected but no store address is configured.
    #[error("store address is not configured")]
    AddressMissing,

    /// The store sent something that is not a well-formed frame, or a reply
    /// whose shape does not match the command that was issued.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The store accepted the frame but rejected the command.
    #[error("store rejected command: {0}")]
    Command(String),

    /// A MULTI/EXEC batch did not commit; none of its commands took effect.
    #[error("transaction aborted: {0}")]
    TransactionAborted(String),
}
