//! Error types for native datastore operations.

use crate::datastore::NativeTxId;
use std::time::Duration;
use thiserror::Error;

/// Result type for native datastore operations.
pub type NativeResult<T> = Result<T, NativeError>;

/// Errors raised by a native datastore or its transaction handles.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NativeError {
    /// The datastore could not start a transaction.
    #[error("failed to begin native transaction: {message}")]
    Open {
        /// Description of the failure.
        message: String,
    },

    /// The transaction handle failed while closing.
    #[error("failed to close native transaction: {message}")]
    Close {
        /// Description of the failure.
        message: String,
    },

    /// The transaction outlived its timeout and was rolled back on close.
    #[error("native transaction {id} timed out after {elapsed:?}")]
    TimedOut {
        /// The transaction that timed out.
        id: NativeTxId,
        /// How long the transaction had been open.
        elapsed: Duration,
    },

    /// The datastore is shut down.
    #[error("native datastore is closed")]
    Closed,
}

impl NativeError {
    /// Creates an open error.
    pub fn open(message: impl Into<String>) -> Self {
        Self::Open {
            message: message.into(),
        }
    }

    /// Creates a close error.
    pub fn close(message: impl Into<String>) -> Self {
        Self::Close {
            message: message.into(),
        }
    }
}
