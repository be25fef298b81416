//! Native datastore trait definitions.

use crate::error::NativeResult;
use std::fmt;
use std::time::Duration;

/// Identifier of a native transaction, assigned by the datastore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NativeTxId(pub u64);

impl NativeTxId {
    /// Creates a new native transaction ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NativeTxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ntx:{}", self.0)
    }
}

/// What closing a native transaction did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeOutcome {
    /// The transaction's work was made durable.
    Committed,
    /// The transaction's work was discarded.
    RolledBack,
}

/// Options passed to the datastore when a transaction is opened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionOptions {
    /// Maximum time the transaction may stay open before the datastore
    /// refuses to commit it.
    pub timeout: Option<Duration>,
}

impl TransactionOptions {
    /// Creates options with no timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the transaction timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A datastore that can open native transactions.
///
/// # Invariants
///
/// - Every successful `begin_transaction` yields a fresh, open handle
/// - Handles are independent: closing one never affects another
/// - Datastores must be `Send + Sync` so a bridge can be shared with the
///   host's completion callbacks
pub trait NativeDatastore: Send + Sync {
    /// Opens a new native transaction.
    ///
    /// # Errors
    ///
    /// Returns [`crate::NativeError::Open`] if the datastore cannot start a
    /// transaction.
    fn begin_transaction(
        &self,
        options: &TransactionOptions,
    ) -> NativeResult<Box<dyn NativeTransaction>>;
}

/// An open native transaction handle.
///
/// Marking is cheap and infallible; the outcome is decided at [`close`]:
/// a failure mark wins over a success mark, and an unmarked handle rolls back.
///
/// [`close`]: NativeTransaction::close
pub trait NativeTransaction: Send {
    /// Returns the datastore-assigned ID of this transaction.
    fn id(&self) -> NativeTxId;

    /// Marks the transaction as successful.
    fn mark_success(&mut self);

    /// Marks the transaction as failed.
    fn mark_failure(&mut self);

    /// Closes the transaction, committing or rolling back its work.
    ///
    /// The handle is consumed whether or not this returns an error.
    ///
    /// # Errors
    ///
    /// Returns [`crate::NativeError::Close`] if the datastore fails while
    /// finishing the transaction, or [`crate::NativeError::TimedOut`] if the
    /// transaction exceeded its timeout.
    fn close(self: Box<Self>) -> NativeResult<NativeOutcome>;
}
