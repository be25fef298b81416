//! In-memory native datastore.

use crate::datastore::{
    NativeDatastore, NativeOutcome, NativeTransaction, NativeTxId, TransactionOptions,
};
use crate::error::{NativeError, NativeResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// An entry in the datastore's lifecycle journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeEvent {
    /// A transaction was opened.
    Begin {
        /// The new transaction.
        id: NativeTxId,
        /// The timeout it was opened with.
        timeout: Option<Duration>,
    },
    /// A transaction was marked successful.
    MarkSuccess {
        /// The marked transaction.
        id: NativeTxId,
    },
    /// A transaction was marked failed.
    MarkFailure {
        /// The marked transaction.
        id: NativeTxId,
    },
    /// A transaction was closed.
    Close {
        /// The closed transaction.
        id: NativeTxId,
        /// What closing it did.
        outcome: NativeOutcome,
    },
}

#[derive(Debug, Default)]
struct Shared {
    last_id: AtomicU64,
    begun: AtomicU64,
    committed: AtomicU64,
    rolled_back: AtomicU64,
    closed: AtomicBool,
    journal: Mutex<Vec<NativeEvent>>,
}

impl Shared {
    fn record(&self, event: NativeEvent) {
        self.journal.lock().push(event);
    }

    fn finish(&self, id: NativeTxId, outcome: NativeOutcome) {
        match outcome {
            NativeOutcome::Committed => self.committed.fetch_add(1, Ordering::SeqCst),
            NativeOutcome::RolledBack => self.rolled_back.fetch_add(1, Ordering::SeqCst),
        };
        self.record(NativeEvent::Close { id, outcome });
    }
}

/// An in-memory datastore that journals transaction lifecycles.
///
/// This datastore keeps no user data. It exists so the bridge can be driven
/// against a real [`NativeDatastore`] whose every begin, mark and close is
/// observable:
/// - Unit and integration tests
/// - Embedding hosts that only need lifecycle accounting
///
/// Clones share state, so a test can hand one clone to a bridge and keep
/// another for assertions.
///
/// # Example
///
/// ```rust
/// use txbridge_native::{InMemoryDatastore, NativeDatastore, TransactionOptions};
///
/// let store = InMemoryDatastore::new();
/// let tx = store.begin_transaction(&TransactionOptions::default()).unwrap();
/// assert_eq!(store.open_count(), 1);
/// tx.close().unwrap();
/// assert_eq!(store.open_count(), 0);
/// assert_eq!(store.rolled_back(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatastore {
    shared: Arc<Shared>,
}

impl InMemoryDatastore {
    /// Creates a new empty datastore.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the lifecycle journal.
    #[must_use]
    pub fn journal(&self) -> Vec<NativeEvent> {
        self.shared.journal.lock().clone()
    }

    /// Clears the lifecycle journal. Counters are kept.
    pub fn clear_journal(&self) {
        self.shared.journal.lock().clear();
    }

    /// Returns the number of transactions opened.
    #[must_use]
    pub fn begun(&self) -> u64 {
        self.shared.begun.load(Ordering::SeqCst)
    }

    /// Returns the number of transactions that committed on close.
    #[must_use]
    pub fn committed(&self) -> u64 {
        self.shared.committed.load(Ordering::SeqCst)
    }

    /// Returns the number of transactions that rolled back on close.
    #[must_use]
    pub fn rolled_back(&self) -> u64 {
        self.shared.rolled_back.load(Ordering::SeqCst)
    }

    /// Returns the number of transactions opened but not yet closed.
    ///
    /// Closes are read before opens, so a close racing this call is never
    /// counted without its open.
    #[must_use]
    pub fn open_count(&self) -> u64 {
        let closed = self.committed() + self.rolled_back();
        self.begun().saturating_sub(closed)
    }

    /// Shuts the datastore down. Later opens fail with [`NativeError::Closed`].
    pub fn shutdown(&self) {
        self.shared.closed.store(true, Ordering::SeqCst);
    }
}

impl NativeDatastore for InMemoryDatastore {
    fn begin_transaction(
        &self,
        options: &TransactionOptions,
    ) -> NativeResult<Box<dyn NativeTransaction>> {
        if self.shared.closed.load(Ordering::SeqCst) {
            return Err(NativeError::Closed);
        }

        let id = NativeTxId::new(self.shared.last_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.shared.begun.fetch_add(1, Ordering::SeqCst);
        self.shared.record(NativeEvent::Begin {
            id,
            timeout: options.timeout,
        });
        debug!(native_tx = %id, "native transaction opened");

        Ok(Box::new(MemoryTransaction {
            id,
            shared: Arc::clone(&self.shared),
            success: false,
            failure: false,
            started: Instant::now(),
            timeout: options.timeout,
            finished: false,
        }))
    }
}

/// Handle returned by [`InMemoryDatastore`].
#[derive(Debug)]
struct MemoryTransaction {
    id: NativeTxId,
    shared: Arc<Shared>,
    success: bool,
    failure: bool,
    started: Instant,
    timeout: Option<Duration>,
    finished: bool,
}

impl NativeTransaction for MemoryTransaction {
    fn id(&self) -> NativeTxId {
        self.id
    }

    fn mark_success(&mut self) {
        self.success = true;
        self.shared.record(NativeEvent::MarkSuccess { id: self.id });
    }

    fn mark_failure(&mut self) {
        self.failure = true;
        self.shared.record(NativeEvent::MarkFailure { id: self.id });
    }

    fn close(mut self: Box<Self>) -> NativeResult<NativeOutcome> {
        self.finished = true;

        let elapsed = self.started.elapsed();
        if let Some(timeout) = self.timeout {
            if elapsed > timeout {
                self.shared.finish(self.id, NativeOutcome::RolledBack);
                return Err(NativeError::TimedOut {
                    id: self.id,
                    elapsed,
                });
            }
        }

        let outcome = if self.success && !self.failure {
            NativeOutcome::Committed
        } else {
            NativeOutcome::RolledBack
        };
        self.shared.finish(self.id, outcome);
        debug!(native_tx = %self.id, ?outcome, "native transaction closed");
        Ok(outcome)
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        // Abandoned without close
        if !self.finished {
            self.shared.finish(self.id, NativeOutcome::RolledBack);
        }
    }
}
