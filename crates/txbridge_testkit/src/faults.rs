//! Fault injection for native datastores.
//!
//! [`FaultyDatastore`] wraps an [`InMemoryDatastore`] and can fail opens or
//! closes on demand. Faults are read at the moment of the call, so a test can
//! arm a close failure after the bridge has already joined.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use txbridge_native::{
    InMemoryDatastore, NativeDatastore, NativeError, NativeOutcome, NativeResult,
    NativeTransaction, NativeTxId, TransactionOptions,
};

#[derive(Debug, Default)]
struct Faults {
    fail_opens: AtomicU64,
    fail_close: AtomicBool,
    close_attempts: AtomicU64,
}

/// A datastore wrapper that can simulate native failures.
///
/// A handle whose close is failed is still dropped, so the inner datastore
/// rolls it back: the wrapped store's counters stay balanced.
#[derive(Debug, Clone, Default)]
pub struct FaultyDatastore {
    inner: InMemoryDatastore,
    faults: Arc<Faults>,
}

impl FaultyDatastore {
    /// Creates a wrapper around a fresh in-memory datastore.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a wrapper around `inner`.
    pub fn wrap(inner: InMemoryDatastore) -> Self {
        Self {
            inner,
            faults: Arc::default(),
        }
    }

    /// Returns the wrapped datastore.
    pub fn inner(&self) -> &InMemoryDatastore {
        &self.inner
    }

    /// Makes the next `count` opens fail.
    pub fn fail_next_opens(&self, count: u64) {
        self.faults.fail_opens.store(count, Ordering::SeqCst);
    }

    /// Sets whether closes fail.
    pub fn set_fail_close(&self, fail: bool) {
        self.faults.fail_close.store(fail, Ordering::SeqCst);
    }

    /// Returns how many times `close` was called, including failed calls.
    pub fn close_attempts(&self) -> u64 {
        self.faults.close_attempts.load(Ordering::SeqCst)
    }

    /// Clears all armed faults. Counters are kept.
    pub fn reset(&self) {
        self.faults.fail_opens.store(0, Ordering::SeqCst);
        self.faults.fail_close.store(false, Ordering::SeqCst);
    }

    fn take_open_fault(&self) -> bool {
        self.faults
            .fail_opens
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl NativeDatastore for FaultyDatastore {
    fn begin_transaction(
        &self,
        options: &TransactionOptions,
    ) -> NativeResult<Box<dyn NativeTransaction>> {
        if self.take_open_fault() {
            return Err(NativeError::open("simulated open failure"));
        }
        Ok(Box::new(FaultyTransaction {
            inner: self.inner.begin_transaction(options)?,
            faults: Arc::clone(&self.faults),
        }))
    }
}

struct FaultyTransaction {
    inner: Box<dyn NativeTransaction>,
    faults: Arc<Faults>,
}

impl NativeTransaction for FaultyTransaction {
    fn id(&self) -> NativeTxId {
        self.inner.id()
    }

    fn mark_success(&mut self) {
        self.inner.mark_success();
    }

    fn mark_failure(&mut self) {
        self.inner.mark_failure();
    }

    fn close(self: Box<Self>) -> NativeResult<NativeOutcome> {
        self.faults.close_attempts.fetch_add(1, Ordering::SeqCst);
        if self.faults.fail_close.load(Ordering::SeqCst) {
            return Err(NativeError::close("simulated close failure"));
        }
        self.inner.close()
    }
}
