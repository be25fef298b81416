//! Bridge statistics.
//!
//! Counters are atomic and monotonically increasing, so they can be read
//! from any thread while a transaction is being driven. Counters use
//! `SeqCst` so a snapshot never sees a finalization without its open.

use std::sync::atomic::{AtomicU64, Ordering};

/// Lifecycle counters for one bridge.
#[derive(Debug, Default)]
pub struct BridgeStats {
    /// Native transactions opened.
    opened: AtomicU64,
    /// Native transactions that committed on close.
    committed: AtomicU64,
    /// Native transactions that rolled back on close.
    rolled_back: AtomicU64,
    /// Native closes that returned an error.
    close_failures: AtomicU64,
    /// Cleanup errors discarded to keep an earlier error visible.
    suppressed_errors: AtomicU64,
    /// Completion listeners registered with a host.
    listeners_registered: AtomicU64,
}

impl BridgeStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_open(&self) {
        self.opened.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_commit(&self) {
        self.committed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_rollback(&self) {
        self.rolled_back.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_close_failure(&self) {
        self.close_failures.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_suppressed(&self) {
        self.suppressed_errors.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_listener(&self) {
        self.listeners_registered.fetch_add(1, Ordering::SeqCst);
    }

    /// Returns the number of native transactions opened.
    pub fn opened(&self) -> u64 {
        self.opened.load(Ordering::SeqCst)
    }

    /// Returns the number of native transactions committed.
    pub fn committed(&self) -> u64 {
        self.committed.load(Ordering::SeqCst)
    }

    /// Returns the number of native transactions rolled back.
    pub fn rolled_back(&self) -> u64 {
        self.rolled_back.load(Ordering::SeqCst)
    }

    /// Returns the number of failed native closes.
    pub fn close_failures(&self) -> u64 {
        self.close_failures.load(Ordering::SeqCst)
    }

    /// Returns the number of discarded cleanup errors.
    pub fn suppressed_errors(&self) -> u64 {
        self.suppressed_errors.load(Ordering::SeqCst)
    }

    /// Returns the number of registered completion listeners.
    pub fn listeners_registered(&self) -> u64 {
        self.listeners_registered.load(Ordering::SeqCst)
    }

    /// Returns a snapshot of all counters.
    ///
    /// Finalizations are read before `opened`, so every finalization the
    /// snapshot counts has its open counted too.
    pub fn snapshot(&self) -> StatsSnapshot {
        let committed = self.committed();
        let rolled_back = self.rolled_back();
        let close_failures = self.close_failures();
        StatsSnapshot {
            opened: self.opened(),
            committed,
            rolled_back,
            close_failures,
            suppressed_errors: self.suppressed_errors(),
            listeners_registered: self.listeners_registered(),
        }
    }
}

/// A point-in-time copy of [`BridgeStats`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Native transactions opened.
    pub opened: u64,
    /// Native transactions committed.
    pub committed: u64,
    /// Native transactions rolled back.
    pub rolled_back: u64,
    /// Failed native closes.
    pub close_failures: u64,
    /// Discarded cleanup errors.
    pub suppressed_errors: u64,
    /// Registered completion listeners.
    pub listeners_registered: u64,
}

impl StatsSnapshot {
    /// Returns the number of native transactions opened but not finalized.
    ///
    /// A failed close still finalizes the handle. Saturates at zero for a
    /// hand-built snapshot with more finalizations than opens.
    #[must_use]
    pub fn in_flight(&self) -> u64 {
        self.opened
            .saturating_sub(self.committed)
            .saturating_sub(self.rolled_back)
            .saturating_sub(self.close_failures)
    }
}
