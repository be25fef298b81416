//! Driver decorator for locally driven transactions.

use crate::bridge::TransactionBridge;
use crate::error::{BridgeError, BridgeResult};
use crate::host::TransactionDriver;
use crate::types::GoverningStatus;
use std::sync::Arc;

/// Wraps the host's explicit begin/commit/rollback driver and keeps the
/// bridge's native transaction in step with it.
///
/// Used when no host-managed synchronization is in play. The delegate always
/// runs first; the bridge follows.
pub struct BridgedDriver {
    delegate: Box<dyn TransactionDriver>,
    bridge: Arc<TransactionBridge>,
}

impl BridgedDriver {
    /// Creates a driver that forwards to `delegate` and finalizes `bridge`.
    pub fn new(delegate: Box<dyn TransactionDriver>, bridge: Arc<TransactionBridge>) -> Self {
        Self { delegate, bridge }
    }

    /// Returns the bridge this driver finalizes.
    #[must_use]
    pub fn bridge(&self) -> &Arc<TransactionBridge> {
        &self.bridge
    }
}

impl TransactionDriver for BridgedDriver {
    fn begin(&self) -> BridgeResult<()> {
        self.delegate.begin()?;
        self.bridge.begin_local()
    }

    /// Commits the host transaction, then the native one.
    ///
    /// If the host commit fails, the native transaction is rolled back and
    /// any error from that cleanup is discarded: the caller always sees the
    /// commit error.
    fn commit(&self) -> BridgeResult<()> {
        match self.delegate.commit() {
            Ok(()) => self.bridge.success(),
            Err(err) => {
                let cleanup = self.bridge.failure();
                self.bridge.discard_cleanup_error("commit", cleanup);
                Err(err)
            }
        }
    }

    /// Rolls back the host transaction, then always the native one.
    ///
    /// When both fail the caller gets [`BridgeError::Rollback`] carrying
    /// the two errors.
    fn rollback(&self) -> BridgeResult<()> {
        let rolled_back = self.delegate.rollback();
        let cleanup = self.bridge.failure();
        match (rolled_back, cleanup) {
            (Ok(()), cleanup) => cleanup,
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(cleanup)) => Err(BridgeError::Rollback {
                source: Box::new(err),
                cleanup: Box::new(cleanup),
            }),
        }
    }

    fn status(&self) -> GoverningStatus {
        self.delegate.status()
    }

    fn mark_rollback_only(&self) {
        self.delegate.mark_rollback_only();
    }
}

impl std::fmt::Debug for BridgedDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgedDriver")
            .field("bridge", &self.bridge.id())
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
