//! The transaction bridge.

use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::host::TransactionCoordinator;
use crate::listener::CompletionListener;
use crate::stats::{BridgeStats, StatsSnapshot};
use crate::types::{BridgeId, NativeState};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use txbridge_native::{NativeDatastore, NativeOutcome, NativeTransaction, NativeTxId};

/// How a native transaction is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Success,
    Failure,
}

/// Owns the lazily opened native transaction for one session/coordinator
/// pairing.
///
/// The bridge is the single source of truth for whether a native transaction
/// is open. Every entry point (coordinator join, local driver, completion
/// listener) converges on the same three operations: open, [`success`] and
/// [`failure`].
///
/// ## Invariants
///
/// - At most one native transaction is open at a time
/// - The handle is present iff a native transaction was opened and not yet
///   finalized
/// - Finalizing always discards the handle, even when the native close fails
///
/// The handle cycles open → closed as many times as the coordinator is
/// reused across logical transactions.
///
/// [`success`]: TransactionBridge::success
/// [`failure`]: TransactionBridge::failure
pub struct TransactionBridge {
    id: BridgeId,
    datastore: Arc<dyn NativeDatastore>,
    config: BridgeConfig,
    native: Mutex<Option<Box<dyn NativeTransaction>>>,
    stats: BridgeStats,
}

impl TransactionBridge {
    /// Creates a bridge with no open native transaction.
    pub fn new(datastore: Arc<dyn NativeDatastore>, config: BridgeConfig) -> Self {
        Self {
            id: BridgeId::new(),
            datastore,
            config,
            native: Mutex::new(None),
            stats: BridgeStats::new(),
        }
    }

    /// Returns this bridge's ID.
    #[must_use]
    pub fn id(&self) -> BridgeId {
        self.id
    }

    /// Returns the bridge configuration.
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Returns true if a native transaction is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.native.lock().is_some()
    }

    /// Returns the state of the native handle.
    #[must_use]
    pub fn state(&self) -> NativeState {
        if self.is_open() {
            NativeState::Open
        } else {
            NativeState::Closed
        }
    }

    /// Returns the ID of the open native transaction, if any.
    #[must_use]
    pub fn current_id(&self) -> Option<NativeTxId> {
        self.native.lock().as_ref().map(|tx| tx.id())
    }

    /// Returns a snapshot of the lifecycle counters.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Joins the coordinator's governing transaction.
    ///
    /// Opens a native transaction and registers one [`CompletionListener`]
    /// when no native transaction is open, the governing transaction is
    /// active, and it is host-managed. Otherwise this is a no-op, so calling
    /// it repeatedly is safe.
    ///
    /// If the host refuses the listener, the freshly opened native
    /// transaction is rolled back and the registration error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NativeOpen`] if the datastore cannot open a
    /// transaction, or the host's error if registration fails.
    pub fn join(
        self: &Arc<Self>,
        coordinator: &Arc<dyn TransactionCoordinator>,
    ) -> BridgeResult<()> {
        {
            let mut native = self.native.lock();
            if native.is_some() {
                trace!(bridge = %self.id, "join skipped: already joined");
                return Ok(());
            }
            if !coordinator.is_active() || !coordinator.is_jta() {
                trace!(bridge = %self.id, "join skipped: no active JTA transaction");
                return Ok(());
            }
            *native = Some(self.open()?);
        }

        let listener = CompletionListener::new(Arc::clone(self), Arc::downgrade(coordinator));
        match coordinator.register_synchronization(Arc::new(listener)) {
            Ok(()) => {
                self.stats.record_listener();
                Ok(())
            }
            Err(err) => {
                let cleanup = self.failure();
                self.discard_cleanup_error("listener registration", cleanup);
                Err(err)
            }
        }
    }

    /// Opens a native transaction for a locally driven begin.
    ///
    /// Unlike [`join`](Self::join) this does not consult the coordinator:
    /// it serves exactly the case where no JTA coordinator is in play.
    pub(crate) fn begin_local(&self) -> BridgeResult<()> {
        let mut native = self.native.lock();
        if native.is_none() {
            *native = Some(self.open()?);
        }
        Ok(())
    }

    /// Marks the open native transaction successful and closes it.
    ///
    /// No-op when no native transaction is open.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NativeClose`] if the native close fails. The
    /// handle is discarded either way.
    pub fn success(&self) -> BridgeResult<()> {
        self.finish(Mark::Success)
    }

    /// Marks the open native transaction failed and closes it.
    ///
    /// No-op when no native transaction is open.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NativeClose`] if the native close fails. The
    /// handle is discarded either way.
    pub fn failure(&self) -> BridgeResult<()> {
        self.finish(Mark::Failure)
    }

    /// Discards a cleanup error so the error already in flight stays the one
    /// the caller sees.
    pub(crate) fn discard_cleanup_error(&self, context: &str, result: BridgeResult<()>) {
        if let Err(err) = result {
            self.stats.record_suppressed();
            warn!(bridge = %self.id, context, error = %err, "discarding native cleanup error");
        }
    }

    fn open(&self) -> BridgeResult<Box<dyn NativeTransaction>> {
        let tx = self
            .datastore
            .begin_transaction(&self.config.transaction_options())
            .map_err(BridgeError::NativeOpen)?;
        self.stats.record_open();
        debug!(bridge = %self.id, native_tx = %tx.id(), "joined native transaction");
        Ok(tx)
    }

    fn finish(&self, mark: Mark) -> BridgeResult<()> {
        // Taking the handle clears it before the native close runs
        let Some(mut tx) = self.native.lock().take() else {
            return Ok(());
        };
        match mark {
            Mark::Success => tx.mark_success(),
            Mark::Failure => tx.mark_failure(),
        }
        self.close(tx)
    }

    fn close(&self, tx: Box<dyn NativeTransaction>) -> BridgeResult<()> {
        let native_tx = tx.id();
        match tx.close() {
            Ok(NativeOutcome::Committed) => {
                self.stats.record_commit();
                debug!(bridge = %self.id, %native_tx, "native transaction committed");
                Ok(())
            }
            Ok(NativeOutcome::RolledBack) => {
                self.stats.record_rollback();
                debug!(bridge = %self.id, %native_tx, "native transaction rolled back");
                Ok(())
            }
            Err(err) => {
                self.stats.record_close_failure();
                warn!(bridge = %self.id, %native_tx, error = %err, "native close failed");
                Err(BridgeError::NativeClose(err))
            }
        }
    }
}

impl std::fmt::Debug for TransactionBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionBridge")
            .field("id", &self.id)
            .field("native", &self.current_id())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
