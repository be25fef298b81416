//! Completion listener registered with host-managed transactions.

use crate::bridge::TransactionBridge;
use crate::error::BridgeResult;
use crate::host::{Synchronization, TransactionCoordinator};
use crate::types::{CompletionStatus, GoverningStatus};
use std::sync::{Arc, Weak};
use tracing::{trace, warn};

/// Translates host completion callbacks into bridge finalization.
///
/// Registered once per join. The native transaction is finalized in
/// [`before_completion`](Synchronization::before_completion), before the host
/// records its own outcome; [`after_completion`](Synchronization::after_completion)
/// only acts if that did not happen.
///
/// The host keeps this listener alive, so the coordinator is held weakly.
pub struct CompletionListener {
    bridge: Arc<TransactionBridge>,
    coordinator: Weak<dyn TransactionCoordinator>,
}

impl CompletionListener {
    /// Creates a listener that finalizes `bridge` according to the status
    /// reported by `coordinator`.
    pub fn new(
        bridge: Arc<TransactionBridge>,
        coordinator: Weak<dyn TransactionCoordinator>,
    ) -> Self {
        Self {
            bridge,
            coordinator,
        }
    }

    fn governing_status(&self) -> Option<GoverningStatus> {
        self.coordinator
            .upgrade()
            .map(|coordinator| coordinator.transaction_driver().status())
    }
}

impl Synchronization for CompletionListener {
    fn before_completion(&self) -> BridgeResult<()> {
        match self.governing_status() {
            Some(GoverningStatus::MarkedRollback) => self.bridge.failure(),
            Some(_) => self.bridge.success(),
            None => {
                warn!(
                    bridge = %self.bridge.id(),
                    "coordinator gone before completion; rolling back"
                );
                self.bridge.failure()
            }
        }
    }

    fn after_completion(&self, status: CompletionStatus) -> BridgeResult<()> {
        if !self.bridge.is_open() {
            trace!(bridge = %self.bridge.id(), ?status, "already finalized before completion");
            return Ok(());
        }
        match status {
            CompletionStatus::Committed => self.bridge.success(),
            _ => self.bridge.failure(),
        }
    }
}

impl std::fmt::Debug for CompletionListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionListener")
            .field("bridge", &self.bridge.id())
            .finish_non_exhaustive()
    }
}
