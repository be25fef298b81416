//! Coordinator decorator.

use crate::bridge::TransactionBridge;
use crate::config::BridgeConfig;
use crate::driver::BridgedDriver;
use crate::error::BridgeResult;
use crate::host::{Synchronization, TransactionCoordinator, TransactionDriver};
use std::sync::Arc;
use txbridge_native::NativeDatastore;

/// A [`TransactionCoordinator`] that keeps a native transaction joined to
/// the coordinator it wraps.
///
/// `explicit_join` and `pulse` forward, then give the bridge a chance to
/// join; `transaction_driver` hands out a [`BridgedDriver`]. Everything else
/// forwards unchanged.
pub struct BridgedCoordinator {
    delegate: Arc<dyn TransactionCoordinator>,
    bridge: Arc<TransactionBridge>,
}

impl BridgedCoordinator {
    /// Creates a coordinator with a fresh bridge over `datastore`.
    pub fn new(
        delegate: Arc<dyn TransactionCoordinator>,
        datastore: Arc<dyn NativeDatastore>,
        config: BridgeConfig,
    ) -> Self {
        Self::with_bridge(delegate, Arc::new(TransactionBridge::new(datastore, config)))
    }

    /// Creates a coordinator around an existing bridge.
    pub fn with_bridge(
        delegate: Arc<dyn TransactionCoordinator>,
        bridge: Arc<TransactionBridge>,
    ) -> Self {
        Self { delegate, bridge }
    }

    /// Returns the bridge owning the native transaction.
    #[must_use]
    pub fn bridge(&self) -> &Arc<TransactionBridge> {
        &self.bridge
    }

    /// Returns the wrapped coordinator.
    #[must_use]
    pub fn delegate(&self) -> &Arc<dyn TransactionCoordinator> {
        &self.delegate
    }
}

impl TransactionCoordinator for BridgedCoordinator {
    fn explicit_join(&self) -> BridgeResult<()> {
        self.delegate.explicit_join()?;
        self.bridge.join(&self.delegate)
    }

    fn pulse(&self) -> BridgeResult<()> {
        self.delegate.pulse()?;
        if self.bridge.config().join_on_pulse {
            self.bridge.join(&self.delegate)?;
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.delegate.is_active()
    }

    fn is_jta(&self) -> bool {
        self.delegate.is_jta()
    }

    fn is_joined(&self) -> bool {
        self.delegate.is_joined()
    }

    fn register_synchronization(
        &self,
        synchronization: Arc<dyn Synchronization>,
    ) -> BridgeResult<()> {
        self.delegate.register_synchronization(synchronization)
    }

    fn transaction_driver(&self) -> Box<dyn TransactionDriver> {
        Box::new(BridgedDriver::new(
            self.delegate.transaction_driver(),
            Arc::clone(&self.bridge),
        ))
    }
}

impl std::fmt::Debug for BridgedCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgedCoordinator")
            .field("bridge", &self.bridge)
            .field("jta", &self.delegate.is_jta())
            .finish_non_exhaustive()
    }
}
