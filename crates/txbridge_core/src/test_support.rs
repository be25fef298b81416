//! Host doubles for unit tests.
//!
//! Native failures come from [`InMemoryDatastore`] itself: `shutdown` fails
//! opens and an expired timeout fails closes.

use crate::error::{BridgeError, BridgeResult};
use crate::host::{Synchronization, TransactionCoordinator, TransactionDriver};
use crate::types::{CompletionStatus, GoverningStatus};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use txbridge_native::InMemoryDatastore;

#[derive(Default)]
struct MockState {
    status: Mutex<Option<GoverningStatus>>,
    synchronizations: Mutex<Vec<Arc<dyn Synchronization>>>,
    reject_registration: AtomicBool,
    fail_commit: AtomicBool,
    fail_rollback: AtomicBool,
}

impl MockState {
    fn status(&self) -> GoverningStatus {
        self.status.lock().unwrap_or(GoverningStatus::Active)
    }

    fn set_status(&self, status: GoverningStatus) {
        *self.status.lock() = Some(status);
    }
}

pub(crate) struct MockCoordinator {
    jta: bool,
    state: Arc<MockState>,
}

impl MockCoordinator {
    pub(crate) fn jta() -> Self {
        Self {
            jta: true,
            state: Arc::default(),
        }
    }

    pub(crate) fn local() -> Self {
        Self {
            jta: false,
            state: Arc::default(),
        }
    }

    pub(crate) fn set_status(&self, status: GoverningStatus) {
        self.state.set_status(status);
    }

    pub(crate) fn reject_registration(&self, reject: bool) {
        self.state.reject_registration.store(reject, Ordering::SeqCst);
    }

    pub(crate) fn fail_commit(&self, fail: bool) {
        self.state.fail_commit.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_rollback(&self, fail: bool) {
        self.state.fail_rollback.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn registered(&self) -> usize {
        self.state.synchronizations.lock().len()
    }

    pub(crate) fn synchronizations(&self) -> Vec<Arc<dyn Synchronization>> {
        self.state.synchronizations.lock().clone()
    }
}

impl TransactionCoordinator for MockCoordinator {
    fn explicit_join(&self) -> BridgeResult<()> {
        Ok(())
    }

    fn pulse(&self) -> BridgeResult<()> {
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.state.status().is_active()
    }

    fn is_jta(&self) -> bool {
        self.jta
    }

    fn is_joined(&self) -> bool {
        self.registered() > 0
    }

    fn register_synchronization(
        &self,
        synchronization: Arc<dyn Synchronization>,
    ) -> BridgeResult<()> {
        if self.state.reject_registration.load(Ordering::SeqCst) {
            return Err(BridgeError::host("registration rejected"));
        }
        self.state.synchronizations.lock().push(synchronization);
        Ok(())
    }

    fn transaction_driver(&self) -> Box<dyn TransactionDriver> {
        Box::new(MockDriver {
            state: Arc::clone(&self.state),
        })
    }
}

struct MockDriver {
    state: Arc<MockState>,
}

impl TransactionDriver for MockDriver {
    fn begin(&self) -> BridgeResult<()> {
        self.state.set_status(GoverningStatus::Active);
        Ok(())
    }

    fn commit(&self) -> BridgeResult<()> {
        if self.state.fail_commit.load(Ordering::SeqCst) {
            self.state.set_status(GoverningStatus::FailedCommit);
            return Err(BridgeError::host("commit failed"));
        }
        self.state.set_status(GoverningStatus::Committed);
        Ok(())
    }

    fn rollback(&self) -> BridgeResult<()> {
        self.state.set_status(GoverningStatus::RolledBack);
        if self.state.fail_rollback.load(Ordering::SeqCst) {
            return Err(BridgeError::host("rollback failed"));
        }
        Ok(())
    }

    fn status(&self) -> GoverningStatus {
        self.state.status()
    }

    fn mark_rollback_only(&self) {
        self.state.set_status(GoverningStatus::MarkedRollback);
    }
}

/// Delivers completion to every registered synchronization.
pub(crate) fn complete(coordinator: &MockCoordinator, status: CompletionStatus) {
    for synchronization in coordinator.synchronizations() {
        synchronization.before_completion().unwrap();
        synchronization.after_completion(status).unwrap();
    }
}

/// Timeout short enough for [`expire`] to outlast.
pub(crate) const SHORT_TIMEOUT: Duration = Duration::from_nanos(1);

/// Waits until any transaction opened with [`SHORT_TIMEOUT`] has expired.
pub(crate) fn expire() {
    std::thread::sleep(Duration::from_millis(2));
}

/// Returns a datastore whose opens fail.
pub(crate) fn shut_down_datastore() -> InMemoryDatastore {
    let store = InMemoryDatastore::new();
    store.shutdown();
    store
}
