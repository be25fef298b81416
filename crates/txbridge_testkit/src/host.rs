//! Scripted host transaction manager.
//!
//! [`ScriptedCoordinator`] plays the host side of the bridge: it reports a
//! settable governing status, keeps registered synchronizations, and can
//! run the JTA completion protocol over them. Its drivers honour injected
//! commit and rollback failures.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use txbridge_core::{
    BridgeError, BridgeResult, CompletionStatus, GoverningStatus, Synchronization,
    TransactionCoordinator, TransactionDriver,
};

/// How the scripted host manages its transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMode {
    /// Host-managed; completion is delivered through synchronizations.
    Jta,
    /// Locally driven through explicit begin/commit/rollback.
    Local,
}

/// A call observed by the scripted host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCall {
    /// `explicit_join` on the coordinator.
    ExplicitJoin,
    /// `pulse` on the coordinator.
    Pulse,
    /// `register_synchronization` on the coordinator.
    RegisterSynchronization,
    /// `begin` on a driver.
    Begin,
    /// `commit` on a driver.
    Commit,
    /// `rollback` on a driver.
    Rollback,
    /// `mark_rollback_only` on a driver.
    MarkRollbackOnly,
}

/// What a run of the completion protocol produced.
#[derive(Debug)]
pub struct CompletionReport {
    /// The outcome delivered to after-completion callbacks.
    pub outcome: CompletionStatus,
    /// Errors raised by synchronization callbacks, in call order.
    pub errors: Vec<BridgeError>,
}

impl CompletionReport {
    /// Returns true if no callback raised an error.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Default)]
struct HostState {
    status: Mutex<Option<GoverningStatus>>,
    synchronizations: Mutex<Vec<Arc<dyn Synchronization>>>,
    calls: Mutex<Vec<HostCall>>,
    reject_registration: AtomicBool,
    fail_commit: AtomicBool,
    fail_rollback: AtomicBool,
}

impl HostState {
    fn record(&self, call: HostCall) {
        self.calls.lock().push(call);
    }

    fn set_status(&self, status: GoverningStatus) {
        *self.status.lock() = Some(status);
    }
}

/// A host coordinator whose behaviour is set by the test.
pub struct ScriptedCoordinator {
    mode: HostMode,
    state: Arc<HostState>,
}

impl ScriptedCoordinator {
    /// Creates a coordinator in `mode`.
    ///
    /// A JTA coordinator starts with an active transaction; a local one
    /// starts with none until a driver begins it.
    pub fn new(mode: HostMode) -> Self {
        let state = Arc::new(HostState::default());
        state.set_status(match mode {
            HostMode::Jta => GoverningStatus::Active,
            HostMode::Local => GoverningStatus::NotActive,
        });
        Self { mode, state }
    }

    /// Creates a JTA coordinator.
    pub fn jta() -> Self {
        Self::new(HostMode::Jta)
    }

    /// Creates a locally driven coordinator.
    pub fn local() -> Self {
        Self::new(HostMode::Local)
    }

    /// Returns the host mode.
    pub fn mode(&self) -> HostMode {
        self.mode
    }

    /// Returns the governing status.
    pub fn status(&self) -> GoverningStatus {
        self.state.status.lock().unwrap_or(GoverningStatus::NotActive)
    }

    /// Sets the governing status.
    pub fn set_status(&self, status: GoverningStatus) {
        self.state.set_status(status);
    }

    /// Makes `register_synchronization` fail.
    pub fn reject_registration(&self, reject: bool) {
        self.state.reject_registration.store(reject, Ordering::SeqCst);
    }

    /// Makes driver commits fail.
    pub fn fail_commit(&self, fail: bool) {
        self.state.fail_commit.store(fail, Ordering::SeqCst);
    }

    /// Makes driver rollbacks fail.
    pub fn fail_rollback(&self, fail: bool) {
        self.state.fail_rollback.store(fail, Ordering::SeqCst);
    }

    /// Returns the synchronizations registered for the current transaction.
    pub fn synchronizations(&self) -> Vec<Arc<dyn Synchronization>> {
        self.state.synchronizations.lock().clone()
    }

    /// Returns the number of registered synchronizations.
    pub fn registered(&self) -> usize {
        self.state.synchronizations.lock().len()
    }

    /// Returns every call observed so far.
    pub fn calls(&self) -> Vec<HostCall> {
        self.state.calls.lock().clone()
    }

    /// Starts a new JTA transaction on this coordinator.
    pub fn begin_jta(&self) {
        self.state.synchronizations.lock().clear();
        self.set_status(GoverningStatus::Active);
    }

    /// Runs only the before-completion phase.
    ///
    /// Models a process that stops between the native finalization and the
    /// host recording its own outcome.
    pub fn before_completion(&self) -> Vec<BridgeError> {
        self.synchronizations()
            .iter()
            .filter_map(|s| s.before_completion().err())
            .collect()
    }

    /// Runs the completion protocol for the current transaction.
    ///
    /// `requested` is the outcome the host aims for. A transaction marked
    /// rollback-only, or one whose before-completion callback fails, rolls
    /// back instead. Synchronizations are discarded afterwards.
    pub fn complete(&self, requested: CompletionStatus) -> CompletionReport {
        let synchronizations = self.synchronizations();
        let mut outcome = if self.status() == GoverningStatus::MarkedRollback {
            CompletionStatus::RolledBack
        } else {
            requested
        };

        let mut errors = Vec::new();
        for synchronization in &synchronizations {
            if let Err(err) = synchronization.before_completion() {
                errors.push(err);
                outcome = CompletionStatus::RolledBack;
            }
        }

        self.set_status(match outcome {
            CompletionStatus::Committed => GoverningStatus::Committed,
            _ => GoverningStatus::RolledBack,
        });

        for synchronization in &synchronizations {
            if let Err(err) = synchronization.after_completion(outcome) {
                errors.push(err);
            }
        }
        self.state.synchronizations.lock().clear();

        CompletionReport { outcome, errors }
    }
}

impl TransactionCoordinator for ScriptedCoordinator {
    fn explicit_join(&self) -> BridgeResult<()> {
        self.state.record(HostCall::ExplicitJoin);
        Ok(())
    }

    fn pulse(&self) -> BridgeResult<()> {
        self.state.record(HostCall::Pulse);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.status().is_active()
    }

    fn is_jta(&self) -> bool {
        self.mode == HostMode::Jta
    }

    fn is_joined(&self) -> bool {
        self.registered() > 0
    }

    fn register_synchronization(
        &self,
        synchronization: Arc<dyn Synchronization>,
    ) -> BridgeResult<()> {
        self.state.record(HostCall::RegisterSynchronization);
        if self.state.reject_registration.load(Ordering::SeqCst) {
            return Err(BridgeError::host("synchronization registration rejected"));
        }
        self.state.synchronizations.lock().push(synchronization);
        Ok(())
    }

    fn transaction_driver(&self) -> Box<dyn TransactionDriver> {
        Box::new(ScriptedDriver {
            state: Arc::clone(&self.state),
        })
    }
}

impl std::fmt::Debug for ScriptedCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedCoordinator")
            .field("mode", &self.mode)
            .field("status", &self.status())
            .field("registered", &self.registered())
            .finish_non_exhaustive()
    }
}

/// Driver handed out by [`ScriptedCoordinator`].
pub struct ScriptedDriver {
    state: Arc<HostState>,
}

impl TransactionDriver for ScriptedDriver {
    fn begin(&self) -> BridgeResult<()> {
        self.state.record(HostCall::Begin);
        self.state.set_status(GoverningStatus::Active);
        Ok(())
    }

    fn commit(&self) -> BridgeResult<()> {
        self.state.record(HostCall::Commit);
        if self.state.fail_commit.load(Ordering::SeqCst) {
            self.state.set_status(GoverningStatus::FailedCommit);
            return Err(BridgeError::host("host commit failed"));
        }
        self.state.set_status(GoverningStatus::Committed);
        Ok(())
    }

    fn rollback(&self) -> BridgeResult<()> {
        self.state.record(HostCall::Rollback);
        self.state.set_status(GoverningStatus::RolledBack);
        if self.state.fail_rollback.load(Ordering::SeqCst) {
            return Err(BridgeError::host("host rollback failed"));
        }
        Ok(())
    }

    fn status(&self) -> GoverningStatus {
        self.state.status.lock().unwrap_or(GoverningStatus::NotActive)
    }

    fn mark_rollback_only(&self) {
        self.state.record(HostCall::MarkRollbackOnly);
        self.state.set_status(GoverningStatus::MarkedRollback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_status_depends_on_mode() {
        assert_eq!(ScriptedCoordinator::jta().status(), GoverningStatus::Active);
        assert_eq!(
            ScriptedCoordinator::local().status(),
            GoverningStatus::NotActive
        );
        assert!(ScriptedCoordinator::jta().is_jta());
        assert!(!ScriptedCoordinator::local().is_jta());
    }

    #[test]
    fn driver_updates_shared_status() {
        let host = ScriptedCoordinator::local();
        let driver = host.transaction_driver();

        driver.begin().unwrap();
        assert!(host.is_active());

        driver.mark_rollback_only();
        assert_eq!(host.status(), GoverningStatus::MarkedRollback);

        driver.rollback().unwrap();
        assert!(!host.is_active());
        assert_eq!(
            host.calls(),
            vec![HostCall::Begin, HostCall::MarkRollbackOnly, HostCall::Rollback]
        );
    }

    #[test]
    fn injected_failures() {
        let host = ScriptedCoordinator::local();
        host.fail_commit(true);
        host.fail_rollback(true);
        let driver = host.transaction_driver();

        assert!(driver.commit().is_err());
        assert_eq!(host.status(), GoverningStatus::FailedCommit);
        assert!(driver.rollback().is_err());
    }

    #[test]
    fn complete_without_synchronizations() {
        let host = ScriptedCoordinator::jta();
        let report = host.complete(CompletionStatus::Committed);
        assert!(report.is_clean());
        assert_eq!(report.outcome, CompletionStatus::Committed);
        assert_eq!(host.status(), GoverningStatus::Committed);
    }

    #[test]
    fn marked_rollback_completes_as_rollback() {
        let host = ScriptedCoordinator::jta();
        host.set_status(GoverningStatus::MarkedRollback);
        let report = host.complete(CompletionStatus::Committed);
        assert_eq!(report.outcome, CompletionStatus::RolledBack);
        assert_eq!(host.status(), GoverningStatus::RolledBack);
    }
}
