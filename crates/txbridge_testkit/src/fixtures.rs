//! Test fixtures and bridge helpers.
//!
//! Provides a bridged coordinator wired to a scripted host and a
//! fault-injecting in-memory datastore.

use crate::faults::FaultyDatastore;
use crate::generators::BridgeOp;
use crate::host::{HostMode, ScriptedCoordinator};
use std::sync::Arc;
use txbridge_core::{
    BridgeConfig, BridgeResult, BridgedCoordinator, StatsSnapshot, TransactionBridge,
    TransactionCoordinator, TransactionDriver,
};
use txbridge_native::InMemoryDatastore;

/// A bridged coordinator over a scripted host and a faulty datastore.
pub struct BridgeFixture {
    /// The scripted host coordinator.
    pub host: Arc<ScriptedCoordinator>,
    /// The native datastore the bridge opens transactions on.
    pub store: FaultyDatastore,
    /// The coordinator under test.
    pub coordinator: BridgedCoordinator,
}

impl BridgeFixture {
    /// Creates a fixture in `mode` with `config`.
    pub fn new(mode: HostMode, config: BridgeConfig) -> Self {
        let host = Arc::new(ScriptedCoordinator::new(mode));
        let store = FaultyDatastore::new();
        let coordinator = BridgedCoordinator::new(host.clone(), Arc::new(store.clone()), config);
        Self {
            host,
            store,
            coordinator,
        }
    }

    /// Creates a JTA fixture with default configuration.
    pub fn jta() -> Self {
        Self::new(HostMode::Jta, BridgeConfig::default())
    }

    /// Creates a locally driven fixture with default configuration.
    pub fn local() -> Self {
        Self::new(HostMode::Local, BridgeConfig::default())
    }

    /// Returns the bridge under test.
    pub fn bridge(&self) -> &Arc<TransactionBridge> {
        self.coordinator.bridge()
    }

    /// Returns a bridged driver for the host's current transaction.
    pub fn driver(&self) -> Box<dyn TransactionDriver> {
        self.coordinator.transaction_driver()
    }

    /// Returns the in-memory datastore behind the fault wrapper.
    pub fn native(&self) -> &InMemoryDatastore {
        self.store.inner()
    }

    /// Returns the bridge's lifecycle counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.bridge().stats()
    }

    /// Applies one operation. Completion callbacks report their first error.
    pub fn apply(&self, op: BridgeOp) -> BridgeResult<()> {
        match op {
            BridgeOp::ExplicitJoin => self.coordinator.explicit_join(),
            BridgeOp::Pulse => self.coordinator.pulse(),
            BridgeOp::Begin => self.driver().begin(),
            BridgeOp::Commit => self.driver().commit(),
            BridgeOp::Rollback => self.driver().rollback(),
            BridgeOp::MarkRollbackOnly => {
                self.driver().mark_rollback_only();
                Ok(())
            }
            BridgeOp::BeforeCompletion => first_error(self.host.before_completion()),
            BridgeOp::AfterCompletion(status) => {
                let errors = self
                    .host
                    .synchronizations()
                    .iter()
                    .filter_map(|s| s.after_completion(status).err())
                    .collect();
                first_error(errors)
            }
            BridgeOp::Complete(status) => first_error(self.host.complete(status).errors),
            BridgeOp::NewJtaTransaction => {
                if self.host.mode() == HostMode::Jta {
                    self.host.begin_jta();
                }
                Ok(())
            }
            BridgeOp::FailCloses(fail) => {
                self.store.set_fail_close(fail);
                Ok(())
            }
            BridgeOp::FailNextOpen => {
                self.store.fail_next_opens(1);
                Ok(())
            }
        }
    }

    /// Asserts that the bridge and the datastore agree on what is open.
    ///
    /// # Panics
    ///
    /// Panics if more than one native transaction is open, or if the bridge's
    /// view of its handle disagrees with the datastore's.
    pub fn assert_consistent(&self) {
        let native = self.native();
        let open = native.open_count();
        assert!(open <= 1, "{open} native transactions open at once");
        assert_eq!(
            open,
            u64::from(self.bridge().is_open()),
            "bridge handle disagrees with datastore"
        );
        assert_eq!(
            native.begun(),
            native.committed() + native.rolled_back() + open,
            "native transactions not paired with a close"
        );
        assert_eq!(self.stats().in_flight(), open, "bridge stats out of step");
    }
}

fn first_error(errors: Vec<txbridge_core::BridgeError>) -> BridgeResult<()> {
    match errors.into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Runs a test with a JTA fixture.
///
/// # Example
///
/// ```rust,ignore
/// use txbridge_testkit::with_jta_bridge;
///
/// #[test]
/// fn my_test() {
///     with_jta_bridge(|fx| {
///         fx.coordinator.explicit_join().unwrap();
///     });
/// }
/// ```
pub fn with_jta_bridge<F, R>(f: F) -> R
where
    F: FnOnce(&BridgeFixture) -> R,
{
    let fixture = BridgeFixture::jta();
    f(&fixture)
}

/// Runs a test with a locally driven fixture.
pub fn with_local_bridge<F, R>(f: F) -> R
where
    F: FnOnce(&BridgeFixture) -> R,
{
    let fixture = BridgeFixture::local();
    f(&fixture)
}
