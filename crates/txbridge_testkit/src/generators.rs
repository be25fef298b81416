//! Property-based test generators using proptest.
//!
//! Strategies produce sequences of operations from every entry point the
//! bridge has: coordinator joins, explicit driver calls, completion
//! callbacks, and armed datastore faults.

use crate::host::HostMode;
use proptest::prelude::*;
use txbridge_core::CompletionStatus;

/// One step against a [`crate::BridgeFixture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeOp {
    /// `explicit_join` on the bridged coordinator.
    ExplicitJoin,
    /// `pulse` on the bridged coordinator.
    Pulse,
    /// `begin` on a bridged driver.
    Begin,
    /// `commit` on a bridged driver.
    Commit,
    /// `rollback` on a bridged driver.
    Rollback,
    /// `mark_rollback_only` on a bridged driver.
    MarkRollbackOnly,
    /// Deliver only before-completion to registered synchronizations.
    BeforeCompletion,
    /// Deliver only after-completion with the given status.
    AfterCompletion(CompletionStatus),
    /// Run the host's full completion protocol.
    Complete(CompletionStatus),
    /// Start a new JTA transaction on the host.
    NewJtaTransaction,
    /// Arm or disarm native close failures.
    FailCloses(bool),
    /// Make the next native open fail.
    FailNextOpen,
}

/// Strategy for generating after-completion statuses.
pub fn completion_status_strategy() -> impl Strategy<Value = CompletionStatus> {
    prop_oneof![
        Just(CompletionStatus::Committed),
        Just(CompletionStatus::RolledBack),
        Just(CompletionStatus::Unknown),
    ]
}

/// Strategy for generating host modes.
pub fn host_mode_strategy() -> impl Strategy<Value = HostMode> {
    prop_oneof![Just(HostMode::Jta), Just(HostMode::Local)]
}

/// Strategy for operations that may open a native transaction and never
/// finalize one.
pub fn open_op_strategy() -> impl Strategy<Value = BridgeOp> {
    prop_oneof![
        Just(BridgeOp::ExplicitJoin),
        Just(BridgeOp::Pulse),
        Just(BridgeOp::Begin),
    ]
}

/// Strategy for any single bridge operation.
pub fn bridge_op_strategy() -> impl Strategy<Value = BridgeOp> {
    prop_oneof![
        3 => open_op_strategy(),
        2 => Just(BridgeOp::Commit),
        2 => Just(BridgeOp::Rollback),
        1 => Just(BridgeOp::MarkRollbackOnly),
        1 => Just(BridgeOp::BeforeCompletion),
        1 => completion_status_strategy().prop_map(BridgeOp::AfterCompletion),
        2 => completion_status_strategy().prop_map(BridgeOp::Complete),
        2 => Just(BridgeOp::NewJtaTransaction),
        1 => any::<bool>().prop_map(BridgeOp::FailCloses),
        1 => Just(BridgeOp::FailNextOpen),
    ]
}

/// Strategy for sequences of bridge operations.
pub fn op_sequence_strategy(max_len: usize) -> impl Strategy<Value = Vec<BridgeOp>> {
    prop::collection::vec(bridge_op_strategy(), 0..max_len)
}
