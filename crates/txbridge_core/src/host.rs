//! Interfaces consumed from the host transaction manager.
//!
//! The host owns the governing transaction. The bridge only decorates these
//! seams; it never decides when a transaction begins or ends.

use crate::error::BridgeResult;
use crate::types::{CompletionStatus, GoverningStatus};
use std::sync::Arc;
use thiserror::Error;

/// A failure reported by the host coordinator or driver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HostError {
    /// Description of the failure.
    pub message: String,
}

impl HostError {
    /// Creates a host error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Completion callbacks delivered by a host-managed transaction.
pub trait Synchronization: Send + Sync {
    /// Called before the host finalizes its transaction.
    fn before_completion(&self) -> BridgeResult<()>;

    /// Called after the host finalized its transaction.
    fn after_completion(&self, status: CompletionStatus) -> BridgeResult<()>;
}

/// Explicit control over one host transaction.
pub trait TransactionDriver: Send {
    /// Begins the host transaction.
    fn begin(&self) -> BridgeResult<()>;

    /// Commits the host transaction.
    fn commit(&self) -> BridgeResult<()>;

    /// Rolls back the host transaction.
    fn rollback(&self) -> BridgeResult<()>;

    /// Returns the current status of the host transaction.
    fn status(&self) -> GoverningStatus;

    /// Marks the host transaction so it can only roll back.
    fn mark_rollback_only(&self);
}

/// The host's per-session transaction coordinator.
pub trait TransactionCoordinator: Send + Sync {
    /// Joins the session to the current host transaction on request.
    fn explicit_join(&self) -> BridgeResult<()>;

    /// Lets the coordinator check whether it should join a transaction.
    fn pulse(&self) -> BridgeResult<()>;

    /// Returns true if a governing transaction is in progress.
    fn is_active(&self) -> bool;

    /// Returns true if the governing transaction is host-managed (JTA)
    /// rather than locally driven.
    fn is_jta(&self) -> bool;

    /// Returns true if the session has joined the governing transaction.
    fn is_joined(&self) -> bool;

    /// Registers completion callbacks for the current governing transaction.
    fn register_synchronization(&self, synchronization: Arc<dyn Synchronization>)
        -> BridgeResult<()>;

    /// Returns the driver for the current governing transaction.
    fn transaction_driver(&self) -> Box<dyn TransactionDriver>;
}
