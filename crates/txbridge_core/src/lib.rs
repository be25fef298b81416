//! # txbridge core
//!
//! Keeps a datastore-native transaction synchronized with the transaction a
//! host framework manages.
//!
//! The host (a JTA-style coordinator, or an explicit begin/commit/rollback
//! driver) owns the logical transaction. The datastore underneath owns a
//! second, unrelated transaction handle. This crate opens that handle lazily,
//! keeps it in lock-step with the host, and closes it exactly once no matter
//! which path completes it.
//!
//! This crate provides:
//! - [`TransactionBridge`], the single owner of the native handle
//! - [`CompletionListener`], the synchronization registered with a JTA host
//! - [`BridgedDriver`], the decorator for locally driven transactions
//! - [`BridgedCoordinator`], the coordinator decorator hosts talk to
//!
//! ## Completion ordering
//!
//! Under JTA the native transaction is finalized in the host's
//! before-completion phase, ahead of the host's own commit. A crash between
//! the two leaves the datastore committed (or rolled back) while the host
//! outcome was never recorded. Two-phase commit is not attempted.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use txbridge_core::{BridgeConfig, BridgedCoordinator, TransactionCoordinator};
//! use txbridge_native::InMemoryDatastore;
//!
//! let store = Arc::new(InMemoryDatastore::new());
//! let coordinator = BridgedCoordinator::new(host, store, BridgeConfig::default());
//! coordinator.explicit_join()?;
//! assert!(coordinator.bridge().is_open());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bridge;
mod config;
mod coordinator;
mod driver;
mod error;
mod host;
mod listener;
mod stats;
mod types;

#[cfg(test)]
mod test_support;

pub use bridge::TransactionBridge;
pub use config::BridgeConfig;
pub use coordinator::BridgedCoordinator;
pub use driver::BridgedDriver;
pub use error::{BridgeError, BridgeResult};
pub use host::{HostError, Synchronization, TransactionCoordinator, TransactionDriver};
pub use listener::CompletionListener;
pub use stats::{BridgeStats, StatsSnapshot};
pub use types::{BridgeId, CompletionStatus, GoverningStatus, NativeState};

pub use txbridge_native::{NativeDatastore, NativeError, NativeTxId};
