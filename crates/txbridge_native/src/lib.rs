//! # txbridge native
//!
//! The datastore side of a transaction bridge.
//!
//! A native datastore exposes its own transaction handle with an independent
//! lifecycle: open it, mark it successful or failed, then close it. Closing is
//! what actually commits or rolls back. This crate defines that boundary and
//! ships an in-memory reference datastore.
//!
//! ## Design Principles
//!
//! - A handle is closed exactly once; [`NativeTransaction::close`] consumes it
//! - A failure mark always wins over a success mark
//! - A handle closed with no mark rolls back
//! - Timeouts are enforced by the datastore, never by the caller
//!
//! ## Example
//!
//! ```rust
//! use txbridge_native::{InMemoryDatastore, NativeDatastore, NativeOutcome, TransactionOptions};
//!
//! let store = InMemoryDatastore::new();
//! let mut tx = store.begin_transaction(&TransactionOptions::default()).unwrap();
//! tx.mark_success();
//! assert_eq!(tx.close().unwrap(), NativeOutcome::Committed);
//! assert_eq!(store.committed(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod datastore;
mod error;
mod memory;

pub use datastore::{
    NativeDatastore, NativeOutcome, NativeTransaction, NativeTxId, TransactionOptions,
};
pub use error::{NativeError, NativeResult};
pub use memory::{InMemoryDatastore, NativeEvent};
