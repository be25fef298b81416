//! # txbridge testkit
//!
//! Test utilities for txbridge.
//!
//! This crate provides:
//! - A scripted host coordinator and driver with failure injection
//! - A fault-injecting native datastore wrapper
//! - Fixtures assembling a bridged coordinator over both
//! - Property-based generators for bridge operation sequences
//! - Test logging setup
//!
//! ## Usage
//!
//! ```rust,ignore
//! use txbridge_testkit::prelude::*;
//!
//! #[test]
//! fn joins_jta_transaction() {
//!     with_jta_bridge(|fx| {
//!         fx.coordinator.explicit_join().unwrap();
//!         assert!(fx.bridge().is_open());
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod faults;
pub mod fixtures;
pub mod generators;
pub mod host;
pub mod logging;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::faults::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::host::*;
    pub use crate::logging::*;
    pub use txbridge_core::{
        BridgeConfig, BridgeError, CompletionStatus, GoverningStatus, Synchronization,
        TransactionCoordinator, TransactionDriver,
    };
}

pub use faults::*;
pub use fixtures::*;
pub use generators::*;
pub use host::*;
pub use logging::*;
