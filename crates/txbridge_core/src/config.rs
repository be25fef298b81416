//! Bridge configuration.

use std::time::Duration;
use txbridge_native::TransactionOptions;

/// Configuration for a [`crate::TransactionBridge`].
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Timeout handed to the datastore for every native transaction
    /// (`None` = the datastore's default).
    pub native_timeout: Option<Duration>,

    /// Whether a coordinator pulse may open a native transaction.
    ///
    /// An explicit join always may.
    pub join_on_pulse: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            native_timeout: None,
            join_on_pulse: true,
        }
    }
}

impl BridgeConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the native transaction timeout.
    #[must_use]
    pub const fn native_timeout(mut self, timeout: Duration) -> Self {
        self.native_timeout = Some(timeout);
        self
    }

    /// Sets whether a pulse may join.
    #[must_use]
    pub const fn join_on_pulse(mut self, value: bool) -> Self {
        self.join_on_pulse = value;
        self
    }

    /// Returns the options used to open native transactions.
    #[must_use]
    pub fn transaction_options(&self) -> TransactionOptions {
        TransactionOptions {
            timeout: self.native_timeout,
        }
    }
}
