//! Error types for the transaction bridge.

use crate::host::HostError;
use thiserror::Error;
use txbridge_native::NativeError;

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors surfaced by the bridge and the host seams it decorates.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The datastore could not open a native transaction.
    #[error("native transaction could not be opened: {0}")]
    NativeOpen(#[source] NativeError),

    /// The native transaction failed while closing.
    ///
    /// The bridge has already discarded the handle when this is returned.
    #[error("native transaction failed to close: {0}")]
    NativeClose(#[source] NativeError),

    /// The host coordinator or driver reported a failure.
    #[error("host transaction error: {0}")]
    Host(#[from] HostError),

    /// The host rollback failed and the native cleanup that followed it
    /// failed as well.
    #[error("rollback failed: {source}; native cleanup also failed: {cleanup}")]
    Rollback {
        /// The error raised by the host rollback.
        source: Box<BridgeError>,
        /// The error raised while closing the native transaction.
        cleanup: Box<BridgeError>,
    },
}

impl BridgeError {
    /// Creates a host error from a message.
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host(HostError::new(message))
    }

    /// Returns true if the error originated in the native datastore.
    #[must_use]
    pub fn is_native(&self) -> bool {
        matches!(self, Self::NativeOpen(_) | Self::NativeClose(_))
    }

    /// Returns true if the error originated in the host.
    #[must_use]
    pub fn is_host(&self) -> bool {
        match self {
            Self::Host(_) => true,
            Self::Rollback { source, .. } => source.is_host(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_origin() {
        assert!(BridgeError::NativeOpen(NativeError::open("down")).is_native());
        assert!(BridgeError::NativeClose(NativeError::close("io")).is_native());
        assert!(!BridgeError::host("commit refused").is_native());
        assert!(BridgeError::host("commit refused").is_host());

        let err = BridgeError::Rollback {
            source: Box::new(BridgeError::host("rollback refused")),
            cleanup: Box::new(BridgeError::NativeClose(NativeError::close("io"))),
        };
        assert!(err.is_host());
        assert!(!err.is_native());
    }

    #[test]
    fn error_display() {
        let err = BridgeError::Rollback {
            source: Box::new(BridgeError::host("rollback refused")),
            cleanup: Box::new(BridgeError::NativeClose(NativeError::close("io"))),
        };
        let text = err.to_string();
        assert!(text.contains("rollback refused"));
        assert!(text.contains("io"));
    }
}
