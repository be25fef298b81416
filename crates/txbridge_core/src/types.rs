//! Core type definitions.

use std::fmt;
use uuid::Uuid;

/// Identifies a bridge instance in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BridgeId(Uuid);

impl BridgeId {
    /// Generates a new random bridge ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BridgeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BridgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bridge:{}", self.0)
    }
}

/// Status of the governing (host) transaction.
///
/// The bridge only reads this; it never changes the host's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoverningStatus {
    /// The transaction is in progress.
    Active,
    /// The transaction can only roll back.
    MarkedRollback,
    /// The host is committing.
    Committing,
    /// The transaction committed.
    Committed,
    /// The host is rolling back.
    RollingBack,
    /// The transaction rolled back.
    RolledBack,
    /// The commit attempt failed.
    FailedCommit,
    /// No transaction is in progress.
    NotActive,
}

impl GoverningStatus {
    /// Returns true if the host transaction can still make progress.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active | Self::MarkedRollback)
    }
}

/// Outcome reported to an after-completion callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    /// The host transaction committed.
    Committed,
    /// The host transaction rolled back.
    RolledBack,
    /// The host could not determine the outcome.
    Unknown,
}

impl CompletionStatus {
    /// JTA status code for a committed transaction.
    pub const STATUS_COMMITTED: i32 = 3;
    /// JTA status code for a rolled back transaction.
    pub const STATUS_ROLLEDBACK: i32 = 4;
    /// JTA status code for an unknown outcome.
    pub const STATUS_UNKNOWN: i32 = 5;

    /// Maps a JTA status code. Codes other than committed or rolled back
    /// map to [`CompletionStatus::Unknown`].
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        match code {
            Self::STATUS_COMMITTED => Self::Committed,
            Self::STATUS_ROLLEDBACK => Self::RolledBack,
            _ => Self::Unknown,
        }
    }

    /// Returns the JTA status code.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Committed => Self::STATUS_COMMITTED,
            Self::RolledBack => Self::STATUS_ROLLEDBACK,
            Self::Unknown => Self::STATUS_UNKNOWN,
        }
    }
}

/// Whether a bridge currently holds a native transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeState {
    /// No native transaction is open.
    Closed,
    /// A native transaction is open and not yet finalized.
    Open,
}
