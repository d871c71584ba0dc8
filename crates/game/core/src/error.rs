//! Common error infrastructure for battle-core.
//!
//! Only encounter setup can fail. Once a battle is running, misses, evasions
//! and failed escapes are outcomes recorded on results, and dangling data
//! references make an action invalid instead of raising.
//!
//! # Design Principles
//!
//! - **Fail before start**: missing troop or enemy data surfaces from `setup`
//! - **Severity Classification**: errors are categorized for recovery strategies
//! - **No panics**: the scheduler degrades to ending the current action

use crate::env::OracleError;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the caller can retry with different input
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected state inconsistencies that require investigation
/// - **Fatal**: required data is missing, the encounter cannot begin
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common interface for all battle errors.
pub trait BattleError: core::error::Error {
    /// Returns the severity classification of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a stable, machine-readable error code.
    fn error_code(&self) -> &'static str;

    /// Returns true if the caller may retry after adjusting its input.
    fn is_recoverable(&self) -> bool {
        self.severity().is_recoverable()
    }
}

/// Errors raised while preparing an encounter, before the first update.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SetupError {
    /// Troop, enemy or class data referenced by the encounter is missing.
    #[error(transparent)]
    Data(#[from] OracleError),

    /// The troop definition contains no enemy that could be spawned.
    #[error("troop {troop_id} has no members")]
    EmptyTroop { troop_id: u32 },

    /// No party member is able to join the battle.
    #[error("party has no battle members")]
    EmptyParty,

    /// `setup` was called while another encounter is still running.
    #[error("battle already in progress")]
    AlreadyRunning,
}

impl BattleError for SetupError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Data(_) => ErrorSeverity::Fatal,
            Self::EmptyTroop { .. } | Self::EmptyParty => ErrorSeverity::Validation,
            Self::AlreadyRunning => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Data(inner) => inner.error_code(),
            Self::EmptyTroop { .. } => "SETUP_EMPTY_TROOP",
            Self::EmptyParty => "SETUP_EMPTY_PARTY",
            Self::AlreadyRunning => "SETUP_ALREADY_RUNNING",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_troop_is_fatal() {
        let err = SetupError::from(OracleError::TroopNotFound(7));
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
        assert_eq!(err.error_code(), "ORACLE_TROOP_NOT_FOUND");
        assert_eq!(err.to_string(), "troop 7 not found");
    }

    #[test]
    fn already_running_is_recoverable() {
        assert!(SetupError::AlreadyRunning.is_recoverable());
        assert!(!SetupError::EmptyParty.is_recoverable());
    }
}
