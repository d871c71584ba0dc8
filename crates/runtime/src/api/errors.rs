//! Unified error types surfaced by the runtime API.
//!
//! Wraps battle setup failures, worker coordination and command providers so
//! clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use battle_core::{BattleError, ErrorSeverity, OracleError, SetupError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to build the party")]
    Party(#[source] OracleError),

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("battle did not finish within {max_ticks} ticks")]
    TickLimit { max_ticks: u64 },

    #[error("command provider failed: {0}")]
    Provider(String),

    #[error("battle worker command channel closed")]
    CommandChannelClosed,

    #[error("battle worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("battle worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

impl BattleError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Setup(error) => error.severity(),
            Self::Party(_) | Self::WorkerJoin(_) => ErrorSeverity::Fatal,
            Self::TickLimit { .. } | Self::Provider(_) => ErrorSeverity::Recoverable,
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Party(inner) => inner.error_code(),
            Self::Setup(inner) => inner.error_code(),
            Self::TickLimit { .. } => "RUNTIME_TICK_LIMIT",
            Self::Provider(_) => "RUNTIME_PROVIDER",
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
        }
    }
}
