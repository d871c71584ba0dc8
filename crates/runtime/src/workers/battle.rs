//! Battle worker that owns the authoritative [`BattleRuntime`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), ticks the
//! scheduler, and replies over oneshot channels. Events are published by the
//! runtime itself.

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use battle_core::Phase;

use crate::api::Result;
use crate::runtime::{BattleRuntime, BattleSummary};

/// Commands that can be sent to the battle worker
pub enum Command {
    /// Advance up to `ticks` ticks, stopping early once the battle finished.
    Step {
        ticks: u64,
        reply: oneshot::Sender<Result<Phase>>,
    },
    /// Tick until battle-end cleanup has run.
    RunToEnd {
        max_ticks: u64,
        reply: oneshot::Sender<Result<BattleSummary>>,
    },
    /// Request an abort; it takes effect on the next tick.
    Abort { reply: oneshot::Sender<()> },
    /// Query the current battle summary (read-only).
    QueryState { reply: oneshot::Sender<BattleSummary> },
}

/// Background task that processes battle commands.
pub struct BattleWorker {
    runtime: BattleRuntime,
    command_rx: mpsc::Receiver<Command>,
}

impl BattleWorker {
    pub fn new(runtime: BattleRuntime, command_rx: mpsc::Receiver<Command>) -> Self {
        Self {
            runtime,
            command_rx,
        }
    }

    /// Main worker loop. Returns the runtime once every sender is gone.
    pub async fn run(mut self) -> BattleRuntime {
        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }
        debug!(ticks = self.runtime.ticks(), "battle worker stopped");
        self.runtime
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Step { ticks, reply } => {
                let result = self.step(ticks).await;
                if reply.send(result).is_err() {
                    debug!("Step reply channel closed (caller dropped)");
                }
            }
            Command::RunToEnd { max_ticks, reply } => {
                let result = self.runtime.run(max_ticks).await;
                if reply.send(result).is_err() {
                    debug!("RunToEnd reply channel closed (caller dropped)");
                }
            }
            Command::Abort { reply } => {
                self.runtime.abort();
                if reply.send(()).is_err() {
                    debug!("Abort reply channel closed (caller dropped)");
                }
            }
            Command::QueryState { reply } => {
                if reply.send(self.runtime.summary()).is_err() {
                    debug!("QueryState reply channel closed (caller dropped)");
                }
            }
        }
    }

    async fn step(&mut self, ticks: u64) -> Result<Phase> {
        for _ in 0..ticks {
            if self.runtime.is_finished() {
                break;
            }
            self.runtime.tick().await?;
        }
        Ok(self.runtime.manager().phase())
    }
}
