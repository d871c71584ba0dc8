//! Cloneable façade for issuing commands to the battle worker.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! stepping the battle or streaming events from specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use battle_core::Phase;

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::runtime::BattleSummary;
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    /// Advance up to `ticks` ticks and return the phase reached.
    pub async fn step(&self, ticks: u64) -> Result<Phase> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Step {
            ticks,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Run the battle to completion.
    pub async fn run_to_end(&self, max_ticks: u64) -> Result<BattleSummary> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::RunToEnd {
            max_ticks,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Request an abort; the battle ends on the next tick.
    pub async fn abort(&self) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Abort { reply: reply_tx }).await?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Query the current battle summary (read-only snapshot)
    pub async fn query_state(&self) -> Result<BattleSummary> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::QueryState { reply: reply_tx }).await?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Narration` - Battle log commands
    /// - `Topic::Audio` - Sound cues
    /// - `Topic::Lifecycle` - Phase changes and the final summary
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }
}
