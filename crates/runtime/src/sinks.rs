//! Presentation and audio sinks that narrate through `tracing`.
//!
//! Both sinks forward to an optional [`EventBus`] so clients can render the
//! battle while it runs. Neither ever reports busy: the runtime does not
//! wait for animations.

use battle_core::{AudioSink, LogCommand, PresentationSink, SoundCue};
use tracing::{debug, info, trace};

use crate::events::{Event, EventBus};

/// Narrates log commands at `info` and keeps the full battle log.
#[derive(Clone, Default)]
pub struct TracingPresentation {
    bus: Option<EventBus>,
    history: Vec<LogCommand>,
}

impl TracingPresentation {
    pub fn new(bus: Option<EventBus>) -> Self {
        Self {
            bus,
            history: Vec::new(),
        }
    }

    /// Every command pushed since the battle started.
    pub fn history(&self) -> &[LogCommand] {
        &self.history
    }
}

impl PresentationSink for TracingPresentation {
    fn push(&mut self, command: LogCommand) {
        info!(target: "battle::log", ?command);
        if let Some(bus) = &self.bus {
            bus.publish(Event::Log(command.clone()));
        }
        self.history.push(command);
    }

    /// Clearing the window does not forget the log.
    fn clear(&mut self) {
        trace!(target: "battle::log", "window cleared");
    }
}

/// Logs sound cues at `debug`.
#[derive(Clone, Default)]
pub struct TracingAudio {
    bus: Option<EventBus>,
}

impl TracingAudio {
    pub fn new(bus: Option<EventBus>) -> Self {
        Self { bus }
    }
}

impl AudioSink for TracingAudio {
    fn play(&mut self, cue: SoundCue) {
        debug!(target: "battle::audio", %cue);
        if let Some(bus) = &self.bus {
            bus.publish(Event::Sound(cue));
        }
    }
}
