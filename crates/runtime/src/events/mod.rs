//! Topic-based event bus for runtime events.
//!
//! Narration, audio cues and lifecycle changes are published to separate
//! topics so consumers subscribe only to what they render.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::LifecycleEvent;
