//! Runtime orchestration for battles.
//!
//! This crate wires the battle scheduler from `battle-core` to command
//! providers, tracing-backed presentation, an event bus and a worker task.
//! Consumers build a [`BattleRuntime`] and either drive it directly or
//! [`spawn`](BattleRuntime::spawn) it and talk to it through
//! [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`sinks`] narrates log commands and sound cues through `tracing`
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod runtime;
pub mod sinks;

mod workers;

pub use api::{
    ActorCommandRequest, AutoCommandProvider, CommandProvider, PartyCommand, PartyCommandRequest,
    Result, RuntimeError, RuntimeHandle,
};
pub use events::{Event, EventBus, LifecycleEvent, Topic};
pub use runtime::{
    BattleRuntime, BattleSummary, Encounter, MemberSummary, RuntimeBuilder, RuntimeConfig,
};
pub use sinks::{TracingAudio, TracingPresentation};
