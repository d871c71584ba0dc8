//! Deterministic battle rules shared by loaders, runtimes and tools.
//!
//! `battle-core` defines the combatant model (vitals, states, buffs, action
//! queues, time bars), action resolution and the battle scheduler. All
//! mutation during an encounter flows through [`engine::BattleManager`] and
//! the [`engine::BattleContext`] it is handed each tick; data tables are read
//! through [`env::DatabaseOracle`].
pub mod action;
pub mod battler;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod stats;
pub mod unit;

pub use action::{Action, ActionResult, HitOutcome};
pub use battler::{ActionState, Battler, BattlerId, BattlerKind, ForceTarget, Side};
pub use config::{BattleConfig, BattleSystem};
pub use engine::{BattleContext, BattleManager, BattleOutcome, EscapeOutcome, Phase, Rewards};
pub use env::{
    AudioSink, BattleEnv, DatabaseOracle, LogCommand, MemoryDatabase, NullAudio, OracleError,
    PcgRng, PresentationSink, RngOracle, ScriptedRng, SoundCue,
};
pub use error::{BattleError, ErrorSeverity, SetupError};
pub use unit::{Inventory, Party, Troop, UnitView};
