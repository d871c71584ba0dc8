//! Worker tasks that back the runtime orchestration.
//!
//! The battle worker owns a [`BattleRuntime`](crate::BattleRuntime) and
//! executes commands sent through [`RuntimeHandle`](crate::RuntimeHandle).

mod battle;

pub use battle::{BattleWorker, Command};
